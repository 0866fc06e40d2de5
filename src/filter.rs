//! Zero-delay-feedback resonators and the fixed conditioning filters.

#[allow(unused_imports)]
use num_traits::float::Float;

use core::f32::consts::PI;

/// Two cascaded 2nd-order stages narrow the combined -3 dB bandwidth by
/// about 0.644x, so each stage runs at the requested bandwidth x 1.554.
pub const CASCADE_BW_COMPENSATION: f32 = 1.554;

/// Output tap of the state-variable resonator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResonatorMode {
    /// Lowpass with unity DC gain, for the cascade topology.
    AllPole,
    /// Bandpass, for the parallel topology and noise coloring.
    BandPass,
    /// Notch (anti-resonator), for nasal and tracheal zeros.
    Notch,
}

/// 2nd-order ZDF state-variable resonator (trapezoidally integrated SVF).
///
/// Stable for all positive `g` and damping values, and tolerates per-sample
/// parameter modulation without zipper noise. Coefficients are recomputed
/// only when the centre frequency or bandwidth changes.
#[derive(Debug, Clone)]
pub struct ZdfResonator {
    mode: ResonatorMode,
    sample_rate: f32,
    frequency: f32,
    bandwidth: f32,
    configured: bool,
    g: f32,
    a1: f32,
    a2: f32,
    a3: f32,
    ic1: f32,
    ic2: f32,
}

impl ZdfResonator {
    pub fn new(sample_rate: f32, mode: ResonatorMode) -> Self {
        Self {
            mode,
            sample_rate,
            frequency: 0.0,
            bandwidth: 0.0,
            configured: false,
            g: 0.0,
            a1: 1.0,
            a2: 0.0,
            a3: 0.0,
            ic1: 0.0,
            ic2: 0.0,
        }
    }

    fn set_params(&mut self, frequency: f32, bandwidth: f32) {
        if self.configured && frequency == self.frequency && bandwidth == self.bandwidth {
            return;
        }
        self.frequency = frequency;
        self.bandwidth = bandwidth;
        self.configured = true;

        if frequency <= 0.0 || bandwidth <= 0.0 {
            self.g = 0.0;
            self.a1 = 1.0;
            self.a2 = 0.0;
            self.a3 = 0.0;
            return;
        }

        // Bilinear frequency warping, clamped for stability near Nyquist.
        let g = (PI * frequency / self.sample_rate).tan().min(10.0);
        let d = bandwidth / frequency;
        self.g = g;
        self.a1 = 1.0 / (1.0 + g * (g + d));
        self.a2 = g * self.a1;
        self.a3 = g * self.a2;
    }

    /// Process one sample at the given centre frequency and bandwidth.
    ///
    /// A non-positive frequency or bandwidth bypasses the filter: the input
    /// passes through unchanged and the integrator state is frozen.
    #[inline]
    pub fn process(&mut self, in_: f32, frequency: f32, bandwidth: f32) -> f32 {
        self.set_params(frequency, bandwidth);
        if self.g == 0.0 {
            return in_;
        }

        let v3 = in_ - self.ic2;
        let v1 = self.a1 * self.ic1 + self.a2 * v3;
        let v2 = self.ic2 + self.a2 * self.ic1 + self.a3 * v3;
        self.ic1 = 2.0 * v1 - self.ic1;
        self.ic2 = 2.0 * v2 - self.ic2;

        match self.mode {
            ResonatorMode::AllPole => v2,
            ResonatorMode::BandPass => v1,
            ResonatorMode::Notch => in_ - v1,
        }
    }

    /// Drain the integrator state toward zero.
    pub fn decay(&mut self, factor: f32) {
        self.ic1 *= factor;
        self.ic2 *= factor;
    }

    pub fn reset(&mut self) {
        self.ic1 = 0.0;
        self.ic2 = 0.0;
    }
}

/// 4th-order resonator: two 2nd-order sections cascaded at the same centre
/// frequency, each widened by the cascade compensation factor so the
/// combined -3 dB width matches the requested bandwidth.
#[derive(Debug, Clone)]
pub struct CascadedZdfResonator {
    stage_1: ZdfResonator,
    stage_2: ZdfResonator,
}

impl CascadedZdfResonator {
    pub fn new(sample_rate: f32, mode: ResonatorMode) -> Self {
        Self {
            stage_1: ZdfResonator::new(sample_rate, mode),
            stage_2: ZdfResonator::new(sample_rate, mode),
        }
    }

    #[inline]
    pub fn process(&mut self, in_: f32, frequency: f32, bandwidth: f32) -> f32 {
        if frequency <= 0.0 {
            return in_;
        }
        let widened = bandwidth * CASCADE_BW_COMPENSATION;
        let out = self.stage_1.process(in_, frequency, widened);
        self.stage_2.process(out, frequency, widened)
    }

    pub fn decay(&mut self, factor: f32) {
        self.stage_1.decay(factor);
        self.stage_2.decay(factor);
    }

    pub fn reset(&mut self) {
        self.stage_1.reset();
        self.stage_2.reset();
    }
}

/// One-pole DC blocker at 20 Hz.
///
/// The LF source at high Rd produces asymmetric pulses with a DC component
/// that would pass straight through the unity-DC-gain cascade resonators and
/// shift the limiter operating point.
#[derive(Debug, Clone)]
pub struct DcBlocker {
    r: f32,
    last_in: f32,
    last_out: f32,
}

impl DcBlocker {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            r: (1.0 - 2.0 * PI * 20.0 / sample_rate).clamp(0.9, 0.9999),
            last_in: 0.0,
            last_out: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, in_: f32) -> f32 {
        let out = in_ - self.last_in + self.r * self.last_out;
        self.last_in = in_;
        self.last_out = out;
        out
    }
}

/// Spectral tilt: two cascaded one-pole lowpasses (12 dB/oct), tuned so the
/// combined attenuation at 5 kHz equals the requested tilt in dB.
///
/// Bypasses below 1.5 dB. The cutoff is recomputed only when the tilt value
/// changes.
#[derive(Debug, Clone)]
pub struct SpectralTiltFilter {
    sample_rate: f32,
    tilt_db: f32,
    alpha: f32,
    state_1: f32,
    state_2: f32,
}

impl SpectralTiltFilter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            tilt_db: 0.0,
            alpha: 0.0,
            state_1: 0.0,
            state_2: 0.0,
        }
    }

    fn set_tilt(&mut self, tilt_db: f32) {
        self.tilt_db = tilt_db;
        let atten = 10.0f32.powf(-tilt_db / 20.0).max(0.001);
        // Each stage contributes 1/sqrt(1 + (f/fc)^2); solve the pair for
        // |H(5 kHz)| = atten.
        let fc = 5000.0 / (1.0 / atten - 1.0).sqrt();
        self.alpha = (-2.0 * PI * fc / self.sample_rate).exp();
    }

    #[inline]
    pub fn process(&mut self, in_: f32, tilt_db: f32) -> f32 {
        if tilt_db < 1.5 {
            return in_;
        }
        if tilt_db != self.tilt_db {
            self.set_tilt(tilt_db);
        }
        let alpha = self.alpha;
        self.state_1 = (1.0 - alpha) * in_ + alpha * self.state_1;
        self.state_2 = (1.0 - alpha) * self.state_1 + alpha * self.state_2;
        self.state_2
    }
}

/// High-frequency shelf: `y = x + boost * HPF(x)`.
///
/// Transparent at DC, +boost dB above the corner. Compensates the cascade
/// chain's structural high-frequency loss through six series all-pole
/// resonators; the parallel path carries its sibilant energy naturally and
/// is not shelved.
#[derive(Debug, Clone)]
pub struct HfShelfFilter {
    alpha: f32,
    boost: f32,
    last_in: f32,
    last_hp: f32,
}

impl HfShelfFilter {
    pub fn new(sample_rate: f32, corner_hz: f32, boost_db: f32) -> Self {
        Self {
            alpha: (-2.0 * PI * corner_hz / sample_rate).exp(),
            boost: 10.0f32.powf(boost_db / 20.0) - 1.0,
            last_in: 0.0,
            last_hp: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, in_: f32) -> f32 {
        let hp = self.alpha * (self.last_hp + in_ - self.last_in);
        self.last_in = in_;
        self.last_hp = hp;
        in_ + self.boost * hp
    }
}

/// 7-tap halfband FIR decimator (2:1, >60 dB stopband).
///
/// The structural zeros at taps 1 and 5 reduce the convolution to four
/// multiplies per output sample.
#[derive(Debug, Clone, Default)]
pub struct HalfbandDecimator {
    z: [f32; 7],
}

impl HalfbandDecimator {
    const OUTER: f32 = -0.0625;
    const INNER: f32 = 0.5625;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.z = [0.0; 7];
    }

    /// Consume two input samples, produce one output sample.
    #[inline]
    pub fn process(&mut self, in_0: f32, in_1: f32) -> f32 {
        self.z.copy_within(2.., 0);
        self.z[5] = in_0;
        self.z[6] = in_1;
        Self::OUTER * (self.z[0] + self.z[6]) + Self::INNER * (self.z[2] + self.z[4]) + 0.5 * self.z[3]
    }
}
