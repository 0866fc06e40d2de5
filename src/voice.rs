//! Glottal source: LF-model waveform with 4x oversampling, stochastic
//! jitter/shimmer, vibrato, diplophonia and aspiration mixing.

#[allow(unused_imports)]
use num_traits::float::Float;

use core::f32::consts::PI;

use crate::filter::HalfbandDecimator;
use crate::frame::Frame;
use crate::noise::{ColoredNoiseGenerator, NoiseGenerator};
use crate::utils::polyblep::poly_blep;

const TWO_PI: f32 = 2.0 * PI;

/// Normalized-cycle phase accumulator with a 1 Hz frequency floor.
#[derive(Debug, Clone)]
pub struct PhaseGenerator {
    sample_rate: f32,
    phase: f32,
    dt: f32,
}

impl PhaseGenerator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            dt: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, frequency: f32) -> f32 {
        self.dt = frequency.max(1.0) / self.sample_rate;
        self.phase = (self.phase + self.dt).fract();
        self.phase
    }

    /// Phase increment of the most recent sample.
    #[inline]
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Cycle-synchronous stochastic jitter and shimmer.
///
/// A first-order smoothing of white noise (`x <- 0.7 x + 0.3 w`, roughly a
/// 3-cycle time constant) is sampled once per pitch period and held for the
/// cycle, modeling the cycle-to-cycle correlation of measured vocal jitter.
#[derive(Debug, Clone)]
pub struct JitterShimmerGenerator {
    noise: NoiseGenerator,
    smoothed_jitter: f32,
    smoothed_shimmer: f32,
    held_jitter: f32,
    held_shimmer: f32,
}

impl Default for JitterShimmerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl JitterShimmerGenerator {
    pub fn new() -> Self {
        Self {
            noise: NoiseGenerator::new(),
            smoothed_jitter: 0.0,
            smoothed_shimmer: 0.0,
            held_jitter: 0.0,
            held_shimmer: 0.0,
        }
    }

    pub fn on_new_cycle(&mut self) {
        self.smoothed_jitter = 0.7 * self.smoothed_jitter + 0.3 * self.noise.white();
        self.smoothed_shimmer = 0.7 * self.smoothed_shimmer + 0.3 * self.noise.white();
        self.held_jitter = self.smoothed_jitter;
        self.held_shimmer = self.smoothed_shimmer;
    }

    /// Pitch multiplier, up to +-2% at full amount.
    #[inline]
    pub fn pitch_mod(&self, amount: f32) -> f32 {
        if amount <= 0.0 {
            1.0
        } else {
            1.0 + self.held_jitter * amount * 0.02
        }
    }

    /// Amplitude multiplier, up to +-1% at full amount.
    #[inline]
    pub fn amplitude_mod(&self, amount: f32) -> f32 {
        if amount <= 0.0 {
            1.0
        } else {
            1.0 + self.held_shimmer * amount * 0.01
        }
    }
}

/// Timing and scaling of one LF-model cycle, derived from the Rd shape
/// parameter (0.3 tense .. 2.7 breathy).
#[derive(Debug, Clone, Copy)]
struct LfShape {
    tp: f32,
    te: f32,
    epsilon: f32,
    amp_norm: f32,
}

impl LfShape {
    fn from_rd(rd: f32) -> Self {
        let rd = rd.clamp(0.3, 2.7);
        let rap = ((-1.0 + 4.8 * rd) / 100.0).clamp(0.01, 0.20);
        let rkp = ((22.4 + 11.8 * rd) / 100.0).clamp(0.20, 0.80);
        let rgp = (1.0 / (4.0 * ((0.11 * rd / (0.5 + 1.2 * rkp)) - rap))).clamp(0.50, 3.00);

        // Timing normalized to a cycle length of 1.
        let tp = (1.0 / (2.0 * rgp)).min(0.45);
        let te = (tp * (1.0 + rkp)).clamp(tp + 0.05, 0.98);
        let ta = rap;

        Self {
            tp,
            te,
            epsilon: 1.0 / (ta * (1.0 - te) + 0.001),
            amp_norm: 1.0 / (0.5 + 0.3 * rd),
        }
    }

    /// Waveform value at a normalized cycle phase in [0, 1).
    fn wave(&self, phase: f32) -> f32 {
        if phase < self.tp {
            // Opening: raised-cosine rise.
            0.5 * (1.0 - (PI * phase / self.tp).cos()) * self.amp_norm
        } else if phase < self.te {
            // Closing: cosinusoidal fall to the excitation instant.
            0.5 * (1.0 + (PI * (phase - self.tp) / (self.te - self.tp)).cos()) * self.amp_norm
        } else {
            // Return phase: exponential decay with an end-of-cycle fade so
            // the wave reaches exactly zero before wrapping.
            let t_ret = (phase - self.te) / (1.0 - self.te);
            let decay = (-self.epsilon * t_ret * (1.0 - self.te)).exp();
            let fade = if t_ret > 0.7 {
                0.5 * (1.0 + (PI * (t_ret - 0.7) / 0.3).cos())
            } else {
                1.0
            };
            0.5 * decay * fade * self.amp_norm
        }
    }
}

/// The glottal source.
///
/// Produces one voice sample per output sample. The LF waveform is
/// evaluated at four symmetric phases around the current position (4x the
/// output rate), PolyBLEP-corrected at the cycle boundary and at the
/// excitation instant, and decimated back through two cascaded halfband
/// stages.
#[derive(Debug, Clone)]
pub struct VoiceGenerator {
    pitch_gen: PhaseGenerator,
    vibrato_gen: PhaseGenerator,
    sinusoidal_gen: PhaseGenerator,
    aspiration_gen: ColoredNoiseGenerator,
    jitter_shimmer: JitterShimmerGenerator,
    decimator_1: HalfbandDecimator,
    decimator_2: HalfbandDecimator,
    last_cycle_pos: f32,
    period_alternate: bool,
    glottis_open: bool,
}

impl VoiceGenerator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            pitch_gen: PhaseGenerator::new(sample_rate),
            vibrato_gen: PhaseGenerator::new(sample_rate),
            sinusoidal_gen: PhaseGenerator::new(sample_rate),
            aspiration_gen: ColoredNoiseGenerator::new(sample_rate),
            jitter_shimmer: JitterShimmerGenerator::new(),
            decimator_1: HalfbandDecimator::new(),
            decimator_2: HalfbandDecimator::new(),
            last_cycle_pos: 0.0,
            period_alternate: false,
            glottis_open: false,
        }
    }

    /// True while the most recent sample fell in the open phase of the
    /// cycle. Drives pitch-synchronous F1/B1 modulation and turbulence
    /// gating.
    #[inline]
    pub fn glottis_open(&self) -> bool {
        self.glottis_open
    }

    pub fn process(&mut self, frame: &Frame) -> f32 {
        let vibrato = (self.vibrato_gen.process(frame.vibrato_speed) * TWO_PI).sin()
            * 0.06
            * frame.vibrato_pitch_offset
            + 1.0;
        let jitter = self.jitter_shimmer.pitch_mod(frame.flutter);

        // Creaky voice: alternating cycles run slightly long and short.
        let diplophonia_mod = if frame.diplophonia > 0.0 {
            if self.period_alternate {
                1.0 + frame.diplophonia * 0.10
            } else {
                1.0 - frame.diplophonia * 0.10
            }
        } else {
            1.0
        };

        let phase = self
            .pitch_gen
            .process(frame.voice_pitch * vibrato * jitter * diplophonia_mod);

        // Cycle wrap: toggle the diplophonia alternation and draw the next
        // jitter/shimmer values.
        if phase < self.last_cycle_pos - 0.5 {
            self.period_alternate = !self.period_alternate;
            self.jitter_shimmer.on_new_cycle();
        }
        self.last_cycle_pos = phase;

        let colored = if frame.aspiration_filter_freq > 0.0 {
            self.aspiration_gen
                .process(frame.aspiration_filter_freq, frame.aspiration_filter_bw)
        } else {
            self.aspiration_gen.process(0.0, 1000.0)
        };
        let mut aspiration = colored * 0.2;
        let mut turbulence = aspiration * frame.voice_turbulence_amplitude;

        let glottal_wave = if frame.lf_rd > 0.0 {
            let shape = LfShape::from_rd(frame.lf_rd);
            self.glottis_open = phase < shape.te;

            let dt_os = self.pitch_gen.dt() * 0.25;
            let phases = [
                (phase - 1.5 * dt_os + 2.0).fract(),
                (phase - 0.5 * dt_os + 1.0).fract(),
                (phase + 0.5 * dt_os).fract(),
                (phase + 1.5 * dt_os).fract(),
            ];

            let mut oversampled = [0.0; 4];
            for (sample, &p) in oversampled.iter_mut().zip(phases.iter()) {
                // DC-centre [0, amp_norm] to [-amp_norm, +amp_norm].
                let mut s = shape.wave(p) * 2.0 - shape.amp_norm;
                // Cycle boundary (end of the return phase).
                s -= poly_blep(p, dt_os) * shape.amp_norm * 0.5;
                // Excitation instant, the main LF step discontinuity.
                s -= poly_blep((p - shape.te + 1.0).fract(), dt_os) * shape.amp_norm;
                *sample = s;
            }

            // 4x -> 2x -> 1x.
            let d0 = self.decimator_1.process(oversampled[0], oversampled[1]);
            let d1 = self.decimator_1.process(oversampled[2], oversampled[3]);
            self.decimator_2.process(d0, d1)
        } else {
            // No voicing: only noise sources drive the filters.
            self.glottis_open = false;
            0.0
        };

        let mut voice = glottal_wave;
        if !self.glottis_open {
            turbulence *= 0.01;
        }
        voice += turbulence;
        voice *= frame.voice_amplitude * self.jitter_shimmer.amplitude_mod(frame.flutter);

        if frame.sinusoidal_voicing_amplitude > 0.0 {
            let sin_phase = self.sinusoidal_gen.process(frame.voice_pitch * vibrato);
            voice += (sin_phase * TWO_PI).sin() * frame.sinusoidal_voicing_amplitude;
        }

        aspiration * frame.aspiration_amplitude + voice
    }
}
