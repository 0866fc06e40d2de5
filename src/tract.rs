//! Vocal tract filtering: tracheal chain, cascade formant path and parallel
//! formant path.

use crate::filter::{CascadedZdfResonator, ResonatorMode, ZdfResonator};
use crate::frame::Frame;
use crate::utils::value_at_fade_position;

#[allow(unused_imports)]
use num_traits::float::Float;

/// Subglottal pole/zero/pole/zero chain for breathy voice coupling. Each
/// stage bypasses when its frequency is zero.
#[derive(Debug, Clone)]
pub struct TrachealResonator {
    pole_1: ZdfResonator,
    zero_1: ZdfResonator,
    pole_2: ZdfResonator,
    zero_2: ZdfResonator,
}

impl TrachealResonator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            pole_1: ZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            zero_1: ZdfResonator::new(sample_rate, ResonatorMode::Notch),
            pole_2: ZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            zero_2: ZdfResonator::new(sample_rate, ResonatorMode::Notch),
        }
    }

    #[inline]
    pub fn process(&mut self, in_: f32, frame: &Frame) -> f32 {
        let mut out = in_;
        if frame.ftp_freq1 > 0.0 {
            out = self.pole_1.process(out, frame.ftp_freq1, frame.ftp_bw1);
        }
        if frame.ftz_freq1 > 0.0 {
            out = self.zero_1.process(out, frame.ftz_freq1, frame.ftz_bw1);
        }
        if frame.ftp_freq2 > 0.0 {
            out = self.pole_2.process(out, frame.ftp_freq2, frame.ftp_bw2);
        }
        if frame.ftz_freq2 > 0.0 {
            out = self.zero_2.process(out, frame.ftz_freq2, frame.ftz_bw2);
        }
        out
    }
}

/// Series chain of all-pole formants with a nasal pole/zero pair and
/// pitch-synchronous F1/B1 modulation.
///
/// F1-F3 are 4th-order for sharper resonance; F4-F6 and the nasal pair are
/// 2nd-order.
#[derive(Debug, Clone)]
pub struct CascadeFormantFilter {
    f1: CascadedZdfResonator,
    f2: CascadedZdfResonator,
    f3: CascadedZdfResonator,
    f4: ZdfResonator,
    f5: ZdfResonator,
    f6: ZdfResonator,
    nasal_zero: ZdfResonator,
    nasal_pole: ZdfResonator,
    glottal_blend: f32,
    glottal_alpha: f32,
}

impl CascadeFormantFilter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            f1: CascadedZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            f2: CascadedZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            f3: CascadedZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            f4: ZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            f5: ZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            f6: ZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            nasal_zero: ZdfResonator::new(sample_rate, ResonatorMode::Notch),
            nasal_pole: ZdfResonator::new(sample_rate, ResonatorMode::AllPole),
            glottal_blend: 0.0,
            // 2 ms smoothing of the binary glottis flag.
            glottal_alpha: 1.0 - (-1.0 / (0.002 * sample_rate)).exp(),
        }
    }

    pub fn process(&mut self, frame: &Frame, glottis_open: bool, in_: f32) -> f32 {
        let input = in_ * 0.5;
        let n0 = self.nasal_zero.process(input, frame.cfn0, frame.cbn0);
        let nasal = self.nasal_pole.process(n0, frame.cfnp, frame.cbnp);
        let mut out = value_at_fade_position(input, nasal, frame.canp);
        out = self.f6.process(out, frame.cf6, frame.cb6);
        out = self.f5.process(out, frame.cf5, frame.cb5);
        out = self.f4.process(out, frame.cf4, frame.cb4);
        out = self.f3.process(out, frame.cf3, frame.cb3);
        out = self.f2.process(out, frame.cf2, frame.cb2);

        // Subglottal coupling raises F1 and widens B1 while the glottis is
        // open. The binary flag is smoothed with the 2 ms one-pole to keep
        // the modulation free of discontinuities at glottal boundaries.
        let target = if glottis_open { 1.0 } else { 0.0 };
        self.glottal_blend += self.glottal_alpha * (target - self.glottal_blend);
        let f1 = frame.cf1 + frame.delta_f1 * self.glottal_blend;
        let b1 = frame.cb1 + frame.delta_b1 * self.glottal_blend;
        self.f1.process(out, f1, b1)
    }

    pub fn decay(&mut self, factor: f32) {
        self.f1.decay(factor);
        self.f2.decay(factor);
        self.f3.decay(factor);
        self.f4.decay(factor);
        self.f5.decay(factor);
        self.f6.decay(factor);
        self.nasal_zero.decay(factor);
        self.nasal_pole.decay(factor);
    }

    pub fn reset(&mut self) {
        self.f1.reset();
        self.f2.reset();
        self.f3.reset();
        self.f4.reset();
        self.f5.reset();
        self.f6.reset();
        self.nasal_zero.reset();
        self.nasal_pole.reset();
    }
}

/// Six bandpass formants on a common input, summed with per-formant gains,
/// notched by one anti-resonator, with a bypass fade toward the raw input.
#[derive(Debug, Clone)]
pub struct ParallelFormantFilter {
    f1: ZdfResonator,
    f2: ZdfResonator,
    f3: ZdfResonator,
    f4: ZdfResonator,
    f5: ZdfResonator,
    f6: ZdfResonator,
    anti: ZdfResonator,
}

impl ParallelFormantFilter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            f1: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
            f2: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
            f3: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
            f4: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
            f5: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
            f6: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
            anti: ZdfResonator::new(sample_rate, ResonatorMode::Notch),
        }
    }

    pub fn process(&mut self, frame: &Frame, in_: f32) -> f32 {
        let input = in_ * 0.5;
        let mut out = 0.0;
        out += self.f1.process(input, frame.pf1, frame.pb1) * frame.pa1;
        out += self.f2.process(input, frame.pf2, frame.pb2) * frame.pa2;
        out += self.f3.process(input, frame.pf3, frame.pb3) * frame.pa3;
        out += self.f4.process(input, frame.pf4, frame.pb4) * frame.pa4;
        out += self.f5.process(input, frame.pf5, frame.pb5) * frame.pa5;
        out += self.f6.process(input, frame.pf6, frame.pb6) * frame.pa6;
        // A zero anti-resonator frequency bypasses automatically.
        out = self
            .anti
            .process(out, frame.parallel_anti_freq, frame.parallel_anti_bw);
        value_at_fade_position(out, input, frame.parallel_bypass)
    }

    pub fn decay(&mut self, factor: f32) {
        self.f1.decay(factor);
        self.f2.decay(factor);
        self.f3.decay(factor);
        self.f4.decay(factor);
        self.f5.decay(factor);
        self.f6.decay(factor);
        self.anti.decay(factor);
    }

    pub fn reset(&mut self) {
        self.f1.reset();
        self.f2.reset();
        self.f3.reset();
        self.f4.reset();
        self.f5.reset();
        self.f6.reset();
        self.anti.reset();
    }
}
