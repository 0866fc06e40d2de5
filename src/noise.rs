//! Noise sources: white, pink and bandpass-colored.

use crate::filter::{ResonatorMode, ZdfResonator, CASCADE_BW_COMPENSATION};
use crate::utils::random::Xorshift128Plus;

/// White and pink noise from one owned PRNG.
///
/// Pink noise uses the Kellet five-pole approximation of a 1/f spectrum,
/// usable from about 20 Hz up to Nyquist.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    rng: Xorshift128Plus,
    pink_state: [f32; 5],
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseGenerator {
    pub fn new() -> Self {
        Self {
            rng: Xorshift128Plus::new(),
            pink_state: [0.0; 5],
        }
    }

    pub fn with_seed(seed_0: u64, seed_1: u64) -> Self {
        Self {
            rng: Xorshift128Plus::with_seed(seed_0, seed_1),
            pink_state: [0.0; 5],
        }
    }

    #[inline]
    pub fn white(&mut self) -> f32 {
        self.rng.next_float()
    }

    #[inline]
    pub fn pink(&mut self) -> f32 {
        let white = self.white();
        let s = &mut self.pink_state;
        s[0] = 0.99886 * s[0] + white * 0.0555179;
        s[1] = 0.99332 * s[1] + white * 0.0750759;
        s[2] = 0.96900 * s[2] + white * 0.1538520;
        s[3] = 0.86650 * s[3] + white * 0.3104856;
        s[4] = 0.55000 * s[4] + white * 0.5329522;
        // The filter sum peaks around 1.5x; rescale to unit range.
        (s[0] + s[1] + s[2] + s[3] + s[4] + white * 0.5362) * 0.11
    }
}

/// Bandpass-colored noise for fricatives and aspiration.
///
/// Centre frequencies below 100 Hz select the pink source directly. Above
/// that, raw white noise runs through a 4th-order bandpass (two cascaded ZDF
/// stages, 24 dB/oct) and a bandwidth-dependent gain so that narrow sibilant
/// filters and wide diffuse filters deliver comparable loudness.
#[derive(Debug, Clone)]
pub struct ColoredNoiseGenerator {
    source: NoiseGenerator,
    bandpass_1: ZdfResonator,
    bandpass_2: ZdfResonator,
}

impl ColoredNoiseGenerator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            source: NoiseGenerator::new(),
            bandpass_1: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
            bandpass_2: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
        }
    }

    #[inline]
    pub fn process(&mut self, filter_freq: f32, filter_bw: f32) -> f32 {
        if filter_freq < 100.0 {
            return self.source.pink();
        }

        let noise = self.source.white();
        let bw = filter_bw.max(100.0);
        let widened = bw * CASCADE_BW_COMPENSATION;
        let out = self.bandpass_1.process(noise, filter_freq, widened);
        let out = self.bandpass_2.process(out, filter_freq, widened);

        // Narrow filters pass less energy than wide ones; boost in
        // proportion (BW 6000 -> x1, BW 1500 -> x4).
        out * (6000.0 / bw)
    }
}
