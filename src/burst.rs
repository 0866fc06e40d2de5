//! Self-sustaining stop-burst generator.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::filter::{ResonatorMode, ZdfResonator};
use crate::noise::NoiseGenerator;

/// Stop-burst envelope with place-colored noise.
///
/// Triggered by `burst_amplitude` rising from zero. All parameters are
/// latched at trigger time and used for the entire burst, insulating the
/// transient from mid-burst frame interpolation. Once triggered, the burst
/// completes its envelope regardless of later frame changes.
#[derive(Debug, Clone)]
pub struct BurstGenerator {
    sample_rate: f32,
    noise: NoiseGenerator,
    filter: ZdfResonator,
    phase: f32,
    last_amplitude: f32,
    active: bool,
    latched_amplitude: f32,
    latched_duration: f32,
    latched_filter_freq: f32,
    latched_filter_bw: f32,
    latched_noise_color: f32,
}

impl BurstGenerator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            noise: NoiseGenerator::new(),
            filter: ZdfResonator::new(sample_rate, ResonatorMode::BandPass),
            phase: 1.0,
            last_amplitude: 0.0,
            active: false,
            latched_amplitude: 0.0,
            latched_duration: 0.0,
            latched_filter_freq: 0.0,
            latched_filter_bw: 0.0,
            latched_noise_color: 0.0,
        }
    }

    pub fn process(
        &mut self,
        amplitude: f32,
        duration: f32,
        filter_freq: f32,
        filter_bw: f32,
        noise_color: f32,
    ) -> f32 {
        if self.last_amplitude <= 0.0 && amplitude > 0.0 {
            self.phase = 0.0;
            self.filter.reset();
            self.active = true;
            self.latched_amplitude = amplitude;
            self.latched_duration = duration;
            self.latched_filter_freq = filter_freq;
            self.latched_filter_bw = filter_bw;
            self.latched_noise_color = noise_color;
        }
        self.last_amplitude = amplitude;

        if !self.active || self.phase >= 1.0 {
            self.active = false;
            self.filter.decay(0.9);
            return 0.0;
        }

        // Envelope over the latched duration (0..1 maps to 5..20 ms).
        let duration_ms = 5.0 + self.latched_duration * 15.0;
        let duration_samples = duration_ms * 0.001 * self.sample_rate;
        let envelope = (-6.0 * self.phase).exp();
        self.phase = (self.phase + 1.0 / duration_samples).min(1.0);

        let color = self.latched_noise_color;
        let white = self.noise.white();
        let raw = white * (1.0 - color) + self.noise.pink() * color;
        let filtered = if self.latched_filter_freq > 0.0 && self.latched_filter_bw > 0.0 {
            self.filter
                .process(raw, self.latched_filter_freq, self.latched_filter_bw)
                * 3.0
        } else {
            raw
        };

        // The bandpass needs a few cycles to ring up; bridge the gap with
        // raw noise fading out over an onset window that scales with the
        // filter period.
        let onset_ms = if self.latched_filter_freq > 0.0 {
            (3000.0 / self.latched_filter_freq).max(1.5)
        } else {
            1.5
        };
        let onset_samples = onset_ms * 0.001 * self.sample_rate;
        let onset_phase = (self.phase * duration_samples / onset_samples).min(1.0);
        let onset_scale = 1.0 - color * 0.7;

        (filtered + raw * (1.0 - onset_phase) * onset_scale) * envelope * self.latched_amplitude
    }

    pub fn decay(&mut self, factor: f32) {
        self.filter.decay(factor);
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.phase = 1.0;
        self.active = false;
    }
}
