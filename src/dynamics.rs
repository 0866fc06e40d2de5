//! Amplitude processors: trill LFO, cascade duck and the peak limiter.

#[allow(unused_imports)]
use num_traits::float::Float;

use core::f32::consts::PI;

/// Amplitude LFO for trilled consonants (20-35 Hz typical).
///
/// Cosine-shaped: 1.0 at the fully open articulator, `1 - depth` at maximum
/// closure.
#[derive(Debug, Clone)]
pub struct TrillModulator {
    sample_rate: f32,
    phase: f32,
}

impl TrillModulator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, rate: f32, depth: f32) -> f32 {
        if rate <= 0.0 || depth <= 0.0 {
            return 1.0;
        }
        self.phase = (self.phase + rate / self.sample_rate).fract();
        1.0 - depth * 0.5 * (1.0 - (2.0 * PI * self.phase).cos())
    }
}

/// Smoothed gain reduction of the cascade path while voiceless bursts or
/// frication are active, preventing amplitude spikes at stop-vowel
/// boundaries where the cascade resonators still ring from the previous
/// vowel.
#[derive(Debug, Clone)]
pub struct CascadeDuck {
    smoothed: f32,
    alpha: f32,
}

impl CascadeDuck {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            smoothed: 1.0,
            // 1 ms time constant.
            alpha: 1.0 - (-1.0 / (0.001 * sample_rate)).exp(),
        }
    }

    #[inline]
    pub fn process(
        &mut self,
        burst_amplitude: f32,
        frication_amplitude: f32,
        voice_amplitude: f32,
    ) -> f32 {
        let noise_env = burst_amplitude.max(frication_amplitude);
        let target = 1.0 - 0.7 * noise_env * (1.0 - voice_amplitude);
        self.smoothed += self.alpha * (target - self.smoothed);
        self.smoothed
    }
}

/// Peak limiter, transparent below its threshold.
///
/// 0.1 ms attack. The release switches between 50 ms and a 5 ms fast mode;
/// fast release is engaged during closures so the limiter recovers before
/// the next stop burst.
#[derive(Debug, Clone)]
pub struct PeakLimiter {
    gain: f32,
    threshold: f32,
    attack_alpha: f32,
    release_alpha: f32,
    fast_release_alpha: f32,
    fast_release: bool,
}

impl PeakLimiter {
    pub fn new(sample_rate: f32, threshold_db: f32) -> Self {
        Self {
            gain: 1.0,
            threshold: 32767.0 * 10.0f32.powf(threshold_db / 20.0),
            attack_alpha: 1.0 - (-1.0 / (0.0001 * sample_rate)).exp(),
            release_alpha: 1.0 - (-1.0 / (0.050 * sample_rate)).exp(),
            fast_release_alpha: 1.0 - (-1.0 / (0.005 * sample_rate)).exp(),
            fast_release: false,
        }
    }

    pub fn set_fast_release(&mut self, fast: bool) {
        self.fast_release = fast;
    }

    /// Current gain state in (0, 1].
    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    #[inline]
    pub fn process(&mut self, in_: f32) -> f32 {
        let level = in_.abs();
        if level > self.threshold {
            let target = self.threshold / level;
            self.gain += self.attack_alpha * (target - self.gain);
        } else {
            let alpha = if self.fast_release {
                self.fast_release_alpha
            } else {
                self.release_alpha
            };
            self.gain += alpha * (1.0 - self.gain);
        }
        in_ * self.gain
    }
}
