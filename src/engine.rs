//! Top-level speech waveform generator: lifecycle, the per-sample signal
//! graph and the sample-buffer contract.

#[allow(unused_imports)]
use num_traits::float::Float;

use alloc::sync::Arc;

use crate::burst::BurstGenerator;
use crate::dynamics::{CascadeDuck, PeakLimiter, TrillModulator};
use crate::filter::{DcBlocker, HfShelfFilter, SpectralTiltFilter};
use crate::frame::Frame;
use crate::frame_manager::FrameManager;
use crate::noise::ColoredNoiseGenerator;
use crate::tract::{CascadeFormantFilter, ParallelFormantFilter, TrachealResonator};
use crate::voice::VoiceGenerator;

/// Scale from the unit-range mix to the 16-bit sample range, leaving
/// headroom below the limiter threshold for nominal material.
const OUTPUT_SCALE: f32 = 4000.0;

/// The complete synthesis pipeline.
///
/// Owns every DSP block by composition; the only shared state is the
/// injected [`FrameManager`]. `generate` never allocates and never blocks
/// outside the scheduler's short critical section.
#[derive(Debug)]
pub struct SpeechWaveGenerator {
    voice: VoiceGenerator,
    dc_blocker: DcBlocker,
    tilt: SpectralTiltFilter,
    tracheal: TrachealResonator,
    frication: ColoredNoiseGenerator,
    burst: BurstGenerator,
    trill: TrillModulator,
    cascade: CascadeFormantFilter,
    shelf: HfShelfFilter,
    parallel: ParallelFormantFilter,
    duck: CascadeDuck,
    limiter: PeakLimiter,
    previous_pre_gain: f32,
    frame_manager: Option<Arc<FrameManager>>,
}

impl SpeechWaveGenerator {
    pub fn new(sample_rate: f32) -> Self {
        enable_denormal_flush();
        Self {
            voice: VoiceGenerator::new(sample_rate),
            dc_blocker: DcBlocker::new(sample_rate),
            tilt: SpectralTiltFilter::new(sample_rate),
            tracheal: TrachealResonator::new(sample_rate),
            frication: ColoredNoiseGenerator::new(sample_rate),
            burst: BurstGenerator::new(sample_rate),
            trill: TrillModulator::new(sample_rate),
            cascade: CascadeFormantFilter::new(sample_rate),
            shelf: HfShelfFilter::new(sample_rate, 3000.0, 6.0),
            parallel: ParallelFormantFilter::new(sample_rate),
            duck: CascadeDuck::new(sample_rate),
            limiter: PeakLimiter::new(sample_rate, -3.0),
            previous_pre_gain: 0.0,
            frame_manager: None,
        }
    }

    /// Inject the frame scheduler. Generation is silent until one is set.
    pub fn set_frame_manager(&mut self, frame_manager: Arc<FrameManager>) {
        self.frame_manager = Some(frame_manager);
    }

    /// Fill `out` with 16-bit samples.
    ///
    /// Returns the number of samples produced, which is less than
    /// `out.len()` when the scheduler runs out of frames; the engine stays
    /// usable and picks up the next queued frame on a later call.
    pub fn generate(&mut self, out: &mut [i16]) -> usize {
        let Some(frame_manager) = self.frame_manager.clone() else {
            return 0;
        };
        for (produced, sample) in out.iter_mut().enumerate() {
            let Some(frame) = frame_manager.current_frame() else {
                return produced;
            };
            *sample = self.render_sample(&frame);
        }
        out.len()
    }

    fn render_sample(&mut self, frame: &Frame) -> i16 {
        let mut voice = self.voice.process(frame);
        voice = self.dc_blocker.process(voice);
        voice = self.tilt.process(voice, frame.spectral_tilt);
        voice = self.tracheal.process(voice, frame);
        let trill = self.trill.process(frame.trill_rate, frame.trill_depth);
        voice *= trill;

        // Resonator drain during silence, hard reset on voice onset, so
        // stale decaying state never colors the next onset.
        let pre_gain = frame.pre_formant_gain * trill;
        if pre_gain < 0.01 {
            self.cascade.decay(0.95);
            self.parallel.decay(0.95);
        }
        if self.previous_pre_gain < 0.005 && pre_gain > 0.01 {
            self.cascade.reset();
            self.parallel.reset();
        }
        self.previous_pre_gain = pre_gain;

        let mut cascade_out = self
            .cascade
            .process(frame, self.voice.glottis_open(), voice * pre_gain);
        cascade_out *= self.duck.process(
            frame.burst_amplitude,
            frame.frication_amplitude,
            frame.voice_amplitude,
        );
        cascade_out = self.shelf.process(cascade_out);

        let frication = self
            .frication
            .process(frame.noise_filter_freq, frame.noise_filter_bw)
            * 0.3
            * frame.frication_amplitude;
        let burst = self.burst.process(
            frame.burst_amplitude,
            frame.burst_duration,
            frame.burst_filter_freq,
            frame.burst_filter_bw,
            frame.burst_noise_color,
        );
        let parallel_in =
            (frication + burst) * pre_gain + voice * frame.parallel_voice_mix * pre_gain;
        let parallel_out = self.parallel.process(frame, parallel_in);

        let mix = (cascade_out + parallel_out) * frame.output_gain;
        self.limiter.set_fast_release(pre_gain < 0.01);
        let limited = self.limiter.process(mix * OUTPUT_SCALE);
        limited.clamp(-32767.0, 32767.0).round() as i16
    }
}

/// Flush-to-zero and denormals-are-zero keep quiet resonator tails from
/// stalling the audio thread on subnormal arithmetic. The engine sets the
/// mode itself rather than assuming the host has.
fn enable_denormal_flush() {
    #[cfg(target_arch = "x86_64")]
    {
        // MXCSR: FTZ is bit 15, DAZ is bit 6.
        #[allow(deprecated)]
        unsafe {
            use core::arch::x86_64::{_mm_getcsr, _mm_setcsr};
            _mm_setcsr(_mm_getcsr() | 0x8040);
        }
    }
}
