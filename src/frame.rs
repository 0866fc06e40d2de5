//! Parameter frames: the immutable snapshots that govern the synthesis
//! pipeline for a scheduled time window.

use crate::utils::value_at_fade_position;

/// One snapshot of the synthesizer's control parameters.
///
/// All fields are finite non-negative reals except where noted. Frequencies
/// and bandwidths are in Hz; amplitudes, gains and mix ratios are in the
/// 0..1 range. A frequency or bandwidth of zero bypasses the resonator it
/// drives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    // Voicing.
    /// Fundamental frequency of phonation in Hz.
    pub voice_pitch: f32,
    /// Pitch at the end of the frame's hold time; the scheduler sweeps
    /// toward it linearly.
    pub end_voice_pitch: f32,
    /// Pitch at the midpoint of the hold time. Non-zero selects a 3-point
    /// contour (`voice_pitch` -> `mid_voice_pitch` -> `end_voice_pitch`).
    pub mid_voice_pitch: f32,
    /// Peak vibrato deviation as a fraction of a semitone.
    pub vibrato_pitch_offset: f32,
    /// Vibrato rate in Hz.
    pub vibrato_speed: f32,
    /// Amplitude of the glottal source.
    pub voice_amplitude: f32,
    /// Breathiness: aspiration noise injected while the glottis is open.
    pub voice_turbulence_amplitude: f32,
    /// Amplitude of free-standing aspiration (whisper, /h/).
    pub aspiration_amplitude: f32,
    /// Centre frequency of the aspiration coloring filter; 0 selects the
    /// pink fallback.
    pub aspiration_filter_freq: f32,
    pub aspiration_filter_bw: f32,
    /// Pure sine at the fundamental, for voicebars and voiced fricatives.
    pub sinusoidal_voicing_amplitude: f32,

    // Voice quality.
    /// LF-model shape parameter: 0.3 tense .. 2.7 breathy, 0 = no voicing.
    pub lf_rd: f32,
    /// High-frequency attenuation at 5 kHz in dB (0..41).
    pub spectral_tilt: f32,
    /// Stochastic jitter/shimmer amount (0..1).
    pub flutter: f32,
    /// Period alternation for creaky voice (0..1).
    pub diplophonia: f32,

    // Tracheal pole/zero pairs.
    pub ftp_freq1: f32,
    pub ftp_bw1: f32,
    pub ftz_freq1: f32,
    pub ftz_bw1: f32,
    pub ftp_freq2: f32,
    pub ftp_bw2: f32,
    pub ftz_freq2: f32,
    pub ftz_bw2: f32,

    // Pitch-synchronous F1/B1 modulation during the glottal open phase.
    pub delta_f1: f32,
    pub delta_b1: f32,

    // Cascade formants.
    pub cf1: f32,
    pub cf2: f32,
    pub cf3: f32,
    pub cf4: f32,
    pub cf5: f32,
    pub cf6: f32,
    pub cb1: f32,
    pub cb2: f32,
    pub cb3: f32,
    pub cb4: f32,
    pub cb5: f32,
    pub cb6: f32,
    /// Nasal zero (anti-resonator) in the cascade path.
    pub cfn0: f32,
    pub cbn0: f32,
    /// Nasal pole in the cascade path.
    pub cfnp: f32,
    pub cbnp: f32,
    /// Mix of the nasal pole output (0 = bypass, 1 = full).
    pub canp: f32,

    // Fricatives and the parallel path.
    pub frication_amplitude: f32,
    /// Centre frequency of the frication coloring filter; 0 selects the
    /// pink fallback.
    pub noise_filter_freq: f32,
    pub noise_filter_bw: f32,
    pub pf1: f32,
    pub pf2: f32,
    pub pf3: f32,
    pub pf4: f32,
    pub pf5: f32,
    pub pf6: f32,
    pub pb1: f32,
    pub pb2: f32,
    pub pb3: f32,
    pub pb4: f32,
    pub pb5: f32,
    pub pb6: f32,
    pub pa1: f32,
    pub pa2: f32,
    pub pa3: f32,
    pub pa4: f32,
    pub pa5: f32,
    pub pa6: f32,
    /// Anti-resonator applied to the parallel sum.
    pub parallel_anti_freq: f32,
    pub parallel_anti_bw: f32,
    /// Share of the input that bypasses the parallel resonators (0..1).
    pub parallel_bypass: f32,
    /// Share of the voice source routed into the parallel path (0..1).
    pub parallel_voice_mix: f32,

    // Stop bursts.
    pub burst_amplitude: f32,
    /// Burst length, normalized 0..1 over a 5..20 ms range.
    pub burst_duration: f32,
    pub burst_filter_freq: f32,
    pub burst_filter_bw: f32,
    /// Burst noise color: 0 white .. 1 pink.
    pub burst_noise_color: f32,

    // Trills.
    pub trill_rate: f32,
    pub trill_depth: f32,

    // Gains.
    /// Gain applied to all vocal tract sound before the formant resonators.
    /// Useful for stopping and starting speech.
    pub pre_formant_gain: f32,
    /// Master output gain.
    pub output_gain: f32,
}

impl Frame {
    /// Interpolate between two frames at a fade position in [0, 1].
    ///
    /// Most parameters follow the smootherstep curve, which has zero slope
    /// at both endpoints, so chained crossfades meet without corners. The
    /// noise, burst and trill fields step to the target immediately: they
    /// drive onsets whose timing must not smear across a fade. NaN targets
    /// keep the old value.
    pub fn at_fade_position(old: &Frame, new: &Frame, fade_ratio: f32) -> Frame {
        let fade = |old_value: f32, new_value: f32| -> f32 {
            value_at_fade_position(old_value, new_value, fade_ratio)
        };

        Frame {
            voice_pitch: fade(old.voice_pitch, new.voice_pitch),
            end_voice_pitch: fade(old.end_voice_pitch, new.end_voice_pitch),
            mid_voice_pitch: fade(old.mid_voice_pitch, new.mid_voice_pitch),
            vibrato_pitch_offset: fade(old.vibrato_pitch_offset, new.vibrato_pitch_offset),
            vibrato_speed: fade(old.vibrato_speed, new.vibrato_speed),
            voice_amplitude: fade(old.voice_amplitude, new.voice_amplitude),
            voice_turbulence_amplitude: fade(
                old.voice_turbulence_amplitude,
                new.voice_turbulence_amplitude,
            ),
            aspiration_amplitude: fade(old.aspiration_amplitude, new.aspiration_amplitude),
            aspiration_filter_freq: fade(old.aspiration_filter_freq, new.aspiration_filter_freq),
            aspiration_filter_bw: fade(old.aspiration_filter_bw, new.aspiration_filter_bw),
            sinusoidal_voicing_amplitude: fade(
                old.sinusoidal_voicing_amplitude,
                new.sinusoidal_voicing_amplitude,
            ),

            lf_rd: fade(old.lf_rd, new.lf_rd),
            spectral_tilt: fade(old.spectral_tilt, new.spectral_tilt),
            flutter: fade(old.flutter, new.flutter),
            diplophonia: fade(old.diplophonia, new.diplophonia),

            ftp_freq1: fade(old.ftp_freq1, new.ftp_freq1),
            ftp_bw1: fade(old.ftp_bw1, new.ftp_bw1),
            ftz_freq1: fade(old.ftz_freq1, new.ftz_freq1),
            ftz_bw1: fade(old.ftz_bw1, new.ftz_bw1),
            ftp_freq2: fade(old.ftp_freq2, new.ftp_freq2),
            ftp_bw2: fade(old.ftp_bw2, new.ftp_bw2),
            ftz_freq2: fade(old.ftz_freq2, new.ftz_freq2),
            ftz_bw2: fade(old.ftz_bw2, new.ftz_bw2),

            delta_f1: fade(old.delta_f1, new.delta_f1),
            delta_b1: fade(old.delta_b1, new.delta_b1),

            cf1: fade(old.cf1, new.cf1),
            cf2: fade(old.cf2, new.cf2),
            cf3: fade(old.cf3, new.cf3),
            cf4: fade(old.cf4, new.cf4),
            cf5: fade(old.cf5, new.cf5),
            cf6: fade(old.cf6, new.cf6),
            cb1: fade(old.cb1, new.cb1),
            cb2: fade(old.cb2, new.cb2),
            cb3: fade(old.cb3, new.cb3),
            cb4: fade(old.cb4, new.cb4),
            cb5: fade(old.cb5, new.cb5),
            cb6: fade(old.cb6, new.cb6),
            cfn0: fade(old.cfn0, new.cfn0),
            cbn0: fade(old.cbn0, new.cbn0),
            cfnp: fade(old.cfnp, new.cfnp),
            cbnp: fade(old.cbnp, new.cbnp),
            canp: fade(old.canp, new.canp),

            pf1: fade(old.pf1, new.pf1),
            pf2: fade(old.pf2, new.pf2),
            pf3: fade(old.pf3, new.pf3),
            pf4: fade(old.pf4, new.pf4),
            pf5: fade(old.pf5, new.pf5),
            pf6: fade(old.pf6, new.pf6),
            pb1: fade(old.pb1, new.pb1),
            pb2: fade(old.pb2, new.pb2),
            pb3: fade(old.pb3, new.pb3),
            pb4: fade(old.pb4, new.pb4),
            pb5: fade(old.pb5, new.pb5),
            pb6: fade(old.pb6, new.pb6),
            pa1: fade(old.pa1, new.pa1),
            pa2: fade(old.pa2, new.pa2),
            pa3: fade(old.pa3, new.pa3),
            pa4: fade(old.pa4, new.pa4),
            pa5: fade(old.pa5, new.pa5),
            pa6: fade(old.pa6, new.pa6),
            parallel_bypass: fade(old.parallel_bypass, new.parallel_bypass),
            parallel_voice_mix: fade(old.parallel_voice_mix, new.parallel_voice_mix),

            pre_formant_gain: fade(old.pre_formant_gain, new.pre_formant_gain),
            output_gain: fade(old.output_gain, new.output_gain),

            // Step-instant fields: the target value applies from the first
            // fade sample.
            burst_amplitude: new.burst_amplitude,
            burst_duration: new.burst_duration,
            burst_filter_freq: new.burst_filter_freq,
            burst_filter_bw: new.burst_filter_bw,
            burst_noise_color: new.burst_noise_color,
            frication_amplitude: new.frication_amplitude,
            noise_filter_freq: new.noise_filter_freq,
            noise_filter_bw: new.noise_filter_bw,
            parallel_anti_freq: new.parallel_anti_freq,
            parallel_anti_bw: fade(old.parallel_anti_bw, new.parallel_anti_bw),
            trill_rate: new.trill_rate,
            trill_depth: new.trill_depth,
        }
    }
}
