//! End-to-end scenarios for the synthesis engine.


use std::sync::Arc;

use klsyn_dsp::engine::SpeechWaveGenerator;
use klsyn_dsp::frame::Frame;
use klsyn_dsp::frame_manager::FrameManager;

const SAMPLE_RATE: f32 = 96000.0;

fn engine_with_manager() -> (SpeechWaveGenerator, Arc<FrameManager>) {
    let manager = Arc::new(FrameManager::new());
    let mut engine = SpeechWaveGenerator::new(SAMPLE_RATE);
    engine.set_frame_manager(manager.clone());
    (engine, manager)
}

fn ms(milliseconds: f32) -> u32 {
    (milliseconds * 0.001 * SAMPLE_RATE) as u32
}

fn vowel(pitch: f32, f1: f32, f2: f32, f3: f32) -> Frame {
    Frame {
        voice_pitch: pitch,
        end_voice_pitch: pitch,
        lf_rd: 1.5,
        voice_amplitude: 0.8,
        cf1: f1,
        cb1: 90.0,
        cf2: f2,
        cb2: 110.0,
        cf3: f3,
        cb3: 170.0,
        pre_formant_gain: 0.9,
        output_gain: 0.8,
        ..Frame::default()
    }
}

#[test]
fn vowel_fundamental_and_formants() {
    let (mut engine, manager) = engine_with_manager();
    let frame = vowel(120.0, 700.0, 1220.0, 2600.0);
    manager.queue_frame(Some(&frame), ms(200.0), 1, 0, false);

    let mut out = vec![0i16; ms(200.0) as usize];
    let produced = engine.generate(&mut out);
    assert_eq!(produced, out.len());
    wav_writer::write("engine/vowel_a.wav", SAMPLE_RATE as u32, &out).ok();

    // Analyze the steady state, skipping the onset.
    let samples = spectral::to_f32(&out[out.len() - 16384..]);

    let f0 = spectral::peak_frequency(&samples, SAMPLE_RATE, 100.0, 140.0, 0.25);
    assert!((f0 - 120.0).abs() <= 1.0, "fundamental at {f0} Hz");

    // Formant peaks land on the harmonic closest to each resonance.
    let f1 = spectral::peak_frequency(&samples, SAMPLE_RATE, 450.0, 1000.0, 5.0);
    assert!((630.0..=770.0).contains(&f1), "F1 at {f1} Hz");
    let f2 = spectral::peak_frequency(&samples, SAMPLE_RATE, 1000.0, 1700.0, 5.0);
    assert!((1098.0..=1342.0).contains(&f2), "F2 at {f2} Hz");
    let f3 = spectral::peak_frequency(&samples, SAMPLE_RATE, 2100.0, 3100.0, 5.0);
    assert!((2340.0..=2860.0).contains(&f3), "F3 at {f3} Hz");
}

#[test]
fn voiceless_sibilant_centroid() {
    let (mut engine, manager) = engine_with_manager();
    let frame = Frame {
        frication_amplitude: 1.0,
        noise_filter_freq: 8000.0,
        noise_filter_bw: 2500.0,
        parallel_bypass: 1.0,
        pre_formant_gain: 0.8,
        output_gain: 1.0,
        ..Frame::default()
    };
    manager.queue_frame(Some(&frame), ms(150.0), 1, 0, false);

    let mut out = vec![0i16; ms(150.0) as usize];
    let produced = engine.generate(&mut out);
    assert_eq!(produced, out.len());
    wav_writer::write("engine/sibilant.wav", SAMPLE_RATE as u32, &out).ok();

    let samples = spectral::to_f32(&out[ms(10.0) as usize..]);
    assert!(spectral::rms(&samples) > 50.0, "sibilant produced no energy");

    let centroid = spectral::centroid(&samples, SAMPLE_RATE, 500.0, 40000.0, 250.0);
    assert!(
        centroid > 5000.0 && centroid < 20000.0,
        "spectral centroid at {centroid} Hz"
    );

    // No voicing: nothing periodic near a typical fundamental.
    let low = spectral::peak_magnitude(&samples, SAMPLE_RATE, 80.0, 300.0, 5.0);
    let peak = spectral::peak_magnitude(&samples, SAMPLE_RATE, 4000.0, 16000.0, 100.0);
    assert!(low < peak * 0.1, "unexpected low-frequency energy");
}

#[test]
fn stop_burst_peaks_early() {
    let (mut engine, manager) = engine_with_manager();

    let silence = Frame::default();
    manager.queue_frame(Some(&silence), ms(50.0), 1, -1, false);

    let release = Frame {
        burst_amplitude: 0.6,
        burst_duration: 0.25,
        burst_filter_freq: 4000.0,
        burst_filter_bw: 1500.0,
        parallel_bypass: 1.0,
        pre_formant_gain: 0.8,
        output_gain: 1.0,
        ..Frame::default()
    };
    manager.queue_frame(Some(&release), ms(40.0), 1, -1, false);
    manager.queue_frame(Some(&vowel(120.0, 700.0, 1220.0, 2600.0)), ms(100.0), ms(5.0), -1, false);

    let mut out = vec![0i16; ms(200.0) as usize];
    let produced = engine.generate(&mut out);
    assert!(produced > ms(150.0) as usize);
    wav_writer::write("engine/stop_burst.wav", SAMPLE_RATE as u32, &out[..produced]).ok();

    let samples = spectral::to_f32(&out[..produced]);

    // The preceding closure is silent.
    let closure = &samples[..ms(45.0) as usize];
    assert!(spectral::rms(closure) < 2.0, "closure was not silent");

    // Locate the burst onset and check the energy is front-loaded.
    let onset = samples
        .iter()
        .position(|&s| s.abs() > 50.0)
        .expect("burst not found");
    let early = &samples[onset..onset + ms(10.0) as usize];
    let late = &samples[onset + ms(20.0) as usize..onset + ms(30.0) as usize];
    assert!(
        spectral::rms(early) > 5.0 * spectral::rms(late).max(1.0),
        "burst energy not concentrated in the first 10 ms"
    );

    // The vowel that follows is present.
    let vowel_window = &samples[samples.len() - ms(50.0) as usize..];
    assert!(spectral::rms(vowel_window) > 100.0, "vowel missing after burst");
}

#[test]
fn deterministic_output() {
    let render = || {
        let (mut engine, manager) = engine_with_manager();
        let noisy_vowel = Frame {
            flutter: 0.25,
            voice_turbulence_amplitude: 0.5,
            aspiration_amplitude: 0.3,
            frication_amplitude: 0.4,
            noise_filter_freq: 6000.0,
            noise_filter_bw: 2000.0,
            parallel_bypass: 0.5,
            ..vowel(110.0, 700.0, 1220.0, 2600.0)
        };
        manager.queue_frame(Some(&noisy_vowel), ms(100.0), ms(5.0), 0, false);
        let mut out = vec![0i16; ms(100.0) as usize];
        let produced = engine.generate(&mut out);
        out.truncate(produced);
        out
    };

    assert_eq!(render(), render());
}

#[test]
fn output_bounded_under_extreme_gain() {
    let (mut engine, manager) = engine_with_manager();
    let loud = Frame {
        voice_amplitude: 1.0,
        frication_amplitude: 1.0,
        noise_filter_freq: 4000.0,
        noise_filter_bw: 2000.0,
        burst_amplitude: 1.0,
        burst_duration: 1.0,
        burst_filter_freq: 3000.0,
        burst_filter_bw: 1000.0,
        parallel_bypass: 1.0,
        pre_formant_gain: 1.0,
        output_gain: 1.0,
        ..vowel(120.0, 700.0, 1220.0, 2600.0)
    };
    manager.queue_frame(Some(&loud), ms(100.0), 1, 0, false);

    let mut out = vec![0i16; ms(100.0) as usize];
    let produced = engine.generate(&mut out);
    assert_eq!(produced, out.len());
    for &s in &out {
        assert!(s > -32768, "sample beyond the clamp range");
    }
}

#[test]
fn silence_in_silence_out() {
    let (mut engine, manager) = engine_with_manager();
    manager.queue_frame(Some(&vowel(120.0, 700.0, 1220.0, 2600.0)), ms(100.0), 1, -1, false);
    manager.queue_frame(Some(&Frame::default()), ms(100.0), ms(5.0), -1, false);

    let mut out = vec![0i16; ms(250.0) as usize];
    let produced = engine.generate(&mut out);
    assert!(produced < out.len(), "scheduler should run dry");
    assert!(produced > ms(190.0) as usize);

    // The tail has fully drained.
    let tail = &out[produced - ms(10.0) as usize..produced];
    assert!(tail.iter().all(|&s| s.abs() <= 1), "tail did not converge to zero");
}

#[test]
fn purge_reports_last_index_and_stays_continuous() {
    let (mut engine, manager) = engine_with_manager();
    manager.queue_frame(Some(&vowel(120.0, 270.0, 2290.0, 3010.0)), ms(150.0), ms(50.0), 11, false);
    manager.queue_frame(Some(&vowel(120.0, 440.0, 1020.0, 2240.0)), ms(150.0), ms(50.0), 22, false);
    manager.queue_frame(Some(&vowel(120.0, 270.0, 2290.0, 3010.0)), ms(150.0), ms(50.0), 33, false);

    let mut first = vec![0i16; ms(60.0) as usize];
    assert_eq!(engine.generate(&mut first), first.len());
    assert_eq!(manager.last_user_index(), 11);

    let mut second = vec![0i16; ms(200.0) as usize];
    assert_eq!(engine.generate(&mut second), second.len());
    assert_eq!(manager.last_user_index(), 22);

    // Per-sample slew of ordinary vowel material, as a click yardstick.
    let steady_slew = second
        .windows(2)
        .map(|w| (w[1] as i32 - w[0] as i32).abs())
        .max()
        .unwrap();

    // Purge mid-stream and drain to silence.
    manager.queue_frame(None, ms(50.0), ms(10.0), -1, true);
    let mut after = vec![0i16; ms(120.0) as usize];
    let produced = engine.generate(&mut after);
    assert!(produced > ms(50.0) as usize);
    assert_eq!(manager.last_user_index(), 22);

    let boundary: Vec<i16> = second[second.len() - 4..]
        .iter()
        .chain(after[..ms(20.0) as usize].iter())
        .copied()
        .collect();
    let purge_slew = boundary
        .windows(2)
        .map(|w| (w[1] as i32 - w[0] as i32).abs())
        .max()
        .unwrap();
    assert!(
        purge_slew <= steady_slew * 4 + 64,
        "purge clicked: slew {purge_slew} vs steady {steady_slew}"
    );

    // After the silence sentinel, the output decays away.
    let tail = &after[produced - ms(10.0) as usize..produced];
    assert!(tail.iter().all(|&s| s.abs() <= 2), "purge tail did not decay");
}

#[test]
fn generate_without_frames() {
    let (mut engine, manager) = engine_with_manager();
    let mut out = [0i16; 256];
    assert_eq!(engine.generate(&mut out), 0);

    // The engine stays usable: a later frame produces sound.
    manager.queue_frame(Some(&vowel(120.0, 700.0, 1220.0, 2600.0)), ms(50.0), 1, 0, false);
    let produced = engine.generate(&mut out);
    assert_eq!(produced, out.len());
}

#[test]
fn generate_without_manager() {
    let mut engine = SpeechWaveGenerator::new(SAMPLE_RATE);
    let mut out = [0i16; 64];
    assert_eq!(engine.generate(&mut out), 0);
}
