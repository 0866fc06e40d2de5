//! Renders a short phrase (vowel - sibilant - vowel - silence) to a WAV
//! file in the current directory.

use std::fs::File;
use std::sync::Arc;

use log::info;

use klsyn_dsp::engine::SpeechWaveGenerator;
use klsyn_dsp::frame::Frame;
use klsyn_dsp::frame_manager::FrameManager;

const SAMPLE_RATE: f32 = 48000.0;

fn ms(milliseconds: f32) -> u32 {
    (milliseconds * 0.001 * SAMPLE_RATE) as u32
}

fn vowel(f1: f32, f2: f32, f3: f32) -> Frame {
    Frame {
        voice_pitch: 120.0,
        end_voice_pitch: 110.0,
        lf_rd: 1.2,
        voice_amplitude: 0.8,
        flutter: 0.25,
        vibrato_speed: 5.0,
        vibrato_pitch_offset: 0.3,
        cf1: f1,
        cb1: 90.0,
        cf2: f2,
        cb2: 110.0,
        cf3: f3,
        cb3: 170.0,
        cf4: 3300.0,
        cb4: 250.0,
        cf5: 3750.0,
        cb5: 200.0,
        pre_formant_gain: 0.9,
        output_gain: 0.8,
        ..Frame::default()
    }
}

fn sibilant() -> Frame {
    Frame {
        frication_amplitude: 0.8,
        noise_filter_freq: 7500.0,
        noise_filter_bw: 2500.0,
        pf5: 7500.0,
        pb5: 1200.0,
        pa5: 1.0,
        parallel_bypass: 0.4,
        pre_formant_gain: 0.8,
        output_gain: 0.8,
        ..Frame::default()
    }
}

fn main() -> std::io::Result<()> {
    simple_logger::SimpleLogger::new().init().unwrap();

    let manager = Arc::new(FrameManager::new());
    let mut engine = SpeechWaveGenerator::new(SAMPLE_RATE);
    engine.set_frame_manager(manager.clone());

    manager.queue_frame(Some(&vowel(700.0, 1220.0, 2600.0)), ms(220.0), ms(10.0), 0, false);
    manager.queue_frame(Some(&sibilant()), ms(160.0), ms(30.0), 1, false);
    manager.queue_frame(Some(&vowel(300.0, 2300.0, 3000.0)), ms(220.0), ms(30.0), 2, false);
    manager.queue_frame(None, ms(60.0), ms(20.0), -1, false);

    let mut samples = Vec::new();
    let mut buffer = [0i16; 480];
    loop {
        let produced = engine.generate(&mut buffer);
        samples.extend_from_slice(&buffer[..produced]);
        if produced < buffer.len() {
            break;
        }
    }
    info!(
        "rendered {} samples ({:.2} s), last frame index {}",
        samples.len(),
        samples.len() as f32 / SAMPLE_RATE,
        manager.last_user_index()
    );

    let mut file = File::create("phrase.wav")?;
    let header = wav::Header::new(wav::WAV_FORMAT_PCM, 1, SAMPLE_RATE as u32, 16);
    wav::write(header, &wav::BitDepth::from(samples), &mut file)?;
    info!("wrote phrase.wav");
    Ok(())
}
