//! Tests for the noise generators.


use klsyn_dsp::noise::{ColoredNoiseGenerator, NoiseGenerator};

const SAMPLE_RATE: f32 = 96000.0;

#[test]
fn white_noise_is_bounded_and_centred() {
    let mut noise = NoiseGenerator::new();
    let samples: Vec<f32> = (0..200_000).map(|_| noise.white()).collect();

    assert!(samples.iter().all(|s| s.abs() < 1.0));
    let mean: f64 = samples.iter().map(|&s| s as f64).sum::<f64>() / samples.len() as f64;
    assert!(mean.abs() < 0.01, "mean {mean}");
    let rms = spectral::rms(&samples);
    // Uniform noise has an RMS of 1/sqrt(3).
    assert!((0.55..=0.60).contains(&rms), "rms {rms}");
}

#[test]
fn fixed_seed_makes_noise_reproducible() {
    let mut a = NoiseGenerator::new();
    let mut b = NoiseGenerator::new();
    for _ in 0..10_000 {
        assert_eq!(a.white(), b.white());
    }

    let mut c = NoiseGenerator::with_seed(0x1234_5678, 0x9abc_def0);
    let mut a = NoiseGenerator::new();
    let same = (0..1000).filter(|_| a.white() == c.white()).count();
    assert!(same < 10, "seed override had no effect");
}

#[test]
fn colored_noise_falls_back_to_pink_below_100_hz() {
    let mut colored = ColoredNoiseGenerator::new(SAMPLE_RATE);
    let mut pink = NoiseGenerator::new();
    for _ in 0..1000 {
        assert_eq!(colored.process(50.0, 1000.0), pink.pink());
    }
}

#[test]
fn colored_noise_centroid_tracks_the_filter() {
    let render = |freq: f32, bw: f32| -> Vec<f32> {
        let mut colored = ColoredNoiseGenerator::new(SAMPLE_RATE);
        (0..32768).map(|_| colored.process(freq, bw)).collect()
    };

    let sibilant = render(8000.0, 2500.0);
    let high = spectral::centroid(&sibilant, SAMPLE_RATE, 500.0, 40000.0, 250.0);
    assert!((5000.0..20000.0).contains(&high), "sibilant centroid {high}");

    let diffuse = render(2000.0, 1000.0);
    let low = spectral::centroid(&diffuse, SAMPLE_RATE, 500.0, 40000.0, 250.0);
    assert!(low < high - 1000.0, "centroids not ordered: {low} vs {high}");
}

#[test]
fn bandwidth_gain_keeps_narrow_filters_audible() {
    let rms_at = |bw: f32| -> f64 {
        let mut colored = ColoredNoiseGenerator::new(SAMPLE_RATE);
        let samples: Vec<f32> = (0..48000).map(|_| colored.process(4000.0, bw)).collect();
        spectral::rms(&samples)
    };

    assert!(
        rms_at(1500.0) > rms_at(6000.0),
        "narrow filter quieter than wide despite compensation"
    );
}
