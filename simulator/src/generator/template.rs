use std::f32::consts::PI;

/// Sine carrier sampled at `sample_rate_hz`.
pub fn sine_wave(length: usize, frequency_hz: f32, sample_rate_hz: f32) -> Vec<f32> {
    (0..length)
        .map(|i| (i as f32 / sample_rate_hz * frequency_hz * 2.0 * PI).sin())
        .collect()
}

/// Decaying envelope starting at `onset_index`; zero before it.
pub fn arrival_envelope(length: usize, onset_index: usize, decay_samples: f32) -> Vec<f32> {
    (0..length)
        .map(|i| {
            if i < onset_index {
                0.0
            } else {
                (-((i - onset_index) as f32) / decay_samples.max(1.0)).exp()
            }
        })
        .collect()
}
