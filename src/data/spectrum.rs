//! Local magnitude spectra of acceleration streams
//!
//! The plugin writes per-axis FFT files in a post-processing step. Streams
//! recorded with processing disabled (or still waiting for it) have none, so
//! the viewer can compute an equivalent spectrum itself:
//!
//! 1. remove the mean of each axis (gravity shows up as a huge DC bin)
//! 2. apply a Hann window over the whole stream
//! 3. forward FFT, keep bins `0..=n/2`
//! 4. single-sided amplitude: `2 * |X[k]| / sum(window)`
//!
//! Bin `k` sits at `k * rate / n` Hz.

use super::{FftSample, Sample};
use rustfft::{num_complex::Complex, FftPlanner};

/// Hanning window function
fn hanning_window(size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (size - 1) as f64).cos()))
        .collect()
}

fn axis_spectrum(planner: &mut FftPlanner<f64>, values: &[f64], window: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    // a two-point Hann window is all zeros
    let gain = match window.iter().sum::<f64>() {
        g if g > 0.0 => g,
        _ => 1.0,
    };

    let mut buffer: Vec<Complex<f64>> = values
        .iter()
        .zip(window)
        .map(|(v, w)| Complex::new((v - mean) * w, 0.0))
        .collect();

    planner.plan_fft_forward(n).process(&mut buffer);

    buffer[..=n / 2]
        .iter()
        .enumerate()
        .map(|(k, c)| {
            // DC and Nyquist have no mirrored twin
            let single_sided = if k == 0 || (n % 2 == 0 && k == n / 2) { 1.0 } else { 2.0 };
            single_sided * c.norm() / gain
        })
        .collect()
}

/// Three-axis spectrum of a stream sampled at `rate_hz`
///
/// Returns nothing for fewer than two samples, a missing/invalid rate or
/// non-finite sample values.
pub fn compute(samples: &[Sample], rate_hz: f64) -> Vec<FftSample> {
    let n = samples.len();
    if n < 2 || !rate_hz.is_finite() || rate_hz <= 0.0 {
        return Vec::new();
    }
    if samples.iter().any(|s| !(s.x.is_finite() && s.y.is_finite() && s.z.is_finite())) {
        log::warn!("stream contains non-finite samples, skipping spectrum");
        return Vec::new();
    }

    let window = hanning_window(n);
    let mut planner = FftPlanner::new();
    let xs: Vec<f64> = samples.iter().map(|s| s.x).collect();
    let ys: Vec<f64> = samples.iter().map(|s| s.y).collect();
    let zs: Vec<f64> = samples.iter().map(|s| s.z).collect();

    let mx = axis_spectrum(&mut planner, &xs, &window);
    let my = axis_spectrum(&mut planner, &ys, &window);
    let mz = axis_spectrum(&mut planner, &zs, &window);

    (0..mx.len())
        .map(|k| FftSample {
            frequency_hz: k as f64 * rate_hz / n as f64,
            magnitude_x: mx[k],
            magnitude_y: my[k],
            magnitude_z: mz[k],
        })
        .collect()
}
