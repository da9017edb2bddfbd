//! Signal summary statistics: RMS and spectral peak location.

use std::f64::consts::TAU;

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

/// Root-mean-square of `x`. Empty input is treated as silence.
pub fn rms(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = x.iter().map(|&v| v * v).sum();
    (sum_sq / x.len() as f64).sqrt()
}

/// Symmetric Hann window
/// w[i] = 0.5 * (1 - cos(2πi/(N-1)))
pub fn hann_window_symmetric(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|i| 0.5 * (1.0 - (TAU * i as f64 / denom).cos()))
                .collect()
        }
    }
}

/// Magnitudes of the non-negative frequency bins `0..=n/2` of a real signal.
pub fn real_magnitude_spectrum(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buf: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buf);

    buf.truncate(n / 2 + 1);
    buf.into_iter().map(|c| c.norm()).collect()
}

/// Frequency [Hz] of the strongest non-DC bin of the Hann-windowed spectrum.
///
/// Resolution is `fs / n`. Ties resolve to the lowest bin, so an all-zero
/// signal reports `fs / n`. Signals shorter than two samples have no
/// non-DC bin and report 0.
pub fn dominant_frequency(x: &[f64], fs_hz: f64) -> f64 {
    let n = x.len();
    if n < 2 {
        return 0.0;
    }

    let window = hann_window_symmetric(n);
    let windowed: Vec<f64> = x.iter().zip(&window).map(|(v, w)| v * w).collect();
    let mag = real_magnitude_spectrum(&windowed);

    let mut best_idx = 1;
    let mut best_mag = mag[1];
    for (idx, &m) in mag.iter().enumerate().skip(2) {
        if m > best_mag {
            best_idx = idx;
            best_mag = m;
        }
    }

    best_idx as f64 * fs_hz / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rms_of_constant_and_zero() {
        assert_eq!(rms(&[0.0; 16]), 0.0);
        assert_eq!(rms(&[]), 0.0);
        assert_abs_diff_eq!(rms(&[-2.0, 2.0, -2.0]), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rms_of_sine_is_amplitude_over_sqrt2() {
        let x: Vec<f64> = (0..1000).map(|i| 3.0 * (TAU * 5.0 * i as f64 / 1000.0).sin()).collect();
        assert_abs_diff_eq!(rms(&x), 3.0 / 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn hann_window_is_symmetric_and_zero_at_edges() {
        let w = hann_window_symmetric(9);
        assert_eq!(w.len(), 9);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[8], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[4], 1.0, epsilon = 1e-15);
        for i in 0..9 {
            assert_abs_diff_eq!(w[i], w[8 - i], epsilon = 1e-15);
        }
        assert_eq!(hann_window_symmetric(1), vec![1.0]);
    }

    #[test]
    fn spectrum_has_half_plus_one_bins() {
        assert_eq!(real_magnitude_spectrum(&[1.0; 10]).len(), 6);
        assert_eq!(real_magnitude_spectrum(&[1.0; 11]).len(), 6);
    }

    #[test]
    fn dominant_frequency_of_pure_sine_is_within_one_bin() {
        let fs = 1000.0;
        let n = 4000;
        let f = 37.3;
        let x: Vec<f64> = (0..n).map(|i| (TAU * f * i as f64 / fs).sin()).collect();
        let peak = dominant_frequency(&x, fs);
        assert!((peak - f).abs() <= fs / n as f64, "peak {peak} vs {f}");
    }

    #[test]
    fn dc_offset_does_not_mask_the_tone() {
        let fs = 200.0;
        let x: Vec<f64> = (0..400)
            .map(|i| 0.1 + (TAU * 20.0 * i as f64 / fs).sin())
            .collect();
        assert_abs_diff_eq!(dominant_frequency(&x, fs), 20.0, epsilon = 0.5);
    }

    #[test]
    fn all_zero_signal_reports_first_bin() {
        assert_eq!(dominant_frequency(&[0.0; 100], 50.0), 0.5);
    }
}
