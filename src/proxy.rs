//! Piezo-style EM proxy
//!
//! The proxy is proportional to the strain rate of the stone stage:
//! `k * fs * gradient(vib)`. It is a synthetic measurable, not a physical
//! claim.

/// Sample-spaced numerical gradient: centered differences inside, one-sided
/// differences at both ends. Sequences shorter than 2 samples have no
/// defined gradient and yield zeros.
pub fn gradient(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let mut grad = Vec::with_capacity(n);
    grad.push(x[1] - x[0]);
    grad.extend(x.windows(3).map(|w| (w[2] - w[0]) / 2.0));
    grad.push(x[n - 1] - x[n - 2]);
    grad
}

/// Derive the EM proxy from the final-stage signal.
pub fn em_proxy(vib: &[f64], fs_hz: f64, coupling: f64) -> Vec<f64> {
    let scale = coupling * fs_hz;
    gradient(vib).into_iter().map(|d| scale * d).collect()
}
