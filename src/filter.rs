//! Second-order resonant (peaking band-pass) filter stage

use std::f64::consts::TAU;

use rustfft::num_complex::Complex64;

use crate::config::ResonatorSpec;
use crate::ResonanceError;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Biquad {
    // a0 = 1
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    // state
    z1: f64,
    z2: f64,
}

impl Biquad {
    #[inline]
    fn process_sample(&mut self, x: f64) -> f64 {
        // transposed direct form II
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

/// A resonant stage with unity peak gain at `f0` followed by a constant output
/// gain. Coefficients are fixed at construction; every call to [`apply`]
/// starts from rest.
///
/// [`apply`]: ResonantFilter::apply
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResonantFilter {
    fs_hz: f64,
    spec: ResonatorSpec,
    section: Biquad,
}

impl ResonantFilter {
    /// Design the filter for `spec` at sample rate `fs_hz`.
    ///
    /// `w0 = 2π f0 / fs`, `bw = w0 / Q`, `g = 1 / (1 + tan(bw / 2))`, giving
    /// `b = (1 - g) [1, 0, -1]` and `a = [1, -2 g cos w0, 2 g - 1]`.
    pub fn new(spec: ResonatorSpec, fs_hz: f64) -> Result<Self, ResonanceError> {
        if !(fs_hz.is_finite() && fs_hz > 0.0) {
            return Err(ResonanceError::config(
                "fs_hz",
                format!("must be > 0 (got {fs_hz})"),
            ));
        }
        if !(spec.f0_hz.is_finite() && spec.f0_hz > 0.0 && spec.f0_hz < fs_hz / 2.0) {
            return Err(ResonanceError::config(
                "f0_hz",
                format!(
                    "must lie in (0, {}) Hz (got {})",
                    fs_hz / 2.0,
                    spec.f0_hz
                ),
            ));
        }
        if !(spec.q.is_finite() && spec.q > 0.0) {
            return Err(ResonanceError::config(
                "q",
                format!("must be > 0 (got {})", spec.q),
            ));
        }

        let w0 = TAU * spec.f0_hz / fs_hz;
        let bw = w0 / spec.q;
        let beta = (bw / 2.0).tan();
        let g = 1.0 / (1.0 + beta);

        let section = Biquad {
            b0: 1.0 - g,
            b1: 0.0,
            b2: -(1.0 - g),
            a1: -2.0 * g * w0.cos(),
            a2: 2.0 * g - 1.0,
            z1: 0.0,
            z2: 0.0,
        };

        Ok(Self {
            fs_hz,
            spec,
            section,
        })
    }

    pub fn spec(&self) -> ResonatorSpec {
        self.spec
    }

    pub fn fs_hz(&self) -> f64 {
        self.fs_hz
    }

    /// Filter `input` causally and scale by the stage gain.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        let mut section = self.section;
        let gain = self.spec.gain;
        input
            .iter()
            .map(|&x| gain * section.process_sample(x))
            .collect()
    }

    /// Magnitude of the unscaled transfer function at `freq_hz`.
    pub fn magnitude_at(&self, freq_hz: f64) -> f64 {
        let w = TAU * freq_hz / self.fs_hz;
        let z1 = Complex64::from_polar(1.0, -w);
        let z2 = Complex64::from_polar(1.0, -2.0 * w);
        let s = &self.section;
        let num = Complex64::new(s.b0, 0.0) + z1 * s.b1 + z2 * s.b2;
        let den = Complex64::new(1.0, 0.0) + z1 * s.a1 + z2 * s.a2;
        (num / den).norm()
    }
}
