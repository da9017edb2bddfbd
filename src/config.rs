use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::ResonanceError;

/// One second-order resonant stage: center frequency, quality factor and
/// post-filter gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResonatorSpec {
    pub f0_hz: f64,
    pub q: f64,
    pub gain: f64,
}

/// Parameters of one simulation run.
///
/// Serialized flat: the artifact's `config` object carries exactly these field
/// names, each a number.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonanceConfig {
    /// Sample rate [Hz]
    #[serde_as(as = "DefaultOnNull")]
    pub fs_hz: f64,
    /// Run duration [s]
    #[serde_as(as = "DefaultOnNull")]
    pub seconds: f64,

    /// Water-pressure drive frequency [Hz]
    #[serde_as(as = "DefaultOnNull")]
    pub drive_hz: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub drive_amp: f64,
    /// Standard deviation of the additive Gaussian drive noise
    #[serde_as(as = "DefaultOnNull")]
    pub drive_noise: f64,

    /// Acoustic chamber resonance
    #[serde_as(as = "DefaultOnNull")]
    pub chamber_f0_hz: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub chamber_q: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub chamber_gain: f64,

    /// Stone vibration resonance
    #[serde_as(as = "DefaultOnNull")]
    pub stone_f0_hz: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub stone_q: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub stone_gain: f64,

    /// Piezo -> EM proxy coupling coefficient
    #[serde_as(as = "DefaultOnNull")]
    pub piezo_k: f64,

    /// Strength of the tanh saturation applied to the noisy drive
    #[serde_as(as = "DefaultOnNull")]
    pub nonlinearity: f64,
}

impl Default for ResonanceConfig {
    fn default() -> Self {
        Self {
            fs_hz: 2000.0,
            seconds: 30.0,
            drive_hz: 20.0,
            drive_amp: 1.0,
            drive_noise: 0.02,
            chamber_f0_hz: 25.0,
            chamber_q: 12.0,
            chamber_gain: 3.0,
            stone_f0_hz: 32.0,
            stone_q: 18.0,
            stone_gain: 2.0,
            piezo_k: 0.05,
            nonlinearity: 0.10,
        }
    }
}

impl ResonanceConfig {
    pub fn validate(&self) -> Result<(), ResonanceError> {
        require_positive("fs_hz", self.fs_hz)?;
        require_positive("seconds", self.seconds)?;

        let samples = self.sample_count();
        if samples < 2 {
            return Err(ResonanceError::config(
                "seconds",
                format!(
                    "must yield at least 2 samples at fs_hz={} (got {samples})",
                    self.fs_hz
                ),
            ));
        }

        let nyquist = self.nyquist_hz();
        require_below_nyquist("drive_hz", self.drive_hz, nyquist)?;
        require_below_nyquist("chamber_f0_hz", self.chamber_f0_hz, nyquist)?;
        require_below_nyquist("stone_f0_hz", self.stone_f0_hz, nyquist)?;

        require_positive("chamber_q", self.chamber_q)?;
        require_positive("stone_q", self.stone_q)?;

        require_non_negative("drive_noise", self.drive_noise)?;
        require_non_negative("nonlinearity", self.nonlinearity)?;

        require_finite("drive_amp", self.drive_amp)?;
        require_finite("chamber_gain", self.chamber_gain)?;
        require_finite("stone_gain", self.stone_gain)?;
        require_finite("piezo_k", self.piezo_k)?;

        Ok(())
    }

    /// Number of samples in one run, `trunc(fs_hz * seconds)`.
    pub fn sample_count(&self) -> usize {
        let raw = self.fs_hz * self.seconds;
        if raw.is_finite() && raw > 0.0 {
            raw.trunc() as usize
        } else {
            0
        }
    }

    pub fn nyquist_hz(&self) -> f64 {
        self.fs_hz / 2.0
    }

    pub fn chamber(&self) -> ResonatorSpec {
        ResonatorSpec {
            f0_hz: self.chamber_f0_hz,
            q: self.chamber_q,
            gain: self.chamber_gain,
        }
    }

    pub fn stone(&self) -> ResonatorSpec {
        ResonatorSpec {
            f0_hz: self.stone_f0_hz,
            q: self.stone_q,
            gain: self.stone_gain,
        }
    }

    /// Clone of this configuration with only the drive frequency replaced.
    pub fn with_drive_hz(&self, drive_hz: f64) -> Self {
        Self {
            drive_hz,
            ..self.clone()
        }
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ResonanceError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ResonanceError::config(field, format!("must be finite (got {value})")))
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ResonanceError> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ResonanceError::config(field, format!("must be > 0 (got {value})")))
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<(), ResonanceError> {
    require_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ResonanceError::config(field, format!("must be >= 0 (got {value})")))
    }
}

fn require_below_nyquist(
    field: &'static str,
    value: f64,
    nyquist: f64,
) -> Result<(), ResonanceError> {
    require_positive(field, value)?;
    if value < nyquist {
        Ok(())
    } else {
        Err(ResonanceError::config(
            field,
            format!("must be below the Nyquist frequency {nyquist} Hz (got {value})"),
        ))
    }
}
