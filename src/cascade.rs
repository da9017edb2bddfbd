use crate::config::ResonanceConfig;
use crate::filter::ResonantFilter;
use crate::ResonanceError;

/// Chamber stage feeding the stone stage.
#[derive(Debug, Clone, Copy)]
pub struct ResonatorCascade {
    pub chamber: ResonantFilter,
    pub stone: ResonantFilter,
}

/// Both stage outputs of one cascade pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutput {
    pub chamber: Vec<f64>,
    pub vib: Vec<f64>,
}

impl ResonatorCascade {
    pub fn from_config(config: &ResonanceConfig) -> Result<Self, ResonanceError> {
        Ok(Self {
            chamber: ResonantFilter::new(config.chamber(), config.fs_hz)?,
            stone: ResonantFilter::new(config.stone(), config.fs_hz)?,
        })
    }

    pub fn apply(&self, drive: &[f64]) -> CascadeOutput {
        let chamber = self.chamber.apply(drive);
        let vib = self.stone.apply(&chamber);
        CascadeOutput { chamber, vib }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stone_stage_consumes_chamber_output() {
        let config = ResonanceConfig::default();
        let cascade = ResonatorCascade::from_config(&config).unwrap();

        let mut impulse = vec![0.0; 256];
        impulse[0] = 1.0;
        let out = cascade.apply(&impulse);

        assert_eq!(out.chamber, cascade.chamber.apply(&impulse));
        assert_eq!(out.vib, cascade.stone.apply(&out.chamber));
        assert_eq!(out.vib.len(), 256);
    }

    #[test]
    fn invalid_stage_is_rejected() {
        let config = ResonanceConfig {
            stone_q: 0.0,
            ..ResonanceConfig::default()
        };
        assert!(ResonatorCascade::from_config(&config).is_err());
    }
}
