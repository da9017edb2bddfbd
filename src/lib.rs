//! PPN resonance engine
//!
//! A synthetic coupled-resonator model: a noisy, optionally saturated drive
//! oscillation is passed through a chamber resonance and a stone vibration
//! resonance, and a piezo-style EM proxy is derived from the stone response.
//! Sweeping the drive frequency yields per-frequency RMS and spectral-peak
//! statistics for downstream analysis.

pub mod analysis;
pub mod cascade;
pub mod config;
pub mod engine;
pub mod filter;
pub mod metrics;
pub mod output;
pub mod proxy;
pub mod signal;
pub mod sweep;

use thiserror::Error;

pub use analysis::band::{estimate_band, BandMetric, BestBand};
pub use cascade::{CascadeOutput, ResonatorCascade};
pub use config::{ResonanceConfig, ResonatorSpec};
pub use engine::{run_once, simulate, RunOutput, RunResult, RunTraces};
pub use filter::ResonantFilter;
pub use output::{
    create_timestamped_output_dir, read_sweep_json, run_sweep_into_dir, SweepArtifact,
    SweepOutput,
};
pub use sweep::{frequency_grid, run_seed, seed_for_drive, sweep};

#[derive(Debug, Error)]
pub enum ResonanceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to persist output file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),
    #[error("length mismatch for {context}: expected {expected}, got {got}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
}

impl ResonanceError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
