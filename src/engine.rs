//! Single simulation run: drive -> chamber -> stone -> EM proxy -> metrics.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cascade::ResonatorCascade;
use crate::config::ResonanceConfig;
use crate::metrics::{dominant_frequency, rms};
use crate::proxy::em_proxy;
use crate::signal::{generate_drive, time_base, DriveParams};
use crate::ResonanceError;

/// Per-run statistics. Field names are the sweep artifact's result schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub drive_hz: f64,
    pub chamber_f0_hz: f64,
    pub stone_f0_hz: f64,
    pub em_rms: f64,
    pub vib_rms: f64,
    pub chamber_rms: f64,
    pub peak_em_hz: f64,
}

/// Time series produced by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTraces {
    pub t: Vec<f64>,
    pub drive: Vec<f64>,
    pub chamber: Vec<f64>,
    pub vib: Vec<f64>,
    pub em: Vec<f64>,
}

impl RunTraces {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub result: RunResult,
    pub traces: RunTraces,
}

/// Run the full pipeline for `config` with a fresh generator seeded by `seed`.
pub fn simulate(config: &ResonanceConfig, seed: u64) -> Result<RunOutput, ResonanceError> {
    config.validate()?;
    let cascade = ResonatorCascade::from_config(config)?;

    let n = config.sample_count();
    debug!(drive_hz = config.drive_hz, seed, samples = n, "simulating run");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let drive = generate_drive(
        n,
        &DriveParams {
            fs_hz: config.fs_hz,
            drive_hz: config.drive_hz,
            amplitude: config.drive_amp,
            noise_std: config.drive_noise,
            nonlinearity: config.nonlinearity,
        },
        &mut rng,
    );

    let stages = cascade.apply(&drive);
    let em = em_proxy(&stages.vib, config.fs_hz, config.piezo_k);

    let result = RunResult {
        drive_hz: config.drive_hz,
        chamber_f0_hz: config.chamber_f0_hz,
        stone_f0_hz: config.stone_f0_hz,
        em_rms: rms(&em),
        vib_rms: rms(&stages.vib),
        chamber_rms: rms(&stages.chamber),
        peak_em_hz: dominant_frequency(&em, config.fs_hz),
    };

    Ok(RunOutput {
        result,
        traces: RunTraces {
            t: time_base(n, config.fs_hz),
            drive,
            chamber: stages.chamber,
            vib: stages.vib,
            em,
        },
    })
}

/// Run the pipeline and keep only the summary statistics.
pub fn run_once(config: &ResonanceConfig, seed: u64) -> Result<RunResult, ResonanceError> {
    simulate(config, seed).map(|output| output.result)
}
