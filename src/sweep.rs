use rayon::prelude::*;
use tracing::info;

use crate::config::ResonanceConfig;
use crate::engine::{run_once, RunResult};
use crate::ResonanceError;

/// Upper bound on the number of drive frequencies a generated grid may hold.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Inclusive drive-frequency grid `fmin, fmin + fstep, ...` up to `fmax`.
pub fn frequency_grid(fmin: f64, fmax: f64, fstep: f64) -> Result<Vec<f64>, ResonanceError> {
    if !(fmin.is_finite() && fmax.is_finite() && fstep.is_finite()) {
        return Err(ResonanceError::InvalidSweep(
            "fmin, fmax and fstep must be finite".to_string(),
        ));
    }
    if fstep <= 0.0 {
        return Err(ResonanceError::InvalidSweep(format!(
            "fstep must be greater than zero (got {fstep})"
        )));
    }
    if fmax < fmin {
        return Err(ResonanceError::InvalidSweep(format!(
            "fmax ({fmax}) must be greater than or equal to fmin ({fmin})"
        )));
    }

    let upper = fmax + 1e-9;
    let count = ((upper - fmin) / fstep).ceil().max(1.0);
    if count > MAX_GRID_POINTS as f64 {
        return Err(ResonanceError::InvalidSweep(format!(
            "grid {fmin}..={fmax} step {fstep} exceeds {MAX_GRID_POINTS} points"
        )));
    }
    let count = count as usize;

    Ok((0..count)
        .map(|idx| fmin + idx as f64 * fstep)
        .filter(|&hz| hz < upper)
        .collect())
}

/// Seed of the `index`-th run of a sweep started from `base_seed`.
pub fn run_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add(index as u64)
}

/// Seed a standalone run at `hz` needs to reproduce the matching sweep row:
/// the run seed of the first grid point within 1e-9 Hz of `hz`, or
/// `base_seed` when `hz` is not on the grid.
pub fn seed_for_drive(drive_hz: &[f64], hz: f64, base_seed: u64) -> u64 {
    drive_hz
        .iter()
        .position(|&f| (f - hz).abs() <= 1e-9)
        .map_or(base_seed, |idx| run_seed(base_seed, idx))
}

/// Run one simulation per drive frequency.
///
/// The `i`-th frequency runs on a clone of `base` with only `drive_hz`
/// replaced, seeded with `base_seed + i`. Every clone is validated before any
/// run starts; the first invalid clone in list order aborts the sweep. Runs
/// execute in parallel and the returned results follow `drive_hz` order.
pub fn sweep(
    base: &ResonanceConfig,
    drive_hz: &[f64],
    base_seed: u64,
) -> Result<Vec<RunResult>, ResonanceError> {
    let runs: Vec<(ResonanceConfig, u64)> = drive_hz
        .iter()
        .enumerate()
        .map(|(idx, &hz)| (base.with_drive_hz(hz), run_seed(base_seed, idx)))
        .collect();

    for (config, _) in &runs {
        config.validate()?;
    }

    info!(
        runs = runs.len(),
        base_seed,
        samples_per_run = base.sample_count(),
        "starting drive-frequency sweep"
    );

    runs.par_iter()
        .map(|(config, seed)| run_once(config, *seed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config() -> ResonanceConfig {
        ResonanceConfig {
            seconds: 1.0,
            ..ResonanceConfig::default()
        }
    }

    #[test]
    fn grid_includes_upper_bound() {
        let grid = frequency_grid(1.0, 150.0, 1.0).unwrap();
        assert_eq!(grid.len(), 150);
        assert_eq!(grid[0], 1.0);
        assert_eq!(grid[149], 150.0);

        let grid = frequency_grid(1.0, 2.0, 0.25).unwrap();
        assert_eq!(grid, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
    }

    #[test]
    fn grid_with_equal_bounds_has_one_point() {
        assert_eq!(frequency_grid(5.0, 5.0, 1.0).unwrap(), vec![5.0]);
    }

    #[test]
    fn grid_rejects_bad_step_and_bounds() {
        assert!(frequency_grid(1.0, 10.0, 0.0).is_err());
        assert!(frequency_grid(1.0, 10.0, -1.0).is_err());
        assert!(frequency_grid(10.0, 1.0, 1.0).is_err());
        assert!(frequency_grid(1.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn grid_rejects_step_too_small_for_the_range() {
        let err = frequency_grid(1.0, 150.0, 1e-300).unwrap_err();
        assert!(matches!(err, ResonanceError::InvalidSweep(_)));
        assert!(frequency_grid(0.0, 1.0, 1.0 / MAX_GRID_POINTS as f64).is_err());
        assert!(frequency_grid(1.0, 2.0, 1e-5).is_ok());
    }

    #[test]
    fn standalone_run_reproduces_its_sweep_row() {
        let config = ResonanceConfig {
            drive_noise: 0.5,
            ..short_config()
        };
        let grid = frequency_grid(10.0, 30.0, 5.0).unwrap();
        let results = sweep(&config, &grid, 7).unwrap();

        let seed = seed_for_drive(&grid, 25.0, 7);
        assert_eq!(seed, 10);
        assert_eq!(run_once(&config.with_drive_hz(25.0), seed).unwrap(), results[3]);
        assert_eq!(seed_for_drive(&grid, 27.5, 7), 7);
    }

    #[test]
    fn sweep_preserves_input_order_and_seeding() {
        let config = short_config();
        let drives = [40.0, 5.0, 25.0, 12.5, 32.0];
        let results = sweep(&config, &drives, 100).unwrap();

        assert_eq!(results.len(), drives.len());
        for (idx, (result, &hz)) in results.iter().zip(&drives).enumerate() {
            assert_eq!(result.drive_hz, hz);
            let single = run_once(&config.with_drive_hz(hz), 100 + idx as u64).unwrap();
            assert_eq!(*result, single);
        }
    }

    #[test]
    fn empty_sweep_yields_no_results() {
        assert!(sweep(&short_config(), &[], 1).unwrap().is_empty());
    }

    #[test]
    fn invalid_drive_aborts_the_whole_sweep() {
        let err = sweep(&short_config(), &[10.0, 1500.0, 20.0], 1).unwrap_err();
        assert!(matches!(
            err,
            ResonanceError::InvalidConfig {
                field: "drive_hz",
                ..
            }
        ));
    }
}
