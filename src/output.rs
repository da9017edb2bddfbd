use std::fs;
use std::io::{BufWriter, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;
use serde::{Deserialize, Serialize};
use tempfile::{Builder, NamedTempFile};
use tracing::info;

use crate::analysis::band::BestBand;
use crate::config::ResonanceConfig;
use crate::engine::{RunResult, RunTraces};
use crate::sweep::sweep;
use crate::ResonanceError;

pub const SWEEP_JSON_FILENAME: &str = "resonance_sweep.json";
pub const SWEEP_CSV_FILENAME: &str = "resonance_sweep.csv";
pub const BEST_BAND_FILENAME: &str = "best_band.txt";

/// The persisted sweep: base configuration plus ordered per-frequency results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepArtifact {
    pub config: ResonanceConfig,
    pub results: Vec<RunResult>,
}

#[derive(Debug, Clone)]
pub struct SweepOutput {
    pub output_dir: PathBuf,
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
    pub artifact: SweepArtifact,
}

pub fn create_timestamped_output_dir(output_root: &Path) -> Result<PathBuf, ResonanceError> {
    fs::create_dir_all(output_root)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = output_root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = output_root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

/// Run the sweep, then write the JSON artifact and the CSV table into
/// `output_dir`. Nothing is written unless every run succeeded. Both files are
/// staged before either is renamed into place, and the JSON artifact is
/// renamed last, so its presence means the table is complete too.
pub fn run_sweep_into_dir(
    config: &ResonanceConfig,
    drive_hz: &[f64],
    seed: u64,
    output_dir: &Path,
) -> Result<SweepOutput, ResonanceError> {
    let results = sweep(config, drive_hz, seed)?;
    let artifact = SweepArtifact {
        config: config.clone(),
        results,
    };

    let json_path = output_dir.join(SWEEP_JSON_FILENAME);
    let csv_path = output_dir.join(SWEEP_CSV_FILENAME);
    let staged_json = stage_file(&json_path, |file| write_json_body(file, &artifact))?;
    let staged_csv = stage_file(&csv_path, |file| write_results_body(file, &artifact.results))?;

    staged_csv.persist(&csv_path)?;
    staged_json.persist(&json_path)?;
    info!(
        path = %json_path.display(),
        results = artifact.results.len(),
        "wrote sweep artifact"
    );

    Ok(SweepOutput {
        output_dir: output_dir.to_path_buf(),
        json_path,
        csv_path,
        artifact,
    })
}

/// Write `output_dir/resonance_sweep.json` and return its path.
pub fn write_sweep_json(output_dir: &Path, artifact: &SweepArtifact) -> Result<PathBuf, ResonanceError> {
    let path = output_dir.join(SWEEP_JSON_FILENAME);
    write_atomically(&path, |file| write_json_body(file, artifact))?;

    info!(
        path = %path.display(),
        results = artifact.results.len(),
        "wrote sweep artifact"
    );
    Ok(path)
}

pub fn read_sweep_json(path: &Path) -> Result<SweepArtifact, ResonanceError> {
    let raw = fs::read_to_string(path)?;
    let artifact: SweepArtifact = serde_json::from_str(&raw)?;
    Ok(artifact)
}

/// Tabular export sorted ascending by `drive_hz`.
pub fn write_results_csv(path: &Path, results: &[RunResult]) -> Result<(), ResonanceError> {
    write_atomically(path, |file| write_results_body(file, results))
}

/// One row per sample. Every column must have as many samples as `t`.
pub fn write_trace_csv(path: &Path, traces: &RunTraces) -> Result<(), ResonanceError> {
    let n = traces.t.len();
    ensure_len("trace drive", n, traces.drive.len())?;
    ensure_len("trace chamber", n, traces.chamber.len())?;
    ensure_len("trace vib", n, traces.vib.len())?;
    ensure_len("trace em", n, traces.em.len())?;

    write_atomically(path, |file| {
        let mut writer = Writer::from_writer(file);
        writer.write_record(["t", "drive", "chamber", "vib", "em"])?;

        for idx in 0..n {
            writer.write_record([
                fmt_f64(traces.t[idx]),
                fmt_f64(traces.drive[idx]),
                fmt_f64(traces.chamber[idx]),
                fmt_f64(traces.vib[idx]),
                fmt_f64(traces.em[idx]),
            ])?;
        }

        writer.flush()?;
        Ok(())
    })
}

pub fn write_best_band(path: &Path, band: &BestBand) -> Result<(), ResonanceError> {
    let body = format!(
        "peak_drive_hz={}\npeak_{}={}\nband_lo_hz={}\nband_hi_hz={}\n",
        band.peak_drive_hz,
        band.metric.column(),
        band.peak_value,
        band.band_lo_hz,
        band.band_hi_hz,
    );
    write_atomically(path, |file| {
        file.write_all(body.as_bytes())?;
        Ok(())
    })
}

pub fn trace_filename(drive_hz: f64) -> String {
    format!("trace_{drive_hz}hz.csv")
}

fn write_json_body(file: &mut fs::File, artifact: &SweepArtifact) -> Result<(), ResonanceError> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, artifact)?;
    writer.flush()?;
    Ok(())
}

fn write_results_body(file: &mut fs::File, results: &[RunResult]) -> Result<(), ResonanceError> {
    let mut rows = results.to_vec();
    rows.sort_by(|a, b| a.drive_hz.total_cmp(&b.drive_hz));

    let mut writer = Writer::from_writer(file);
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn ensure_len(context: &'static str, expected: usize, actual: usize) -> Result<(), ResonanceError> {
    if expected == actual {
        return Ok(());
    }

    Err(ResonanceError::LengthMismatch {
        context,
        expected,
        got: actual,
    })
}

fn fmt_f64(value: f64) -> String {
    format!("{value:.10}")
}

fn write_atomically<F>(path: &Path, write: F) -> Result<(), ResonanceError>
where
    F: FnOnce(&mut fs::File) -> Result<(), ResonanceError>,
{
    stage_file(path, write)?.persist(path)?;
    Ok(())
}

// The temp file lives next to `path` so the final rename stays on one
// filesystem; it is removed on drop if anything fails before `persist`.
// On unix it is created with mode 0o666 so the umask decides the final
// permissions, as for any regularly created file.
fn stage_file<F>(path: &Path, write: F) -> Result<NamedTempFile, ResonanceError>
where
    F: FnOnce(&mut fs::File) -> Result<(), ResonanceError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut builder = Builder::new();
    #[cfg(unix)]
    builder.permissions(fs::Permissions::from_mode(0o666));

    let mut tmp = builder.tempfile_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}
