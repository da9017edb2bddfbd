use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use ppn_resonance::analysis::band::{estimate_band, BandMetric};
use ppn_resonance::output::{
    trace_filename, write_best_band, write_trace_csv, BEST_BAND_FILENAME,
};
use ppn_resonance::{
    create_timestamped_output_dir, frequency_grid, run_sweep_into_dir, seed_for_drive, simulate,
    ResonanceConfig,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(author, version, about = "PPN resonance engine (synthetic coupled-resonator sweep)")]
struct Cli {
    /// Output directory; defaults to a timestamped directory under output-ppn-resonance/
    #[arg(long)]
    out: Option<PathBuf>,

    /// JSON configuration file; missing fields take the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sample rate in Hz
    #[arg(long)]
    fs: Option<f64>,

    /// Run duration in seconds
    #[arg(long)]
    seconds: Option<f64>,

    /// Lowest drive frequency in Hz
    #[arg(long, default_value_t = 1.0)]
    fmin: f64,

    /// Highest drive frequency in Hz (inclusive)
    #[arg(long, default_value_t = 150.0)]
    fmax: f64,

    /// Drive frequency step in Hz
    #[arg(long, default_value_t = 1.0)]
    fstep: f64,

    /// Chamber resonance center frequency in Hz
    #[arg(long, alias = "chamber_f0")]
    chamber_f0: Option<f64>,

    /// Chamber resonance quality factor
    #[arg(long, alias = "chamber_q")]
    chamber_q: Option<f64>,

    /// Stone resonance center frequency in Hz
    #[arg(long, alias = "stone_f0")]
    stone_f0: Option<f64>,

    /// Stone resonance quality factor
    #[arg(long, alias = "stone_q")]
    stone_q: Option<f64>,

    /// Piezo -> EM proxy coupling coefficient
    #[arg(long, alias = "piezo_k")]
    piezo_k: Option<f64>,

    /// Base seed; run i of the sweep uses seed + i
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Also export the time-series traces of one run at this drive frequency;
    /// on the sweep grid it reuses that row's seed
    #[arg(long, alias = "trace_hz")]
    trace_hz: Option<f64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = build_config(&cli)?;
    config.validate()?;

    let drive_hz = frequency_grid(cli.fmin, cli.fmax, cli.fstep)?;

    let output_dir = match &cli.out {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
            dir.clone()
        }
        None => create_timestamped_output_dir(Path::new("output-ppn-resonance"))?,
    };

    let output = run_sweep_into_dir(&config, &drive_hz, cli.seed, &output_dir)
        .context("resonance sweep failed")?;

    let band = estimate_band(&output.artifact.results, BandMetric::EmRms)?;
    write_best_band(&output_dir.join(BEST_BAND_FILENAME), &band)?;
    info!(
        peak_drive_hz = band.peak_drive_hz,
        band_lo_hz = band.band_lo_hz,
        band_hi_hz = band.band_hi_hz,
        "estimated em_rms band"
    );

    if let Some(hz) = cli.trace_hz {
        let seed = seed_for_drive(&drive_hz, hz, cli.seed);
        let run = simulate(&config.with_drive_hz(hz), seed)
            .with_context(|| format!("trace run at {hz} Hz failed"))?;
        let path = output_dir.join(trace_filename(hz));
        write_trace_csv(&path, &run.traces)?;
        println!("Trace: {}", path.display());
    }

    println!("Wrote: {}", output.json_path.display());
    println!("Table: {}", output.csv_path.display());
    println!(
        "Peak em_rms at {} Hz (band {}..{} Hz)",
        band.peak_drive_hz, band.band_lo_hz, band.band_hi_hz
    );

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<ResonanceConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => ResonanceConfig::default(),
    };

    if let Some(v) = cli.fs {
        config.fs_hz = v;
    }
    if let Some(v) = cli.seconds {
        config.seconds = v;
    }
    if let Some(v) = cli.chamber_f0 {
        config.chamber_f0_hz = v;
    }
    if let Some(v) = cli.chamber_q {
        config.chamber_q = v;
    }
    if let Some(v) = cli.stone_f0 {
        config.stone_f0_hz = v;
    }
    if let Some(v) = cli.stone_q {
        config.stone_q = v;
    }
    if let Some(v) = cli.piezo_k {
        config.piezo_k = v;
    }

    Ok(config)
}

fn load_config_file(path: &Path) -> anyhow::Result<ResonanceConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: ResonanceConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
