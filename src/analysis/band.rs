use crate::engine::RunResult;
use crate::ResonanceError;

/// Which per-run statistic the band is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandMetric {
    EmRms,
    VibRms,
    ChamberRms,
}

impl BandMetric {
    pub fn column(self) -> &'static str {
        match self {
            BandMetric::EmRms => "em_rms",
            BandMetric::VibRms => "vib_rms",
            BandMetric::ChamberRms => "chamber_rms",
        }
    }

    fn value(self, row: &RunResult) -> f64 {
        match self {
            BandMetric::EmRms => row.em_rms,
            BandMetric::VibRms => row.vib_rms,
            BandMetric::ChamberRms => row.chamber_rms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestBand {
    pub metric: BandMetric,
    pub peak_drive_hz: f64,
    pub peak_value: f64,
    pub band_lo_hz: f64,
    pub band_hi_hz: f64,
}

/// Peak of `metric` over the sweep and its half-power ("3 dB-ish") band.
///
/// Rows are ordered by `drive_hz` first. The threshold is `peak / sqrt(2)`;
/// each band edge is the nearest row on that side of the peak that falls below
/// it. Without a crossing the edge falls back to the lowest (resp. highest)
/// swept frequency.
pub fn estimate_band(rows: &[RunResult], metric: BandMetric) -> Result<BestBand, ResonanceError> {
    if rows.is_empty() {
        return Err(ResonanceError::InvalidSweep(
            "cannot estimate a band from an empty sweep".to_string(),
        ));
    }

    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.drive_hz.total_cmp(&b.drive_hz));

    let mut peak_idx = 0;
    for (idx, row) in sorted.iter().enumerate() {
        if metric.value(row) > metric.value(&sorted[peak_idx]) {
            peak_idx = idx;
        }
    }

    let peak = &sorted[peak_idx];
    let peak_value = metric.value(peak);
    let threshold = peak_value / std::f64::consts::SQRT_2;

    let band_lo_hz = sorted[..=peak_idx]
        .iter()
        .rev()
        .find(|row| metric.value(row) < threshold)
        .unwrap_or(&sorted[0])
        .drive_hz;
    let band_hi_hz = sorted[peak_idx..]
        .iter()
        .find(|row| metric.value(row) < threshold)
        .unwrap_or(&sorted[sorted.len() - 1])
        .drive_hz;

    Ok(BestBand {
        metric,
        peak_drive_hz: peak.drive_hz,
        peak_value,
        band_lo_hz,
        band_hi_hz,
    })
}
