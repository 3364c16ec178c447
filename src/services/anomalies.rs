//! Anomaly flags over a bar table.
//!
//! Works only from close, volume and the timestamp sequence; indicator
//! columns are never read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::indicators::config::{require_length, require_positive};
use super::indicators::smoothing::rolling_mean_min_periods;
use super::indicators::Series;
use crate::error::{AppError, Result};
use crate::types::{BarTable, Column};

/// Helper columns that exist for bookkeeping and are never serialized.
pub const INTERNAL_COLUMNS: [&str; 2] = ["prev_index", "delta_minutes"];

/// Anomaly thresholds. Any field left out of a request takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnomalyConfig {
    /// Absolute bar-to-bar return above which a bar is a spike (0.05 = 5%).
    pub spike_threshold: f64,
    /// A bar is a gap when its elapsed time exceeds this multiple of the median.
    pub gap_factor: f64,
    /// Trailing window for the volume mean, including the current bar.
    pub volume_window: usize,
    /// Bars required before the volume mean is defined.
    pub volume_min_periods: usize,
    /// Volume above this multiple of the trailing mean is a volume spike.
    pub volume_multiplier: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            spike_threshold: 0.05,
            gap_factor: 1.5,
            volume_window: 20,
            volume_min_periods: 5,
            volume_multiplier: 3.0,
        }
    }
}

impl AnomalyConfig {
    pub fn with_spike_threshold(mut self, threshold: f64) -> Self {
        self.spike_threshold = threshold;
        self
    }

    pub fn with_gap_factor(mut self, factor: f64) -> Self {
        self.gap_factor = factor;
        self
    }

    pub fn with_volume_window(mut self, window: usize, min_periods: usize) -> Self {
        self.volume_window = window;
        self.volume_min_periods = min_periods;
        self
    }

    pub fn with_volume_multiplier(mut self, multiplier: f64) -> Self {
        self.volume_multiplier = multiplier;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("spike_threshold", self.spike_threshold)?;
        require_positive("gap_factor", self.gap_factor)?;
        require_positive("volume_multiplier", self.volume_multiplier)?;
        require_length("volume_window", self.volume_window)?;
        require_length("volume_min_periods", self.volume_min_periods)?;
        if self.volume_min_periods > self.volume_window {
            return Err(AppError::InvalidConfig(format!(
                "volume_min_periods ({}) cannot exceed volume_window ({})",
                self.volume_min_periods, self.volume_window
            )));
        }
        Ok(())
    }
}

/// Typed anomaly output, one entry per row.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyFlags {
    pub returns: Series,
    pub is_spike: Vec<bool>,
    pub delta_minutes: Series,
    pub is_gap: Vec<bool>,
    pub volume_mean: Series,
    pub is_volume_spike: Vec<bool>,
}

/// Fractional close-to-close change. Row 0 and non-finite results are `None`.
pub fn pct_returns(close: &[f64]) -> Series {
    (0..close.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            Some(close[i] / close[i - 1] - 1.0).filter(|r| r.is_finite())
        })
        .collect()
}

/// Minutes elapsed since the previous row. Row 0 is `None`.
pub fn elapsed_minutes(timestamps: &[DateTime<Utc>]) -> Series {
    (0..timestamps.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let delta = timestamps[i] - timestamps[i - 1];
            Some(delta.num_milliseconds() as f64 / 60_000.0)
        })
        .collect()
}

/// Median of the defined values.
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Compute every anomaly series for `table`.
pub fn detect(table: &BarTable, config: &AnomalyConfig) -> AnomalyFlags {
    let returns = pct_returns(table.close());
    let is_spike = returns
        .iter()
        .map(|r| r.is_some_and(|r| r.abs() > config.spike_threshold))
        .collect();

    let delta_minutes = elapsed_minutes(table.timestamps());
    let gap_limit = median(&delta_minutes).map(|m| m * config.gap_factor);
    let is_gap = delta_minutes
        .iter()
        .map(|delta| match (delta, gap_limit) {
            (Some(delta), Some(limit)) => *delta > limit,
            _ => false,
        })
        .collect();

    let volume = table.volume();
    let volume_mean =
        rolling_mean_min_periods(volume, config.volume_window, config.volume_min_periods);
    let is_volume_spike = volume
        .iter()
        .zip(&volume_mean)
        .map(|(v, mean)| mean.is_some_and(|mean| *v > mean * config.volume_multiplier))
        .collect();

    AnomalyFlags {
        returns,
        is_spike,
        delta_minutes,
        is_gap,
        volume_mean,
        is_volume_spike,
    }
}

/// Append `return`, `is_spike`, `delta_minutes`, `is_gap` and
/// `is_volume_spike` to a copy of `table`.
pub fn add_anomalies(table: &BarTable, config: &AnomalyConfig) -> BarTable {
    let flags = detect(table, config);

    debug!(
        "Anomalies over {} bars: {} spikes, {} gaps, {} volume spikes",
        table.len(),
        flags.is_spike.iter().filter(|f| **f).count(),
        flags.is_gap.iter().filter(|f| **f).count(),
        flags.is_volume_spike.iter().filter(|f| **f).count()
    );

    let mut out = table.clone();
    out.push_column(Column::float("return", flags.returns));
    out.push_column(Column::flag("is_spike", flags.is_spike));
    out.push_column(Column::float("delta_minutes", flags.delta_minutes));
    out.push_column(Column::flag("is_gap", flags.is_gap));
    out.push_column(Column::flag("is_volume_spike", flags.is_volume_spike));
    out
}
