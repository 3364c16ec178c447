//! Indicator parameters.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Longest window any indicator or anomaly rule accepts.
pub const MAX_LENGTH: usize = 100_000;

/// Parameters for every indicator the engine computes.
///
/// Any field left out of a request takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    pub sma_lengths: Vec<usize>,
    pub rsi_length: usize,
    pub roc_length: usize,
    pub adx_length: usize,
    /// ADX smoothing length; follows `adx_length` when unset.
    pub adx_signal_length: Option<usize>,
    /// Lag used for ADXR.
    pub adxr_length: usize,
    /// ADX level separating ranging from trending markets. Accepted and
    /// validated for clients that send it; no column depends on it.
    pub adx_threshold: f64,
    pub obv_enabled: bool,
    pub atr_length: usize,
    pub bb_length: usize,
    pub bb_std: f64,
    pub kc_length: usize,
    pub kc_atr_length: usize,
    pub kc_multiplier: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_lengths: vec![20, 50, 200],
            rsi_length: 14,
            roc_length: 10,
            adx_length: 14,
            adx_signal_length: None,
            adxr_length: 2,
            adx_threshold: 20.0,
            obv_enabled: true,
            atr_length: 14,
            bb_length: 20,
            bb_std: 2.0,
            kc_length: 20,
            kc_atr_length: 10,
            kc_multiplier: 2.0,
        }
    }
}

impl IndicatorConfig {
    pub fn adx_signal_length(&self) -> usize {
        self.adx_signal_length.unwrap_or(self.adx_length)
    }

    pub fn with_sma_lengths(mut self, lengths: impl Into<Vec<usize>>) -> Self {
        self.sma_lengths = lengths.into();
        self
    }

    pub fn with_rsi_length(mut self, length: usize) -> Self {
        self.rsi_length = length;
        self
    }

    pub fn with_roc_length(mut self, length: usize) -> Self {
        self.roc_length = length;
        self
    }

    pub fn with_adx(mut self, length: usize, signal_length: usize) -> Self {
        self.adx_length = length;
        self.adx_signal_length = Some(signal_length);
        self
    }

    pub fn with_adx_threshold(mut self, threshold: f64) -> Self {
        self.adx_threshold = threshold;
        self
    }

    pub fn with_obv(mut self, enabled: bool) -> Self {
        self.obv_enabled = enabled;
        self
    }

    pub fn with_atr_length(mut self, length: usize) -> Self {
        self.atr_length = length;
        self
    }

    pub fn with_bollinger(mut self, length: usize, std: f64) -> Self {
        self.bb_length = length;
        self.bb_std = std;
        self
    }

    pub fn with_keltner(mut self, length: usize, atr_length: usize, multiplier: f64) -> Self {
        self.kc_length = length;
        self.kc_atr_length = atr_length;
        self.kc_multiplier = multiplier;
        self
    }

    /// Reject lengths outside `1..=MAX_LENGTH`, non-positive or non-finite
    /// multipliers, and a negative or non-finite ADX threshold.
    pub fn validate(&self) -> Result<()> {
        for (i, length) in self.sma_lengths.iter().enumerate() {
            require_length(&format!("sma_lengths[{}]", i), *length)?;
        }
        require_length("rsi_length", self.rsi_length)?;
        require_length("roc_length", self.roc_length)?;
        require_length("adx_length", self.adx_length)?;
        require_length("adx_signal_length", self.adx_signal_length())?;
        require_length("adxr_length", self.adxr_length)?;
        if !self.adx_threshold.is_finite() || self.adx_threshold < 0.0 {
            return Err(AppError::InvalidConfig(format!(
                "adx_threshold must be a non-negative number, got {}",
                self.adx_threshold
            )));
        }
        require_length("atr_length", self.atr_length)?;
        require_length("bb_length", self.bb_length)?;
        require_length("kc_length", self.kc_length)?;
        require_length("kc_atr_length", self.kc_atr_length)?;
        require_positive("bb_std", self.bb_std)?;
        require_positive("kc_multiplier", self.kc_multiplier)?;
        Ok(())
    }
}

pub(crate) fn require_length(field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(AppError::InvalidConfig(format!("{} must be at least 1", field)));
    }
    if value > MAX_LENGTH {
        return Err(AppError::InvalidConfig(format!(
            "{} must be at most {}, got {}",
            field, MAX_LENGTH, value
        )));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::InvalidConfig(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }
    Ok(())
}
