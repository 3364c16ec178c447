use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BarRecord, Interval};
use crate::error::{AppError, Result};
use crate::services::anomalies::AnomalyConfig;
use crate::services::indicators::IndicatorConfig;

/// Body of `POST /api/run_pipeline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineRequest {
    pub symbol: String,
    pub interval: Interval,
    /// Inclusive start date.
    pub start: NaiveDate,
    /// Exclusive end date.
    pub end: NaiveDate,
    #[serde(default)]
    pub indicator_config: Option<IndicatorConfig>,
    #[serde(default)]
    pub anomaly_config: Option<AnomalyConfig>,
}

impl PipelineRequest {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start,
            end,
            indicator_config: None,
            anomaly_config: None,
        }
    }

    pub fn with_indicator_config(mut self, config: IndicatorConfig) -> Self {
        self.indicator_config = Some(config);
        self
    }

    pub fn with_anomaly_config(mut self, config: AnomalyConfig) -> Self {
        self.anomaly_config = Some(config);
        self
    }

    /// Indicator parameters, defaults where none were sent.
    pub fn indicator_config(&self) -> IndicatorConfig {
        self.indicator_config.clone().unwrap_or_default()
    }

    /// Anomaly parameters, defaults where none were sent.
    pub fn anomaly_config(&self) -> AnomalyConfig {
        self.anomaly_config.clone().unwrap_or_default()
    }

    /// Check the request before any data is fetched.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(AppError::BadRequest("symbol must not be empty".to_string()));
        }
        if self.start >= self.end {
            return Err(AppError::BadRequest(format!(
                "start ({}) must be before end ({})",
                self.start, self.end
            )));
        }
        if let Some(config) = &self.indicator_config {
            config.validate()?;
        }
        if let Some(config) = &self.anomaly_config {
            config.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineMeta {
    pub row_count: usize,
    /// Column order of every record, `datetime` first.
    pub columns: Vec<String>,
}

/// Enriched bars for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResponse {
    pub symbol: String,
    pub interval: Interval,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub bars: Vec<BarRecord>,
    pub meta: PipelineMeta,
}
