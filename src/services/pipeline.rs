//! Fetch, normalize, enrich and flatten bars for one request.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::anomalies::{add_anomalies, AnomalyConfig, INTERNAL_COLUMNS};
use super::indicators::{add_indicators, IndicatorConfig};
use super::normalize::normalize;
use crate::error::Result;
use crate::sources::MarketDataProvider;
use crate::types::{
    BarRecord, BarTable, PipelineMeta, PipelineRequest, PipelineResponse, RawTable,
};

/// Run the pure part of the pipeline over an already fetched table.
///
/// The result still carries the bookkeeping columns; [`finalize`] drops them.
pub fn run_table(
    raw: &RawTable,
    indicator_config: &IndicatorConfig,
    anomaly_config: &AnomalyConfig,
) -> Result<BarTable> {
    let normalized = normalize(raw);
    let table = BarTable::from_raw(&normalized)?;
    let table = add_indicators(&table, indicator_config);
    Ok(add_anomalies(&table, anomaly_config))
}

/// Strip internal columns and split the table into records plus metadata.
pub fn finalize(table: &BarTable) -> (Vec<BarRecord>, PipelineMeta) {
    let table = table.without_columns(&INTERNAL_COLUMNS);
    let columns = std::iter::once("datetime".to_string())
        .chain(table.column_names())
        .collect();
    let meta = PipelineMeta {
        row_count: table.len(),
        columns,
    };
    (table.records(), meta)
}

/// Pipeline entry point shared by the HTTP handlers.
///
/// Holds no per-request state; concurrent runs only share the provider.
pub struct PipelineService {
    provider: Arc<dyn MarketDataProvider>,
}

impl PipelineService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Arc<Self> {
        Arc::new(Self { provider })
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Validate the request, fetch its bars and return the enriched table.
    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineResponse> {
        request.validate()?;
        let started = Instant::now();

        let raw = self
            .provider
            .fetch(&request.symbol, request.interval, request.start, request.end)
            .await?;
        debug!(
            "{} returned {} rows for {} {}",
            self.provider.name(),
            raw.len(),
            request.symbol,
            request.interval
        );

        let table = run_table(&raw, &request.indicator_config(), &request.anomaly_config())?;
        let (bars, meta) = finalize(&table);

        info!(
            "Pipeline for {} {} ({} to {}): {} bars, {} columns in {:?}",
            request.symbol,
            request.interval,
            request.start,
            request.end,
            meta.row_count,
            meta.columns.len(),
            started.elapsed()
        );

        Ok(PipelineResponse {
            symbol: request.symbol.clone(),
            interval: request.interval,
            start: request.start,
            end: request.end,
            bars,
            meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::types::{Bar, CellValue, ColumnLabel, Interval, RawColumn};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate};

    fn bars(count: usize) -> Vec<Bar> {
        let start = DateTime::from_timestamp(1_704_153_600, 0).unwrap();
        (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin() * 3.0;
                Bar {
                    time: start + Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000.0,
                }
            })
            .collect()
    }

    struct FixedProvider(RawTable);

    #[async_trait]
    impl MarketDataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(
            &self,
            _: &str,
            _: Interval,
            _: NaiveDate,
            _: NaiveDate,
        ) -> Result<RawTable> {
            if self.0.is_empty() {
                return Err(AppError::NoData("No data for TEST (TEST)".to_string()));
            }
            Ok(self.0.clone())
        }
    }

    fn run_defaults(raw: &RawTable) -> Result<BarTable> {
        run_table(raw, &IndicatorConfig::default(), &AnomalyConfig::default())
    }

    fn request() -> PipelineRequest {
        PipelineRequest::new(
            "TEST",
            Interval::OneDay,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_run_table_drops_nothing_it_should_keep() {
        let raw = RawTable::from(bars(30).as_slice());
        let table = run_defaults(&raw).unwrap();
        assert_eq!(table.len(), 30);
        assert!(table.column("delta_minutes").is_some());
        assert!(table.column("is_volume_spike").is_some());
    }

    #[test]
    fn test_run_table_flattens_multi_labels() {
        let flat = RawTable::from(bars(10).as_slice());
        let mut raw = flat.clone();
        for column in &mut raw.columns {
            let mut field = column.label.parts()[0].to_string();
            field[..1].make_ascii_uppercase();
            column.label = ColumnLabel::Multi(vec![field, "ES=F".to_string()]);
        }

        let config = IndicatorConfig::default();
        let anomalies = AnomalyConfig::default();
        assert_eq!(
            run_table(&raw, &config, &anomalies).unwrap(),
            run_table(&flat, &config, &anomalies).unwrap()
        );
    }

    #[test]
    fn test_run_table_missing_volume() {
        let mut raw = RawTable::from(bars(10).as_slice());
        raw.columns.retain(|c| c.label != ColumnLabel::from("volume"));
        raw.columns.push(RawColumn::new("vol", vec![Some(1.0); 10]));
        let err = run_defaults(&raw).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn(ref c) if c == "volume"));
    }

    #[test]
    fn test_finalize_strips_internal_columns() {
        let raw = RawTable::from(bars(30).as_slice());
        let table = run_defaults(&raw).unwrap();
        let (records, meta) = finalize(&table);

        assert_eq!(meta.row_count, 30);
        assert_eq!(records.len(), 30);
        assert_eq!(meta.columns[0], "datetime");
        assert_eq!(meta.columns[1..6], ["open", "high", "low", "close", "volume"]);
        assert!(!meta.columns.iter().any(|c| c == "delta_minutes" || c == "prev_index"));
        assert_eq!(meta.columns.last().map(String::as_str), Some("is_volume_spike"));
        assert!(records[0].get("delta_minutes").is_none());
        assert_eq!(records[0].get("is_gap"), Some(CellValue::Flag(false)));
        assert_eq!(records[0].get("return"), Some(CellValue::Float(None)));
    }

    #[tokio::test]
    async fn test_service_run() {
        let provider = FixedProvider(RawTable::from(bars(40).as_slice()));
        let service = PipelineService::new(Arc::new(provider));
        assert_eq!(service.provider_name(), "fixed");

        let response = service.run(&request()).await.unwrap();
        assert_eq!(response.symbol, "TEST");
        assert_eq!(response.bars.len(), 40);
        assert_eq!(response.meta.row_count, 40);
        assert_eq!(response.meta.columns.len(), response.bars[0].fields.len() + 1);
    }

    #[tokio::test]
    async fn test_service_run_no_data() {
        let service = PipelineService::new(Arc::new(FixedProvider(RawTable::default())));
        let err = service.run(&request()).await.unwrap_err();
        assert!(matches!(err, AppError::NoData(_)));
    }

    #[tokio::test]
    async fn test_service_rejects_invalid_request_before_fetch() {
        let service = PipelineService::new(Arc::new(FixedProvider(RawTable::default())));
        let request =
            request().with_indicator_config(IndicatorConfig::default().with_rsi_length(0));
        let err = service.run(&request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }
}
