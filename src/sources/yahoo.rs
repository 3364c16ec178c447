//! Yahoo Finance chart API client.
//!
//! Fetches OHLCV history for stocks, ETFs and continuous futures over an
//! explicit date window. Uses the unofficial v8 chart endpoint.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::MarketDataProvider;
use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::types::{ColumnLabel, Interval, RawColumn, RawTable};

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    symbol: String,
    data_granularity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
    adjclose: Option<Vec<YahooAdjClose>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.to_uppercase().replace('.', "-")
}

/// Unix seconds at midnight UTC.
fn day_start(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Pad a series to the timestamp count; Yahoo drops trailing nulls on occasion.
fn aligned(values: Option<Vec<Option<f64>>>, len: usize) -> Vec<Option<f64>> {
    let mut values = values.unwrap_or_default();
    values.resize(len, None);
    values
}

/// Turn a chart response body into a raw table.
///
/// Series are labelled `(Field, Ticker)` the way a multi-symbol download
/// labels them; the normalizer flattens them.
fn parse_chart(body: &str, symbol: &str, ticker: &str) -> Result<RawTable> {
    let data: YahooChartResponse = serde_json::from_str(body)?;

    if let Some(error) = data.chart.error {
        if error.code == "Not Found" {
            return Err(AppError::NoData(format!(
                "No data for {} ({}): {}",
                symbol, ticker, error.description
            )));
        }
        return Err(AppError::ExternalApi(format!(
            "Yahoo API error: {} - {}",
            error.code, error.description
        )));
    }

    let no_data = || AppError::NoData(format!("No data for {} ({})", symbol, ticker));

    let result = data
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(no_data)?;

    let timestamps = result.timestamp.unwrap_or_default();
    if timestamps.is_empty() {
        return Err(no_data());
    }

    debug!(
        "Yahoo returned {} rows for {} (granularity {})",
        timestamps.len(),
        result.meta.symbol,
        result.meta.data_granularity.as_deref().unwrap_or("?")
    );

    let index = timestamps
        .iter()
        .map(|&ts| {
            DateTime::<Utc>::from_timestamp(ts, 0)
                .ok_or_else(|| AppError::ExternalApi(format!("Invalid timestamp {}", ts)))
        })
        .collect::<Result<Vec<_>>>()?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| AppError::ExternalApi("No quote data in response".to_string()))?;

    let len = index.len();
    let label = |field: &str| ColumnLabel::Multi(vec![field.to_string(), ticker.to_string()]);

    let mut columns = vec![
        RawColumn::new(label("Open"), aligned(quote.open, len)),
        RawColumn::new(label("High"), aligned(quote.high, len)),
        RawColumn::new(label("Low"), aligned(quote.low, len)),
        RawColumn::new(label("Close"), aligned(quote.close, len)),
    ];

    let adjclose = result
        .indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
        .and_then(|series| series.adjclose);
    if adjclose.is_some() {
        columns.push(RawColumn::new(label("Adj Close"), aligned(adjclose, len)));
    }

    columns.push(RawColumn::new(label("Volume"), aligned(quote.volume, len)));

    Ok(RawTable::new(index, columns))
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    symbol_aliases: HashMap<String, String>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            symbol_aliases: config.symbol_aliases.clone(),
        })
    }

    /// Provider ticker for a request symbol: alias first, else normalized.
    pub fn resolve_symbol(&self, symbol: &str) -> String {
        self.symbol_aliases
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_else(|| normalize_yahoo_symbol(symbol))
    }

    fn chart_url(
        &self,
        ticker: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}\
             &includePrePost=false&events=div%2Csplits",
            self.base_url,
            ticker,
            day_start(start),
            day_start(end),
            interval.as_str()
        )
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawTable> {
        let ticker = self.resolve_symbol(symbol);
        let url = self.chart_url(&ticker, interval, start, end);

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Yahoo answers unknown symbols with 404 and an error payload
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::ExternalApi(format!("Yahoo API error: {}", status)));
        }

        parse_chart(&body, symbol, &ticker)
    }
}
