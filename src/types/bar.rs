use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar interval accepted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    /// Wire representation, also used as the provider's interval parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Column label as delivered by a data provider.
///
/// Providers that answer for several symbols or field groups at once label
/// each series with one tier per grouping, e.g. `("Close", "ES=F")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnLabel {
    Flat(String),
    Multi(Vec<String>),
}

impl ColumnLabel {
    /// Label tiers in order. A flat label has a single tier.
    pub fn parts(&self) -> Vec<&str> {
        match self {
            ColumnLabel::Flat(name) => vec![name.as_str()],
            ColumnLabel::Multi(parts) => parts.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, ColumnLabel::Flat(_))
    }
}

impl From<&str> for ColumnLabel {
    fn from(name: &str) -> Self {
        ColumnLabel::Flat(name.to_string())
    }
}

/// A single provider series, row-aligned with [`RawTable::index`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub label: ColumnLabel,
    pub values: Vec<Option<f64>>,
}

impl RawColumn {
    pub fn new(label: impl Into<ColumnLabel>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// Unvalidated table straight from a data provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub index: Vec<DateTime<Utc>>,
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new(index: Vec<DateTime<Utc>>, columns: Vec<RawColumn>) -> Self {
        Self { index, columns }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Find a column by flat label.
    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns
            .iter()
            .find(|c| matches!(&c.label, ColumnLabel::Flat(label) if label == name))
    }
}

impl From<&[Bar]> for RawTable {
    fn from(bars: &[Bar]) -> Self {
        let series = |f: fn(&Bar) -> f64| bars.iter().map(|b| Some(f(b))).collect::<Vec<_>>();
        RawTable {
            index: bars.iter().map(|b| b.time).collect(),
            columns: vec![
                RawColumn::new("open", series(|b| b.open)),
                RawColumn::new("high", series(|b| b.high)),
                RawColumn::new("low", series(|b| b.low)),
                RawColumn::new("close", series(|b| b.close)),
                RawColumn::new("volume", series(|b| b.volume)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_display_matches_wire_name() {
        for interval in [
            Interval::OneMinute,
            Interval::FiveMinutes,
            Interval::FifteenMinutes,
            Interval::OneHour,
            Interval::OneDay,
        ] {
            let json = serde_json::to_string(&interval).unwrap();
            assert_eq!(json, format!("\"{}\"", interval));
            assert_eq!(interval.to_string(), interval.as_str());
        }
    }

    #[test]
    fn test_interval_serde_uses_short_names() {
        let json = serde_json::to_string(&Interval::FifteenMinutes).unwrap();
        assert_eq!(json, "\"15m\"");
        let parsed: Interval = serde_json::from_str("\"1d\"").unwrap();
        assert_eq!(parsed, Interval::OneDay);
        assert!(serde_json::from_str::<Interval>("\"2h\"").is_err());
    }

    #[test]
    fn test_column_label_parts() {
        let flat = ColumnLabel::from("close");
        assert_eq!(flat.parts(), vec!["close"]);
        assert!(flat.is_flat());

        let multi = ColumnLabel::Multi(vec!["Close".into(), "ES=F".into()]);
        assert_eq!(multi.parts(), vec!["Close", "ES=F"]);
        assert!(!multi.is_flat());
    }

    #[test]
    fn test_raw_table_from_bars() {
        let time = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let bars = [Bar {
            time,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        }];
        let raw = RawTable::from(&bars[..]);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.column("close").unwrap().values, vec![Some(1.5)]);
        assert_eq!(raw.column("volume").unwrap().values, vec![Some(10.0)]);
        assert!(raw.column("adj_close").is_none());
    }
}
