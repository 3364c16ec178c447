//! Columnar bar table shared by every pipeline stage.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, warn};

use super::bar::{Bar, RawTable};
use crate::error::{AppError, Result};

/// Canonical base series, in output order.
pub const BASE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Values of a derived column. `None` marks an undefined result.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Float(Vec<Option<f64>>),
    Flag(Vec<bool>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Float(values) => values.len(),
            ColumnValues::Flag(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, row: usize) -> CellValue {
        match self {
            ColumnValues::Float(values) => CellValue::Float(values[row].filter(|v| v.is_finite())),
            ColumnValues::Flag(values) => CellValue::Flag(values[row]),
        }
    }
}

/// A named derived series.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Float(values),
        }
    }

    pub fn flag(name: impl Into<String>, values: Vec<bool>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Flag(values),
        }
    }
}

/// One serialized cell. Undefined numbers become JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Float(Option<f64>),
    Flag(bool),
}

/// A row of the final table, serialized as a flat object in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRecord {
    pub datetime: DateTime<Utc>,
    pub fields: Vec<(String, CellValue)>,
}

impl BarRecord {
    pub fn get(&self, name: &str) -> Option<CellValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| *value)
    }
}

impl Serialize for BarRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("datetime", &self.datetime)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn base_series<'a>(raw: &'a RawTable, name: &str) -> Result<&'a [Option<f64>]> {
    let column = raw
        .column(name)
        .ok_or_else(|| AppError::MissingColumn(name.to_string()))?;
    if column.values.len() != raw.index.len() {
        return Err(AppError::Internal(format!(
            "column {} has {} values for {} timestamps",
            name,
            column.values.len(),
            raw.index.len()
        )));
    }
    Ok(&column.values)
}

/// Time-ordered OHLCV table with derived columns appended by the pipeline.
///
/// Timestamps are strictly increasing; every constructor enforces it.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTable {
    timestamps: Vec<DateTime<Utc>>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
    columns: Vec<Column>,
}

impl BarTable {
    /// Build a table from bars, sorting by time and rejecting duplicates.
    pub fn from_bars(mut bars: Vec<Bar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(AppError::NoData("bar table is empty".to_string()));
        }

        if bars.windows(2).any(|w| w[0].time > w[1].time) {
            warn!("Bars arrived out of order, sorting {} rows by timestamp", bars.len());
            bars.sort_by_key(|b| b.time);
        }

        if let Some(w) = bars.windows(2).find(|w| w[0].time == w[1].time) {
            return Err(AppError::DuplicateTimestamp(w[1].time));
        }

        let mut table = Self {
            timestamps: Vec::with_capacity(bars.len()),
            open: Vec::with_capacity(bars.len()),
            high: Vec::with_capacity(bars.len()),
            low: Vec::with_capacity(bars.len()),
            close: Vec::with_capacity(bars.len()),
            volume: Vec::with_capacity(bars.len()),
            columns: Vec::new(),
        };
        for bar in bars {
            table.timestamps.push(bar.time);
            table.open.push(bar.open);
            table.high.push(bar.high);
            table.low.push(bar.low);
            table.close.push(bar.close);
            table.volume.push(bar.volume);
        }
        Ok(table)
    }

    /// Build a table from a normalized raw table.
    ///
    /// Rows with any missing base value are dropped.
    pub fn from_raw(raw: &RawTable) -> Result<Self> {
        let open = base_series(raw, "open")?;
        let high = base_series(raw, "high")?;
        let low = base_series(raw, "low")?;
        let close = base_series(raw, "close")?;
        let volume = base_series(raw, "volume")?;

        let mut bars = Vec::with_capacity(raw.index.len());
        let mut dropped = 0usize;
        for (i, &time) in raw.index.iter().enumerate() {
            match (open[i], high[i], low[i], close[i], volume[i]) {
                (Some(open), Some(high), Some(low), Some(close), Some(volume)) => bars.push(Bar {
                    time,
                    open,
                    high,
                    low,
                    close,
                    volume,
                }),
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!("Dropped {} rows with missing OHLCV values", dropped);
        }

        Self::from_bars(bars)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    /// Derived columns in insertion order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn float_column(&self, name: &str) -> Option<&[Option<f64>]> {
        match &self.column(name)?.values {
            ColumnValues::Float(values) => Some(values),
            ColumnValues::Flag(_) => None,
        }
    }

    pub fn flag_column(&self, name: &str) -> Option<&[bool]> {
        match &self.column(name)?.values {
            ColumnValues::Flag(values) => Some(values),
            ColumnValues::Float(_) => None,
        }
    }

    /// All column names: base series first, then derived columns.
    pub fn column_names(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|name| name.to_string())
            .chain(self.columns.iter().map(|c| c.name.clone()))
            .collect()
    }

    /// Append a derived column, replacing any existing column of that name in place.
    ///
    /// Panics if the column length does not match the table.
    pub fn push_column(&mut self, column: Column) {
        assert_eq!(
            column.values.len(),
            self.len(),
            "column {} length does not match table",
            column.name
        );

        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Copy of the table without the named derived columns.
    pub fn without_columns(&self, names: &[&str]) -> Self {
        let mut table = self.clone();
        table.columns.retain(|c| !names.contains(&c.name.as_str()));
        table
    }

    /// Flatten into wire records.
    pub fn records(&self) -> Vec<BarRecord> {
        (0..self.len())
            .map(|row| {
                let base = [
                    self.open[row],
                    self.high[row],
                    self.low[row],
                    self.close[row],
                    self.volume[row],
                ];
                let mut fields: Vec<(String, CellValue)> = BASE_COLUMNS
                    .iter()
                    .zip(base)
                    .map(|(name, value)| {
                        (name.to_string(), CellValue::Float(Some(value).filter(|v| v.is_finite())))
                    })
                    .collect();
                fields.extend(self.columns.iter().map(|c| (c.name.clone(), c.values.cell(row))));

                BarRecord {
                    datetime: self.timestamps[row],
                    fields,
                }
            })
            .collect()
    }
}
