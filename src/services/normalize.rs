//! Column normalization.
//!
//! Providers label series differently: flat `Close`, or one tier per field
//! group and symbol such as `("Close", "ES=F")`. Everything downstream reads
//! the canonical lowercase names in [`BASE_COLUMNS`].

use tracing::debug;

use crate::types::{ColumnLabel, RawColumn, RawTable, BASE_COLUMNS};

/// Collapse a label to its canonical name.
///
/// Empty tiers are skipped and the first remaining tier is lowercased.
/// A label with no non-empty tier becomes the empty string.
pub fn normalize_label(label: &ColumnLabel) -> String {
    label
        .parts()
        .into_iter()
        .map(str::trim)
        .find(|part| !part.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Flatten labels and keep only the canonical OHLCV series.
///
/// When several series collapse to the same name the first one wins.
/// Applying this to an already normalized table returns an equal table.
pub fn normalize(raw: &RawTable) -> RawTable {
    let mut columns: Vec<RawColumn> = Vec::with_capacity(BASE_COLUMNS.len());

    for column in &raw.columns {
        let name = normalize_label(&column.label);

        if !BASE_COLUMNS.contains(&name.as_str()) {
            debug!("Dropping non-OHLCV column {:?}", column.label);
            continue;
        }

        if columns.iter().any(|c| c.label == ColumnLabel::Flat(name.clone())) {
            debug!("Dropping duplicate {} series from {:?}", name, column.label);
            continue;
        }

        columns.push(RawColumn {
            label: ColumnLabel::Flat(name),
            values: column.values.clone(),
        });
    }

    RawTable {
        index: raw.index.clone(),
        columns,
    }
}
