//! Average True Range (ATR) indicator.

use super::smoothing::{true_range, wilders_smooth};
use super::{Indicator, Series};
use crate::types::{BarTable, Column};

/// ATR (Average True Range) indicator.
///
/// Wilder-smoothed average of true ranges:
/// TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|)
pub struct Atr {
    length: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { length: 14 }
    }
}

impl Atr {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Indicator for Atr {
    type Output = Series;

    fn name(&self) -> &str {
        "ATR"
    }

    fn min_periods(&self) -> usize {
        self.length.saturating_add(1)
    }

    fn compute(&self, table: &BarTable) -> Series {
        let tr = true_range(table.high(), table.low(), table.close());
        wilders_smooth(&tr, self.length)
    }

    fn columns(&self, output: Series) -> Vec<Column> {
        vec![Column::float(format!("atr_{}", self.length), output)]
    }
}
