//! Simple Moving Average (SMA) indicator.

use super::smoothing::rolling_mean;
use super::{Indicator, Series};
use crate::types::{BarTable, Column};

/// SMA (Simple Moving Average) indicator.
///
/// Arithmetic mean of the last `length` closes.
pub struct Sma {
    length: usize,
}

impl Sma {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn column_name(&self) -> String {
        format!("sma_{}", self.length)
    }
}

impl Indicator for Sma {
    type Output = Series;

    fn name(&self) -> &str {
        "SMA"
    }

    fn min_periods(&self) -> usize {
        self.length
    }

    fn compute(&self, table: &BarTable) -> Series {
        rolling_mean(table.close(), self.length)
    }

    fn columns(&self, output: Series) -> Vec<Column> {
        vec![Column::float(self.column_name(), output)]
    }
}
