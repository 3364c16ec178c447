//! Rate of Change (ROC) indicator.

use super::{Indicator, Series};
use crate::types::{BarTable, Column};

/// ROC (Rate of Change) indicator.
///
/// Percentage change of the close over `length` bars:
/// `100 * (close - close[n - length]) / close[n - length]`
pub struct Roc {
    length: usize,
}

impl Roc {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Indicator for Roc {
    type Output = Series;

    fn name(&self) -> &str {
        "ROC"
    }

    fn min_periods(&self) -> usize {
        self.length.saturating_add(1)
    }

    fn compute(&self, table: &BarTable) -> Series {
        let close = table.close();
        (0..close.len())
            .map(|i| {
                if i < self.length {
                    return None;
                }
                let base = close[i - self.length];
                if base == 0.0 {
                    return None;
                }
                Some(100.0 * (close[i] - base) / base)
            })
            .collect()
    }

    fn columns(&self, output: Series) -> Vec<Column> {
        vec![Column::float(format!("roc_{}", self.length), output)]
    }
}
