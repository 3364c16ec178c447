//! Relative Strength Index (RSI) indicator.

use super::smoothing::wilders_smooth;
use super::{Indicator, Series};
use crate::types::{BarTable, Column};

/// RSI (Relative Strength Index) indicator.
///
/// Compares Wilder-smoothed average gains to average losses of the close.
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
pub struct Rsi {
    length: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { length: 14 }
    }
}

impl Rsi {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Per-row gains and losses of the close. Row 0 is undefined.
    fn gains_and_losses(close: &[f64]) -> (Series, Series) {
        let mut gains = vec![None; close.len()];
        let mut losses = vec![None; close.len()];

        for i in 1..close.len() {
            let change = close[i] - close[i - 1];
            gains[i] = Some(change.max(0.0));
            losses[i] = Some((-change).max(0.0));
        }

        (gains, losses)
    }
}

impl Indicator for Rsi {
    type Output = Series;

    fn name(&self) -> &str {
        "RSI"
    }

    fn min_periods(&self) -> usize {
        self.length.saturating_add(1)
    }

    fn compute(&self, table: &BarTable) -> Series {
        let (gains, losses) = Self::gains_and_losses(table.close());
        let avg_gain = wilders_smooth(&gains, self.length);
        let avg_loss = wilders_smooth(&losses, self.length);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(gain, loss)| {
                let (gain, loss) = ((*gain)?, (*loss)?);
                let total = gain + loss;
                if total == 0.0 {
                    // Flat window: neither overbought nor oversold is defined.
                    return None;
                }
                Some(100.0 * gain / total)
            })
            .collect()
    }

    fn columns(&self, output: Series) -> Vec<Column> {
        vec![Column::float(format!("rsi_{}", self.length), output)]
    }
}
