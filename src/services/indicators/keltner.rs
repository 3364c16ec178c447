//! Keltner Channels indicator.

use super::smoothing::{defined, ema};
use super::{format_param, Atr, Indicator, Series};
use crate::types::{BarTable, Column};

/// Keltner Channels indicator.
///
/// Basis is the EMA of the close; the channel extends `multiplier` ATRs
/// above and below it.
pub struct KeltnerChannels {
    length: usize,
    atr_length: usize,
    multiplier: f64,
}

/// Output series of [`KeltnerChannels`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeltnerOutput {
    pub lower: Series,
    pub basis: Series,
    pub upper: Series,
}

impl Default for KeltnerChannels {
    fn default() -> Self {
        Self {
            length: 20,
            atr_length: 10,
            multiplier: 2.0,
        }
    }
}

impl KeltnerChannels {
    pub fn new(length: usize, atr_length: usize, multiplier: f64) -> Self {
        Self {
            length,
            atr_length,
            multiplier,
        }
    }
}

impl Indicator for KeltnerChannels {
    type Output = KeltnerOutput;

    fn name(&self) -> &str {
        "Keltner Channels"
    }

    fn min_periods(&self) -> usize {
        self.length.max(self.atr_length.saturating_add(1))
    }

    fn compute(&self, table: &BarTable) -> KeltnerOutput {
        let basis = ema(&defined(table.close()), self.length);
        let atr = Atr::new(self.atr_length).compute(table);

        let (lower, upper): (Series, Series) = basis
            .iter()
            .zip(&atr)
            .map(|(mid, range)| match (mid, range) {
                (Some(mid), Some(range)) => (
                    Some(mid - self.multiplier * range),
                    Some(mid + self.multiplier * range),
                ),
                _ => (None, None),
            })
            .unzip();

        KeltnerOutput {
            lower,
            basis,
            upper,
        }
    }

    fn columns(&self, output: KeltnerOutput) -> Vec<Column> {
        let suffix = format!("{}_{}", self.length, format_param(self.multiplier));
        vec![
            Column::float(format!("kcle_{}", suffix), output.lower),
            Column::float(format!("kcbe_{}", suffix), output.basis),
            Column::float(format!("kcue_{}", suffix), output.upper),
        ]
    }
}
