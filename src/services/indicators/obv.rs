//! On-Balance Volume (OBV) indicator.

use super::{Indicator, Series};
use crate::types::{BarTable, Column};

/// OBV (On-Balance Volume) indicator.
///
/// Cumulative volume signed by close direction:
/// - First bar: OBV = volume
/// - If close > previous close: OBV += volume
/// - If close < previous close: OBV -= volume
pub struct Obv;

impl Indicator for Obv {
    type Output = Series;

    fn name(&self) -> &str {
        "OBV"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn compute(&self, table: &BarTable) -> Series {
        let close = table.close();
        let volume = table.volume();

        let mut obv = 0.0;
        let mut values = Vec::with_capacity(close.len());

        for i in 0..close.len() {
            if i == 0 || close[i] > close[i - 1] {
                obv += volume[i];
            } else if close[i] < close[i - 1] {
                obv -= volume[i];
            }
            values.push(Some(obv));
        }

        values
    }

    fn columns(&self, output: Series) -> Vec<Column> {
        vec![Column::float("obv", output)]
    }
}
