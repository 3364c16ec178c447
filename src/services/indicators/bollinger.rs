//! Bollinger Bands indicator.

use super::smoothing::{rolling_mean, rolling_std};
use super::{format_param, Indicator, Series};
use crate::types::{BarTable, Column};

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(length)
/// - Upper band: SMA + k * StdDev
/// - Lower band: SMA - k * StdDev
///
/// plus bandwidth `100 * (upper - lower) / middle` and %B
/// `(close - lower) / (upper - lower)`. StdDev is the population deviation.
pub struct BollingerBands {
    length: usize,
    std_dev_multiplier: f64,
}

/// Output series of [`BollingerBands`].
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerOutput {
    pub lower: Series,
    pub middle: Series,
    pub upper: Series,
    pub bandwidth: Series,
    pub percent_b: Series,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            length: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(length: usize, std_dev_multiplier: f64) -> Self {
        Self {
            length,
            std_dev_multiplier,
        }
    }

    /// Suffix shared by every band column. The multiplier appears once per
    /// band side, matching the names existing consumers read.
    fn suffix(&self) -> String {
        let k = format_param(self.std_dev_multiplier);
        format!("{}_{}_{}", self.length, k, k)
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerOutput;

    fn name(&self) -> &str {
        "Bollinger Bands"
    }

    fn min_periods(&self) -> usize {
        self.length
    }

    fn compute(&self, table: &BarTable) -> BollingerOutput {
        let close = table.close();
        let middle = rolling_mean(close, self.length);
        let std_dev = rolling_std(close, self.length);

        let len = close.len();
        let mut output = BollingerOutput {
            lower: vec![None; len],
            middle: middle.clone(),
            upper: vec![None; len],
            bandwidth: vec![None; len],
            percent_b: vec![None; len],
        };

        for i in 0..len {
            let (Some(mid), Some(sd)) = (middle[i], std_dev[i]) else {
                continue;
            };

            let upper = mid + self.std_dev_multiplier * sd;
            let lower = mid - self.std_dev_multiplier * sd;
            let band_width = upper - lower;

            output.upper[i] = Some(upper);
            output.lower[i] = Some(lower);
            output.bandwidth[i] = (mid != 0.0).then(|| 100.0 * band_width / mid);
            output.percent_b[i] = (band_width > 0.0).then(|| (close[i] - lower) / band_width);
        }

        output
    }

    fn columns(&self, output: BollingerOutput) -> Vec<Column> {
        let suffix = self.suffix();
        vec![
            Column::float(format!("bbl_{}", suffix), output.lower),
            Column::float(format!("bbm_{}", suffix), output.middle),
            Column::float(format!("bbu_{}", suffix), output.upper),
            Column::float(format!("bbb_{}", suffix), output.bandwidth),
            Column::float(format!("bbp_{}", suffix), output.percent_b),
        ]
    }
}
