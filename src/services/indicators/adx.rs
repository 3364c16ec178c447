//! Average Directional Index (ADX) indicator.

use super::smoothing::wilders_smooth;
use super::{Atr, Indicator, Series};
use crate::types::{BarTable, Column};

/// ADX (Average Directional Index) indicator.
///
/// Measures trend strength, not direction. Emitted together with +DI and
/// -DI for direction and ADXR, the average of the current ADX and the ADX
/// `adxr_length` bars back.
pub struct Adx {
    length: usize,
    signal_length: usize,
    adxr_length: usize,
}

/// Output series of [`Adx`].
#[derive(Debug, Clone, PartialEq)]
pub struct AdxOutput {
    pub adx: Series,
    pub adxr: Series,
    /// +DI
    pub dmp: Series,
    /// -DI
    pub dmn: Series,
}

impl Default for Adx {
    fn default() -> Self {
        Self {
            length: 14,
            signal_length: 14,
            adxr_length: 2,
        }
    }
}

impl Adx {
    pub fn new(length: usize, signal_length: usize, adxr_length: usize) -> Self {
        Self {
            length,
            signal_length,
            adxr_length,
        }
    }

    /// Directional movement per row. Row 0 is undefined.
    fn directional_movement(high: &[f64], low: &[f64]) -> (Series, Series) {
        let mut plus_dm = vec![None; high.len()];
        let mut minus_dm = vec![None; high.len()];

        for i in 1..high.len() {
            let up_move = high[i] - high[i - 1];
            let down_move = low[i - 1] - low[i];

            plus_dm[i] = Some(if up_move > down_move && up_move > 0.0 {
                up_move
            } else {
                0.0
            });
            minus_dm[i] = Some(if down_move > up_move && down_move > 0.0 {
                down_move
            } else {
                0.0
            });
        }

        (plus_dm, minus_dm)
    }
}

impl Indicator for Adx {
    type Output = AdxOutput;

    fn name(&self) -> &str {
        "ADX"
    }

    fn min_periods(&self) -> usize {
        self.length.saturating_add(self.signal_length)
    }

    fn compute(&self, table: &BarTable) -> AdxOutput {
        let len = table.len();
        let (plus_dm, minus_dm) = Self::directional_movement(table.high(), table.low());

        let atr = Atr::new(self.length).compute(table);
        let smoothed_plus_dm = wilders_smooth(&plus_dm, self.length);
        let smoothed_minus_dm = wilders_smooth(&minus_dm, self.length);

        let mut dmp = vec![None; len];
        let mut dmn = vec![None; len];
        let mut dx = vec![None; len];

        for i in 0..len {
            let (Some(atr), Some(plus), Some(minus)) =
                (atr[i], smoothed_plus_dm[i], smoothed_minus_dm[i])
            else {
                continue;
            };
            if atr == 0.0 {
                continue;
            }

            let plus_di = plus / atr * 100.0;
            let minus_di = minus / atr * 100.0;
            dmp[i] = Some(plus_di);
            dmn[i] = Some(minus_di);

            let di_sum = plus_di + minus_di;
            dx[i] = Some(if di_sum > 0.0 {
                (plus_di - minus_di).abs() / di_sum * 100.0
            } else {
                0.0
            });
        }

        let adx = wilders_smooth(&dx, self.signal_length);
        let adxr = (0..len)
            .map(|i| {
                let lagged = i.checked_sub(self.adxr_length)?;
                Some((adx[i]? + adx[lagged]?) / 2.0)
            })
            .collect();

        AdxOutput { adx, adxr, dmp, dmn }
    }

    fn columns(&self, output: AdxOutput) -> Vec<Column> {
        vec![
            Column::float(format!("adx_{}", self.signal_length), output.adx),
            Column::float(
                format!("adxr_{}_{}", self.signal_length, self.adxr_length),
                output.adxr,
            ),
            Column::float(format!("dmp_{}", self.length), output.dmp),
            Column::float(format!("dmn_{}", self.length), output.dmn),
        ]
    }
}
