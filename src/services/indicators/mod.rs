//! Technical indicator engine.
//!
//! Each indicator computes a typed output from a [`BarTable`] and knows the
//! column names it contributes. [`add_indicators`] runs the configured set and
//! returns an extended copy of the table.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod config;
pub mod keltner;
pub mod obv;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod smoothing;

pub use adx::{Adx, AdxOutput};
pub use atr::Atr;
pub use bollinger::{BollingerBands, BollingerOutput};
pub use config::IndicatorConfig;
pub use keltner::{KeltnerChannels, KeltnerOutput};
pub use obv::Obv;
pub use roc::Roc;
pub use rsi::Rsi;
pub use sma::Sma;

use tracing::debug;

use crate::types::{BarTable, Column};

/// One value per row; `None` where the indicator is undefined.
pub type Series = Vec<Option<f64>>;

/// Trait for implementing technical indicators.
pub trait Indicator {
    /// Typed result, one field per output series.
    type Output;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Rows needed before the first output value is defined.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator over the whole table.
    fn compute(&self, table: &BarTable) -> Self::Output;

    /// Name the output series.
    fn columns(&self, output: Self::Output) -> Vec<Column>;
}

/// Render a float parameter for a column name, always with a decimal point.
pub fn format_param(value: f64) -> String {
    format!("{:?}", value)
}

fn apply<I: Indicator>(table: &mut BarTable, indicator: &I) {
    if table.len() < indicator.min_periods() {
        debug!(
            "{} needs {} bars, table has {}; output stays null",
            indicator.name(),
            indicator.min_periods(),
            table.len()
        );
    }

    let output = indicator.compute(table);
    for column in indicator.columns(output) {
        table.push_column(column);
    }
}

/// Append every configured indicator column to a copy of `table`.
///
/// Input columns are left as they are. Rows without enough history hold
/// `None` rather than failing the computation.
pub fn add_indicators(table: &BarTable, config: &IndicatorConfig) -> BarTable {
    let mut out = table.clone();

    for &length in &config.sma_lengths {
        apply(&mut out, &Sma::new(length));
    }
    apply(&mut out, &Roc::new(config.roc_length));
    apply(&mut out, &Rsi::new(config.rsi_length));
    apply(
        &mut out,
        &Adx::new(config.adx_length, config.adx_signal_length(), config.adxr_length),
    );
    if config.obv_enabled {
        apply(&mut out, &Obv);
    }
    apply(&mut out, &Atr::new(config.atr_length));
    apply(&mut out, &BollingerBands::new(config.bb_length, config.bb_std));
    apply(
        &mut out,
        &KeltnerChannels::new(config.kc_length, config.kc_atr_length, config.kc_multiplier),
    );

    debug!(
        "Added {} indicator columns over {} bars",
        out.columns().len() - table.columns().len(),
        out.len()
    );

    out
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, Utc};

    use crate::types::{Bar, BarTable};

    pub fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_006_400, 0).unwrap()
    }

    pub fn table_from_closes(closes: &[f64]) -> BarTable {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                time: start() + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect();
        BarTable::from_bars(bars).unwrap()
    }

    pub fn uptrend_table(count: usize) -> BarTable {
        let bars = (0..count)
            .map(|i| {
                let base = 100.0 + i as f64 * 1.5;
                Bar {
                    time: start() + Duration::days(i as i64),
                    open: base,
                    high: base + 2.0,
                    low: base - 1.0,
                    close: base + 1.0,
                    volume: 1000.0 + i as f64 * 10.0,
                }
            })
            .collect();
        BarTable::from_bars(bars).unwrap()
    }

    pub fn downtrend_table(count: usize) -> BarTable {
        let bars = (0..count)
            .map(|i| {
                let base = 200.0 - i as f64 * 1.5;
                Bar {
                    time: start() + Duration::days(i as i64),
                    open: base,
                    high: base + 1.0,
                    low: base - 2.0,
                    close: base - 1.0,
                    volume: 1000.0,
                }
            })
            .collect();
        BarTable::from_bars(bars).unwrap()
    }

    pub fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }
}
