//! End-to-end checks of the pure pipeline over hand-built tables

use chaste_indicator::services::pipeline::finalize;
use chaste_indicator::services::{run_table, AnomalyConfig, IndicatorConfig};
use chaste_indicator::types::{Bar, CellValue, RawTable};
use chrono::{DateTime, Duration, Utc};

fn start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_153_600, 0).unwrap()
}

fn daily_bars(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Bar {
            time: start() + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        })
        .collect()
}

fn run(bars: &[Bar]) -> chaste_indicator::types::BarTable {
    run_table(
        &RawTable::from(bars),
        &IndicatorConfig::default(),
        &AnomalyConfig::default(),
    )
    .unwrap()
}

fn flags(table: &chaste_indicator::types::BarTable, name: &str) -> Vec<bool> {
    table.flag_column(name).unwrap().to_vec()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_constant_table() {
    let bars = daily_bars(&[100.0; 30], &[1000.0; 30]);
    let table = run(&bars);

    let returns = table.float_column("return").unwrap();
    assert_eq!(returns[0], None);
    assert!(returns[1..].iter().all(|r| *r == Some(0.0)));
    assert!(flags(&table, "is_spike").iter().all(|f| !f));
    assert!(flags(&table, "is_gap").iter().all(|f| !f));
    assert!(flags(&table, "is_volume_spike").iter().all(|f| !f));

    let sma = table.float_column("sma_20").unwrap();
    assert_eq!(sma[18], None);
    assert_eq!(sma[19], Some(100.0));
    assert_eq!(table.float_column("sma_50").unwrap()[29], None);
}

#[test]
fn test_price_spike() {
    let mut closes = vec![100.0; 30];
    for close in closes.iter_mut().skip(15) {
        *close = 150.0;
    }
    let table = run(&daily_bars(&closes, &[1000.0; 30]));

    let spikes = flags(&table, "is_spike");
    assert!(spikes[15]);
    assert!(!spikes[14]);
    assert!(!spikes[16]);
    assert_eq!(spikes.iter().filter(|f| **f).count(), 1);

    let returns = table.float_column("return").unwrap();
    assert!((returns[15].unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn test_missing_day_is_gap() {
    let mut bars = daily_bars(&[100.0; 31], &[1000.0; 31]);
    bars.remove(10);
    let table = run(&bars);

    let gaps = flags(&table, "is_gap");
    assert!(gaps[10]);
    assert_eq!(gaps.iter().filter(|f| **f).count(), 1);
}

#[test]
fn test_volume_spike() {
    let mut volumes = vec![1000.0; 30];
    volumes[10] = 10_000.0;
    let table = run(&daily_bars(&[100.0; 30], &volumes));

    let spikes = flags(&table, "is_volume_spike");
    assert!(spikes[10]);
    assert!(!spikes[9]);
    assert!(!spikes[11]);
}

// ============================================================================
// Table properties
// ============================================================================

#[test]
fn test_unsorted_input_is_sorted() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let bars = daily_bars(&closes, &[1000.0; 40]);
    let mut shuffled = bars.clone();
    shuffled.reverse();

    assert_eq!(run(&shuffled), run(&bars));
}

#[test]
fn test_row_count_and_base_columns_preserved() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).cos() * 5.0).collect();
    let bars = daily_bars(&closes, &[1000.0; 60]);
    let table = run(&bars);

    assert_eq!(table.len(), 60);
    assert_eq!(table.close(), closes.as_slice());
    assert_eq!(table.timestamps()[0], start());
}

#[test]
fn test_indicator_values_are_causal() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.5).sin() * 4.0).collect();
    let full = run(&daily_bars(&closes, &[1000.0; 60]));
    let prefix = run(&daily_bars(&closes[..40], &[1000.0; 40]));

    for name in ["sma_20", "rsi_14", "adx_14", "atr_14", "bbm_20_2.0_2.0", "kcbe_20_2.0", "obv"] {
        let full = full.float_column(name).unwrap();
        let prefix = prefix.float_column(name).unwrap();
        assert_eq!(&full[..40], prefix, "{} changed with later rows", name);
    }
}

#[test]
fn test_records_serialize_in_column_order() {
    let bars = daily_bars(&[100.0; 25], &[1000.0; 25]);
    let (records, meta) = finalize(&run(&bars));
    let json = serde_json::to_value(&records[0]).unwrap();
    let object = json.as_object().unwrap();

    assert_eq!(object.len(), meta.columns.len());
    assert_eq!(json["datetime"], "2024-01-02T00:00:00Z");
    assert!(json["sma_20"].is_null());
    assert!(json["return"].is_null());
    assert_eq!(json["is_spike"], false);
    assert_eq!(json["close"], 100.0);

    let text = serde_json::to_string(&records[0]).unwrap();
    let positions: Vec<usize> = meta
        .columns
        .iter()
        .map(|c| text.find(&format!("\"{}\":", c)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert_eq!(records[24].get("sma_20"), Some(CellValue::Float(Some(100.0))));
}
