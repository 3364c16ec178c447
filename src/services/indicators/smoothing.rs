//! Rolling-window and smoothing primitives shared by the indicators.
//!
//! Every function is causal: the value at row `i` depends only on rows `..=i`.
//! Undefined inputs and outputs are `None`.

/// Simple moving average over a full window; `None` until `period` rows exist.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_mean_min_periods(values, period, period)
}

/// Trailing mean over at most `window` rows, defined once `min_periods` rows are available.
pub fn rolling_mean_min_periods(
    values: &[f64],
    window: usize,
    min_periods: usize,
) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            if slice.len() < min_periods.max(1) {
                None
            } else {
                Some(slice.iter().sum::<f64>() / slice.len() as f64)
            }
        })
        .collect()
}

/// Population standard deviation over a full window.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
            Some(variance.sqrt())
        })
        .collect()
}

/// Exponential smoothing seeded with the mean of the first `period` defined values.
///
/// A gap in the input before the seed is complete restarts seeding. After
/// seeding, a `None` input yields `None` and leaves the state untouched.
fn seeded_smooth(values: &[Option<f64>], period: usize, alpha: f64) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let mut state: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;

    for (i, value) in values.iter().enumerate() {
        let Some(x) = *value else {
            if state.is_none() {
                seed_sum = 0.0;
                seed_count = 0;
            }
            continue;
        };

        match state {
            Some(prev) => {
                let next = prev + alpha * (x - prev);
                state = Some(next);
                out[i] = Some(next);
            }
            None => {
                seed_sum += x;
                seed_count += 1;
                if seed_count == period {
                    let seed = seed_sum / period as f64;
                    state = Some(seed);
                    out[i] = Some(seed);
                }
            }
        }
    }

    out
}

/// Wilder's smoothing (RMA), smoothing factor `1 / period`.
pub fn wilders_smooth(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    seeded_smooth(values, period, 1.0 / period.max(1) as f64)
}

/// Exponential moving average, smoothing factor `2 / (period + 1)`, SMA-seeded.
pub fn ema(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    seeded_smooth(values, period, 2.0 / (period as f64 + 1.0))
}

/// True range per row. Row 0 has no previous close and is undefined.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<Option<f64>> {
    (0..close.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let prev_close = close[i - 1];
            let hl = high[i] - low[i];
            let hc = (high[i] - prev_close).abs();
            let lc = (low[i] - prev_close).abs();
            Some(hl.max(hc).max(lc))
        })
        .collect()
}

/// Lift a dense series into the optional form the smoothers take.
pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_rolling_mean_leading_nulls() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_close(out[2], 2.0);
        assert_close(out[3], 3.0);
    }

    #[test]
    fn test_rolling_mean_zero_period_is_all_null() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_rolling_mean_min_periods_uses_partial_window() {
        let out = rolling_mean_min_periods(&[2.0, 4.0, 6.0, 8.0], 3, 2);
        assert_eq!(out[0], None);
        assert_close(out[1], 3.0);
        assert_close(out[2], 4.0);
        assert_close(out[3], 6.0);
    }

    #[test]
    fn test_rolling_std_is_population() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert_close(out[7], 2.0);
        assert!(out[6].is_none());
    }

    #[test]
    fn test_wilders_smooth_seeds_with_mean() {
        let values = [None, Some(1.0), Some(2.0), Some(3.0), Some(6.0)];
        let out = wilders_smooth(&values, 3);
        assert_eq!(&out[..3], &[None, None, None]);
        assert_close(out[3], 2.0);
        // (2 * 2 + 6) / 3
        assert_close(out[4], 10.0 / 3.0);
    }

    #[test]
    fn test_wilders_smooth_skips_nulls_after_seed() {
        let values = [Some(3.0), Some(3.0), None, Some(6.0)];
        let out = wilders_smooth(&values, 2);
        assert_close(out[1], 3.0);
        assert_eq!(out[2], None);
        assert_close(out[3], 4.5);
    }

    #[test]
    fn test_ema_matches_recursive_definition() {
        let values = defined(&[1.0, 2.0, 3.0, 4.0]);
        let out = ema(&values, 3);
        assert_close(out[2], 2.0);
        assert_close(out[3], 3.0);
    }

    #[test]
    fn test_true_range_uses_previous_close() {
        let high = [10.0, 12.0, 11.0];
        let low = [9.0, 11.5, 8.0];
        let close = [9.5, 11.8, 9.0];
        let out = true_range(&high, &low, &close);
        assert_eq!(out[0], None);
        assert_close(out[1], 2.5);
        assert_close(out[2], 3.8);
    }
}
