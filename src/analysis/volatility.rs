//! Volatility estimation: true range, ATR, and the adaptive deviation threshold.
//!
//! The pivot detector needs a dimensionless "how far is a meaningful swing"
//! threshold. We derive it from recent volatility: the trailing average of
//! ATR values, scaled by a sensitivity multiplier and normalized by the
//! latest close.

use crate::OHLCV;

/// Deviation used when no ATR value is defined yet (short history) or the
/// reference price is zero.
pub const FALLBACK_DEVIATION: f64 = 0.05;

/// True range of the bar at `index`: `max(high - low, |high - prev_close|,
/// |low - prev_close|)`. Undefined at bar 0 (no previous close).
#[inline]
pub fn true_range<T: OHLCV>(bars: &[T], index: usize) -> Option<f64> {
    if index == 0 || index >= bars.len() {
        return None;
    }
    let prev_close = bars[index - 1].close();
    let bar = &bars[index];
    let hl = bar.high() - bar.low();
    let hc = (bar.high() - prev_close).abs();
    let lc = (bar.low() - prev_close).abs();
    Some(hl.max(hc).max(lc))
}

/// Average true range: simple moving average of true range over `period`.
///
/// The result is index-aligned with `bars`. Entries are `None` until
/// `period` true-range values are available, i.e. the first defined entry
/// is at index `period` (true range itself starts at index 1).
pub fn atr<T: OHLCV>(bars: &[T], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut out = vec![None; n];
    if period == 0 || n < 2 {
        return out;
    }

    let mut ranges = Vec::with_capacity(n - 1);
    let mut sum = 0.0;
    for i in 1..n {
        let Some(tr) = true_range(bars, i) else {
            continue;
        };
        ranges.push(tr);
        sum += tr;
        if ranges.len() > period {
            sum -= ranges[ranges.len() - 1 - period];
        }
        if ranges.len() >= period {
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

/// Computes the adaptive deviation threshold for the pivot detector.
///
/// `deviation = mean(trailing ATR values) * multiplier / last_close`,
/// falling back to [`FALLBACK_DEVIATION`] when the mean is undefined or the
/// reference price is zero, and never below `floor`.
pub fn adaptive_deviation<T: OHLCV>(
    bars: &[T],
    atr_period: usize,
    trailing_window: usize,
    multiplier: f64,
    floor: f64,
) -> f64 {
    let atr = atr(bars, atr_period);
    let start = atr.len().saturating_sub(trailing_window);
    let recent: Vec<f64> = atr[start..].iter().filter_map(|v| *v).collect();
    let reference = bars.last().map_or(0.0, |b| b.close());

    let deviation = if recent.is_empty() || reference == 0.0 {
        FALLBACK_DEVIATION
    } else {
        let mean = recent.iter().sum::<f64>() / recent.len() as f64;
        mean * multiplier / reference
    };

    deviation.max(floor)
}
