//! Auxiliary confirmation signals: EMA, RSI, and per-leg volume averages.
//!
//! All indicator series are index-aligned with the input bars. Entries are
//! `None` until the indicator has enough history to be defined; the pattern
//! gates treat an undefined value as "skip", never as a rejection.

use crate::OHLCV;

/// RSI value reported for a perfectly flat window.
pub const RSI_FLAT: f64 = 50.0;

/// Exponential moving average of the close with smoothing
/// `alpha = 2 / (period + 1)`, seeded with the SMA of the first `period`
/// closes. Defined from index `period - 1` onward.
pub fn ema<T: OHLCV>(bars: &[T], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = bars[..period].iter().map(|b| b.close()).sum::<f64>() / period as f64;
    out[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..n {
        let value = alpha.mul_add(bars[i].close() - prev, prev);
        out[i] = Some(value);
        prev = value;
    }
    out
}

/// Relative strength index with Wilder's smoothing (`alpha = 1 / period`),
/// seeded with the simple mean of the first `period` close-to-close changes.
/// Defined from index `period` onward.
pub fn rsi<T: OHLCV>(bars: &[T], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut out = vec![None; n];
    if period == 0 || n <= period {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let (gain, loss) = gain_and_loss(bars[i - 1].close(), bars[i].close());
        avg_gain += gain;
        avg_loss += loss;
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    let smoothing = period as f64 - 1.0;
    for i in period + 1..n {
        let (gain, loss) = gain_and_loss(bars[i - 1].close(), bars[i].close());
        avg_gain = avg_gain.mul_add(smoothing, gain) / period as f64;
        avg_loss = avg_loss.mul_add(smoothing, loss) / period as f64;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

/// Mean volume over the inclusive bar index range `start..=end`.
/// `None` when the range is empty or out of bounds.
pub fn mean_volume<T: OHLCV>(bars: &[T], start: usize, end: usize) -> Option<f64> {
    if start > end || end >= bars.len() {
        return None;
    }
    let slice = &bars[start..=end];
    Some(slice.iter().map(|b| b.volume()).sum::<f64>() / slice.len() as f64)
}

#[inline]
fn gain_and_loss(prev_close: f64, close: f64) -> (f64, f64) {
    let change = close - prev_close;
    (change.max(0.0), (-change).max(0.0))
}

#[inline]
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let sum = avg_gain + avg_loss;
    if sum == 0.0 {
        RSI_FLAT
    } else {
        100.0 * avg_gain / sum
    }
}
