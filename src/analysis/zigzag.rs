//! Adaptive causal ZigZag pivot detection.
//!
//! A forward-only state machine over the bar series: decisions at bar `i`
//! depend only on bars `<= i`. This is what keeps the pattern scan free of
//! lookahead bias, so any rework of this loop must stay strictly causal.

use crate::{Pivot, PivotKind, OHLCV};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Flat,
    Up,
    Down,
}

/// Detects ZigZag pivots with the given fractional `deviation` threshold.
///
/// `min_bars` is the minimum bar distance between a running extreme and the
/// bar confirming its reversal. While the distance requirement blocks a
/// reversal, the running extreme is deliberately left untouched and the same
/// comparison is retried on later bars; the confirmed pivot stays anchored
/// at the original extreme.
///
/// The returned sequence alternates strictly between highs and lows by
/// construction. The extreme still open at the end of the series is emitted
/// as a final pivot even though no reversal confirmed it.
pub fn detect_pivots<T: OHLCV>(bars: &[T], deviation: f64, min_bars: usize) -> Vec<Pivot> {
    let mut pivots = Vec::new();
    if bars.is_empty() {
        return pivots;
    }

    let mut trend = Trend::Flat;
    let mut high = bars[0].high();
    let mut high_idx = 0usize;
    let mut low = bars[0].low();
    let mut low_idx = 0usize;

    for (i, bar) in bars.iter().enumerate().skip(1) {
        let cur_high = bar.high();
        let cur_low = bar.low();

        match trend {
            Trend::Flat => {
                if cur_high > low * (1.0 + deviation) {
                    trend = Trend::Up;
                    pivots.push(pivot_at(bars, low_idx, low, PivotKind::Low));
                    high = cur_high;
                    high_idx = i;
                } else if cur_low < high * (1.0 - deviation) {
                    trend = Trend::Down;
                    pivots.push(pivot_at(bars, high_idx, high, PivotKind::High));
                    low = cur_low;
                    low_idx = i;
                } else {
                    if cur_high > high {
                        high = cur_high;
                        high_idx = i;
                    }
                    if cur_low < low {
                        low = cur_low;
                        low_idx = i;
                    }
                }
            }
            Trend::Up => {
                if cur_high > high {
                    high = cur_high;
                    high_idx = i;
                } else if cur_low < high * (1.0 - deviation) && i - high_idx >= min_bars {
                    trend = Trend::Down;
                    pivots.push(pivot_at(bars, high_idx, high, PivotKind::High));
                    low = cur_low;
                    low_idx = i;
                }
            }
            Trend::Down => {
                if cur_low < low {
                    low = cur_low;
                    low_idx = i;
                } else if cur_high > low * (1.0 + deviation) && i - low_idx >= min_bars {
                    trend = Trend::Up;
                    pivots.push(pivot_at(bars, low_idx, low, PivotKind::Low));
                    high = cur_high;
                    high_idx = i;
                }
            }
        }
    }

    // The open extreme closes the sequence. A series that never confirmed a
    // trend produces no pivots at all.
    match trend {
        Trend::Up => pivots.push(pivot_at(bars, high_idx, high, PivotKind::High)),
        Trend::Down => pivots.push(pivot_at(bars, low_idx, low, PivotKind::Low)),
        Trend::Flat => {}
    }

    pivots
}

#[inline]
fn pivot_at<T: OHLCV>(bars: &[T], index: usize, price: f64, kind: PivotKind) -> Pivot {
    Pivot {
        index,
        timestamp: bars[index].timestamp(),
        price,
        kind,
    }
}
