//! Shared bar fixtures for unit tests.

use crate::OHLCV;

#[derive(Debug, Clone)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OHLCV for Bar {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

pub fn bar(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        timestamp,
        open,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

/// `n` zero-range bars all at `price`.
pub fn flat_bars(n: usize, price: f64) -> Vec<Bar> {
    (0..n).map(|i| bar(i as i64, price, price, price, price)).collect()
}

/// Zero-range bars from consecutive price segments. Each `(start, count,
/// step)` segment contributes `count` bars at `start + k * step`; indices
/// and timestamps run consecutively across segments.
pub fn step_bars(segments: &[(f64, usize, f64)]) -> Vec<Bar> {
    let mut bars = Vec::new();
    for &(start, count, step) in segments {
        for k in 0..count {
            let price = start + k as f64 * step;
            let ts = bars.len() as i64;
            bars.push(bar(ts, price, price, price, price));
        }
    }
    bars
}

/// Zero-range bars at the given closes.
pub fn close_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i as i64, c, c, c, c))
        .collect()
}

/// Zero-range bars at the given `(close, volume)` pairs.
pub fn close_bars_with_volume(pairs: &[(f64, f64)]) -> Vec<Bar> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, &(c, v))| Bar {
            timestamp: i as i64,
            open: c,
            high: c,
            low: c,
            close: c,
            volume: v,
        })
        .collect()
}
