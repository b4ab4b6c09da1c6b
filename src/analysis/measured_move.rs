//! Measured-move pattern matching and target projection.
//!
//! Scans the most recent pivots for A-B-C triplets, runs the optional
//! confirmation gates, and projects the fourth point D as a price target.

use tracing::debug;

use crate::analysis::signals;
use crate::{AnchorPoint, Direction, MeasuredMove, Pivot, PivotKind, OHLCV};

/// Retracement acceptance band for the Fibonacci gate.
pub const FIB_MIN: f64 = 0.382;
/// Upper edge of the Fibonacci acceptance band.
pub const FIB_MAX: f64 = 0.786;
/// Long EMA used by the trend gate.
pub const TREND_EMA_PERIOD: usize = 200;
/// RSI lookback for the momentum gate.
pub const RSI_PERIOD: usize = 14;
/// Bullish setups are rejected when RSI at C is at or above this level.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// Bearish setups are rejected when RSI at C is at or below this level.
pub const RSI_OVERSOLD: f64 = 30.0;
/// The retracement leg may span at most this multiple of the impulse leg's bars.
pub const TIME_SYMMETRY_FACTOR: f64 = 2.0;
/// Only this many most-recent pivots are scanned for triplets.
pub const PIVOT_WINDOW: usize = 5;
/// At most this many moves are reported per run.
pub const MAX_MOVES: usize = 5;

/// Per-gate toggles for the confirmation filters. All gates default to off.
///
/// A gate whose auxiliary signal is undefined at C's bar (EMA or RSI still
/// warming up) is skipped, not failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GateConfig {
    /// Require the retracement ratio to lie in `[FIB_MIN, FIB_MAX]`.
    pub fibonacci: bool,
    /// Require C on the trend side of the EMA-200 of the close.
    pub trend: bool,
    /// Require higher mean volume on the impulse leg than the retracement leg.
    pub volume: bool,
    /// Require the retracement leg to take at most twice the impulse leg's bars.
    pub time_symmetry: bool,
    /// Require RSI-14 at C below overbought (bullish) / above oversold (bearish).
    pub momentum: bool,
}

impl GateConfig {
    fn any_enabled(&self) -> bool {
        self.fibonacci || self.trend || self.volume || self.time_symmetry || self.momentum
    }
}

/// Scans the pivot sequence for measured-move patterns and projects targets.
///
/// Only the last [`PIVOT_WINDOW`] pivots are considered. Fewer than 3 pivots
/// is not an error; it simply produces no moves. Moves are returned in
/// discovery order (ascending triplet start), capped at [`MAX_MOVES`].
pub fn find_moves<T: OHLCV>(bars: &[T], pivots: &[Pivot], gates: GateConfig) -> Vec<MeasuredMove> {
    let mut moves = Vec::new();
    if pivots.len() < 3 || bars.is_empty() {
        return moves;
    }

    // Signal series are only worth computing when their gate is on.
    let ema = gates.trend.then(|| signals::ema(bars, TREND_EMA_PERIOD));
    let rsi = gates.momentum.then(|| signals::rsi(bars, RSI_PERIOD));

    let reference = bars[bars.len() - 1].close();
    let start = pivots.len().saturating_sub(PIVOT_WINDOW);

    for i in start..pivots.len() - 2 {
        let (a, b, c) = (&pivots[i], &pivots[i + 1], &pivots[i + 2]);
        let Some(direction) = classify(a, b, c) else {
            continue;
        };

        let impulse = (b.price - a.price).abs();
        let retracement = if impulse == 0.0 {
            0.0
        } else {
            (b.price - c.price).abs() / impulse
        };

        if !passes_gates(bars, gates, direction, a, b, c, retracement, ema.as_deref(), rsi.as_deref()) {
            continue;
        }

        let target = match direction {
            Direction::Bullish => c.price + impulse,
            Direction::Bearish => c.price - impulse,
        };

        moves.push(MeasuredMove {
            direction,
            a: AnchorPoint::from(a),
            b: AnchorPoint::from(b),
            c: AnchorPoint::from(c),
            target,
            retracement,
            reference_price: reference,
            proximity_to_c: ((reference - c.price) / c.price).abs(),
            proximity_to_d: ((reference - target) / target).abs(),
        });
    }

    if moves.len() > MAX_MOVES {
        moves.drain(..moves.len() - MAX_MOVES);
    }
    if gates.any_enabled() {
        debug!(count = moves.len(), "measured-move scan with gates complete");
    }
    moves
}

/// A triplet qualifies only with the trend-continuation constraint: a
/// higher low for bullish setups, a lower high for bearish ones.
fn classify(a: &Pivot, b: &Pivot, c: &Pivot) -> Option<Direction> {
    match (a.kind, b.kind, c.kind) {
        (PivotKind::Low, PivotKind::High, PivotKind::Low) if c.price > a.price => {
            Some(Direction::Bullish)
        }
        (PivotKind::High, PivotKind::Low, PivotKind::High) if c.price < a.price => {
            Some(Direction::Bearish)
        }
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn passes_gates<T: OHLCV>(
    bars: &[T],
    gates: GateConfig,
    direction: Direction,
    a: &Pivot,
    b: &Pivot,
    c: &Pivot,
    retracement: f64,
    ema: Option<&[Option<f64>]>,
    rsi: Option<&[Option<f64>]>,
) -> bool {
    if gates.fibonacci && !(FIB_MIN..=FIB_MAX).contains(&retracement) {
        return false;
    }

    if let Some(value) = ema.and_then(|s| s[c.index]) {
        let on_trend_side = match direction {
            Direction::Bullish => c.price > value,
            Direction::Bearish => c.price < value,
        };
        if !on_trend_side {
            return false;
        }
    }

    if gates.volume {
        let impulse_leg = signals::mean_volume(bars, a.index, b.index);
        let retrace_leg = signals::mean_volume(bars, b.index, c.index);
        if let (Some(impulse_vol), Some(retrace_vol)) = (impulse_leg, retrace_leg) {
            if impulse_vol <= retrace_vol {
                return false;
            }
        }
    }

    if gates.time_symmetry {
        let impulse_bars = (b.index - a.index) as f64;
        let retrace_bars = (c.index - b.index) as f64;
        if retrace_bars > TIME_SYMMETRY_FACTOR * impulse_bars {
            return false;
        }
    }

    if let Some(value) = rsi.and_then(|s| s[c.index]) {
        let acceptable = match direction {
            Direction::Bullish => value < RSI_OVERBOUGHT,
            Direction::Bearish => value > RSI_OVERSOLD,
        };
        if !acceptable {
            return false;
        }
    }

    true
}
