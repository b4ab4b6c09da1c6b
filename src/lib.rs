//! # mmscan - Measured-Move Pattern Scanner
//!
//! Detects A-B-C-D "measured move" chart patterns on OHLCV series using
//! volatility-adaptive ZigZag pivot detection, and projects the D price
//! target. The pivot threshold scales with recent ATR, so the same analyzer
//! works across quiet and volatile instruments without retuning.
//!
//! ## Quick Start
//!
//! ```rust
//! use mmscan::prelude::*;
//!
//! // Define your OHLCV data
//! struct Bar { t: i64, o: f64, h: f64, l: f64, c: f64, v: f64 }
//!
//! impl OHLCV for Bar {
//!     fn timestamp(&self) -> i64 { self.t }
//!     fn open(&self) -> f64 { self.o }
//!     fn high(&self) -> f64 { self.h }
//!     fn low(&self) -> f64 { self.l }
//!     fn close(&self) -> f64 { self.c }
//!     fn volume(&self) -> f64 { self.v }
//! }
//!
//! // Build an analyzer with the confirmation gates you want
//! let analyzer = AnalyzerBuilder::new()
//!     .min_bars(10)
//!     .fibonacci_gate(true)
//!     .build()
//!     .unwrap();
//!
//! // Analyze a series
//! let bars: Vec<Bar> = vec![
//!     Bar { t: 0, o: 100.0, h: 101.0, l: 99.0, c: 100.5, v: 1000.0 },
//! ];
//! let analysis = analyzer.analyze(&bars).unwrap();
//! assert!(analysis.moves.len() <= 5);
//! ```

pub mod analysis;
pub mod params;

pub mod prelude {
    pub use crate::{
        // Analysis pipeline
        analysis::{adaptive_deviation, detect_pivots, find_moves, GateConfig},
        // Errors
        AnalyzeError,
        // Types
        Analysis,
        AnchorPoint,
        Analyzer,
        AnalyzerBuilder,
        Direction,
        Fraction,
        MeasuredMove,
        // Parameters
        params::{get_fraction, get_period, ParamMeta, ParamType},
        Period,
        Pivot,
        PivotKind,
        Result,
        // Parallel
        scan_parallel,
        ScanError,
        ScanResult,
        // Helpers
        timestamp_index,
        OHLCVExt,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalyzeError>;

/// Errors that can occur during analysis
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No data to analyze")]
    DataNotFound,

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Fraction(f64);

impl Fraction {
    /// Create a new Fraction, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalyzeError::InvalidValue(
                "Fraction cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalyzeError::OutOfRange {
                field: "Fraction",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Fraction from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Fraction {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Fraction {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Fraction::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalyzeError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait. Timestamps are opaque i64 values (epoch seconds,
/// millis, bar ordinals) and only need to be strictly ascending.
pub trait OHLCV {
    fn timestamp(&self) -> i64;
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        if self.high() < self.low() {
            return Err(AnalyzeError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        if self.open().is_nan()
            || self.high().is_nan()
            || self.low().is_nan()
            || self.close().is_nan()
        {
            return Err(AnalyzeError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if self.open().is_infinite()
            || self.high().is_infinite()
            || self.low().is_infinite()
            || self.close().is_infinite()
        {
            return Err(AnalyzeError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Binary search for the bar with the given timestamp. Requires bars in
/// ascending timestamp order, which [`Analyzer::analyze`] can enforce via
/// data validation.
pub fn timestamp_index<T: OHLCV>(bars: &[T], timestamp: i64) -> Option<usize> {
    bars.binary_search_by_key(&timestamp, |b| b.timestamp()).ok()
}

// ============================================================
// CORE TYPES
// ============================================================

/// Direction of a measured move
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// Kind of a ZigZag pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PivotKind {
    High,
    Low,
}

/// A confirmed swing extreme - Copy, no allocations
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pivot {
    /// Position of the extreme bar in the analyzed series
    pub index: usize,
    /// Timestamp of the extreme bar
    pub timestamp: i64,
    /// The extreme price (high of a High pivot, low of a Low pivot)
    pub price: f64,
    pub kind: PivotKind,
}

/// One corner of a measured move, detached from bar indices so results
/// stay meaningful after the series is extended or trimmed.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnchorPoint {
    pub timestamp: i64,
    pub price: f64,
}

impl From<&Pivot> for AnchorPoint {
    fn from(p: &Pivot) -> Self {
        Self {
            timestamp: p.timestamp,
            price: p.price,
        }
    }
}

/// A detected A-B-C pattern with its projected D target
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeasuredMove {
    pub direction: Direction,
    /// Start of the impulse leg
    pub a: AnchorPoint,
    /// End of the impulse leg / start of the retracement
    pub b: AnchorPoint,
    /// End of the retracement leg
    pub c: AnchorPoint,
    /// Projected D price: C plus the impulse magnitude in the move direction
    pub target: f64,
    /// Retracement depth as a fraction of the impulse (0 when the impulse
    /// has zero magnitude)
    pub retracement: f64,
    /// Close of the last analyzed bar
    pub reference_price: f64,
    /// Relative distance from the reference price to C, always >= 0
    pub proximity_to_c: f64,
    /// Relative distance from the reference price to the target, always >= 0
    pub proximity_to_d: f64,
}

/// Full result of analyzing one series
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    /// Deviation threshold the pivot detector ran with
    pub deviation: f64,
    /// Close of the last bar
    pub reference_price: f64,
    pub pivots: Vec<Pivot>,
    pub moves: Vec<MeasuredMove>,
}

impl Analysis {
    /// Moves whose current price is within `max_proximity` of the target,
    /// e.g. `0.05` for "within 5% of D".
    pub fn moves_near_target(&self, max_proximity: f64) -> impl Iterator<Item = &MeasuredMove> {
        self.moves
            .iter()
            .filter(move |m| m.proximity_to_d <= max_proximity)
    }
}

// ============================================================
// ANALYZER
// ============================================================

use analysis::{measured_move, volatility, zigzag, GateConfig};

/// Measured-move analyzer: adaptive deviation, pivot detection, pattern
/// matching, and target projection over one OHLCV series.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Analyzer {
    atr_period: Period,
    atr_window: Period,
    atr_multiplier: f64,
    min_deviation: Fraction,
    min_bars: usize,
    gates: GateConfig,
    validate_data: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            atr_period: Period::new_const(14),
            atr_window: Period::new_const(30),
            atr_multiplier: 3.0,
            min_deviation: Fraction::new_const(0.01),
            min_bars: 10,
            gates: GateConfig::default(),
            validate_data: false,
        }
    }
}

impl Analyzer {
    /// Computes the volatility-adaptive deviation threshold for this series.
    pub fn deviation<T: OHLCV>(&self, bars: &[T]) -> f64 {
        let deviation = volatility::adaptive_deviation(
            bars,
            self.atr_period.get(),
            self.atr_window.get(),
            self.atr_multiplier,
            self.min_deviation.get(),
        );
        tracing::debug!(deviation, "adaptive deviation");
        deviation
    }

    /// Detects ZigZag pivots using the adaptive deviation threshold.
    pub fn pivots<T: OHLCV>(&self, bars: &[T]) -> Vec<Pivot> {
        zigzag::detect_pivots(bars, self.deviation(bars), self.min_bars)
    }

    /// Runs the full pipeline and returns a self-contained [`Analysis`].
    ///
    /// Analysis is pure: the analyzer holds no state between calls, so the
    /// same bars always produce the same result.
    pub fn analyze<T: OHLCV>(&self, bars: &[T]) -> Result<Analysis> {
        if bars.is_empty() {
            return Err(AnalyzeError::DataNotFound);
        }
        if self.validate_data {
            self.validate_bars(bars)?;
        }

        let deviation = self.deviation(bars);
        let pivots = zigzag::detect_pivots(bars, deviation, self.min_bars);
        let moves = measured_move::find_moves(bars, &pivots, self.gates);

        Ok(Analysis {
            deviation,
            reference_price: bars[bars.len() - 1].close(),
            pivots,
            moves,
        })
    }

    fn validate_bars<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                AnalyzeError::InvalidOHLCV { reason, .. } => {
                    AnalyzeError::InvalidOHLCV { index: i, reason }
                }
                other => other,
            })?;
            if i > 0 && bar.timestamp() <= bars[i - 1].timestamp() {
                return Err(AnalyzeError::InvalidOHLCV {
                    index: i,
                    reason: "non-ascending timestamp",
                });
            }
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating [`Analyzer`] instances
#[derive(Debug, Clone)]
pub struct AnalyzerBuilder {
    atr_period: usize,
    atr_window: usize,
    atr_multiplier: f64,
    min_deviation: f64,
    min_bars: usize,
    gates: GateConfig,
    validate_data: bool,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            atr_period: 14,
            atr_window: 30,
            atr_multiplier: 3.0,
            min_deviation: 0.01,
            min_bars: 10,
            gates: GateConfig::default(),
            validate_data: false,
        }
    }

    /// ATR lookback for the volatility estimate
    pub fn atr_period(mut self, period: usize) -> Self {
        self.atr_period = period;
        self
    }

    /// How many trailing ATR values are averaged into the deviation
    pub fn atr_window(mut self, window: usize) -> Self {
        self.atr_window = window;
        self
    }

    /// Sensitivity multiplier applied to the averaged ATR
    pub fn atr_multiplier(mut self, multiplier: f64) -> Self {
        self.atr_multiplier = multiplier;
        self
    }

    /// Floor for the deviation threshold, as a fraction of price
    pub fn min_deviation(mut self, deviation: f64) -> Self {
        self.min_deviation = deviation;
        self
    }

    /// Minimum bar distance between a swing extreme and its confirming reversal
    pub fn min_bars(mut self, bars: usize) -> Self {
        self.min_bars = bars;
        self
    }

    /// Require the retracement to land in the Fibonacci band
    pub fn fibonacci_gate(mut self, enable: bool) -> Self {
        self.gates.fibonacci = enable;
        self
    }

    /// Require C on the trend side of the long EMA
    pub fn trend_gate(mut self, enable: bool) -> Self {
        self.gates.trend = enable;
        self
    }

    /// Require stronger volume on the impulse leg
    pub fn volume_gate(mut self, enable: bool) -> Self {
        self.gates.volume = enable;
        self
    }

    /// Require the retracement leg to not drag on versus the impulse leg
    pub fn time_symmetry_gate(mut self, enable: bool) -> Self {
        self.gates.time_symmetry = enable;
        self
    }

    /// Require RSI at C to leave room in the move direction
    pub fn momentum_gate(mut self, enable: bool) -> Self {
        self.gates.momentum = enable;
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.validate_data = enable;
        self
    }

    /// Build the analyzer, validating every parameter
    pub fn build(self) -> Result<Analyzer> {
        if self.atr_multiplier.is_nan()
            || self.atr_multiplier.is_infinite()
            || self.atr_multiplier <= 0.0
        {
            return Err(AnalyzeError::InvalidValue(
                "atr_multiplier must be finite and > 0",
            ));
        }

        Ok(Analyzer {
            atr_period: Period::new(self.atr_period)?,
            atr_window: Period::new(self.atr_window)?,
            atr_multiplier: self.atr_multiplier,
            min_deviation: Fraction::new(self.min_deviation)?,
            min_bars: self.min_bars,
            gates: self.gates,
            validate_data: self.validate_data,
        })
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of analyzing a single instrument
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    pub analysis: Analysis,
}

/// Error from analyzing a single instrument
#[derive(Debug, Clone)]
pub struct ScanError {
    pub symbol: String,
    pub error: AnalyzeError,
}

/// Parallel analysis of multiple instruments. One failing instrument never
/// hides the results of the others.
pub fn scan_parallel<'a, T, I>(
    analyzer: &Analyzer,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            analyzer
                .analyze(bars)
                .map(|analysis| ScanResult {
                    symbol: symbol.to_string(),
                    analysis,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
pub(crate) mod test_util;
