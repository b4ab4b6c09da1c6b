//! Parameter metadata for the analyzer
//!
//! This module provides metadata about analyzer parameters, enabling:
//! - Grid search optimization
//! - Parameter documentation
//! - Automatic configuration UI generation
//!
//! # Example
//!
//! ```rust
//! use mmscan::params::ANALYZER_PARAMS;
//!
//! for param in ANALYZER_PARAMS {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{AnalyzeError, AnalyzerBuilder, Fraction, Period, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Fractional value (0.0..=1.0 typically, but can exceed 1.0 for some params like atr_multiplier)
  Fraction,
  /// Period value (positive integer)
  Period,
}

/// Metadata for a single analyzer parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "atr_multiplier")
  pub name: &'static str,
  /// Parameter type (Fraction or Period)
  pub param_type: ParamType,
  /// Default value
  pub default: f64,
  /// Range for optimization: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  /// Create a new ParamMeta for a Fraction parameter
  pub const fn fraction(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Fraction, default, range, description }
  }

  /// Create a new ParamMeta for a Period parameter
  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(AnalyzeError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Fraction => {
        // Some fractional parameters exceed 1.0 (e.g., atr_multiplier),
        // so the 0-1 constraint is left to Fraction::new where it applies
        Ok(())
      },
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(AnalyzeError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// ANALYZER PARAMETERS
// ============================================================

/// All tunable analyzer parameters with their optimization ranges
pub const ANALYZER_PARAMS: &[ParamMeta] = &[
  ParamMeta::period(
    "atr_period",
    14.0,
    (7.0, 28.0, 7.0),
    "ATR lookback for the volatility estimate",
  ),
  ParamMeta::period(
    "atr_window",
    30.0,
    (10.0, 60.0, 10.0),
    "Trailing ATR values averaged into the deviation",
  ),
  ParamMeta::fraction(
    "atr_multiplier",
    3.0,
    (1.0, 10.0, 0.5),
    "Sensitivity multiplier applied to the averaged ATR",
  ),
  ParamMeta::fraction(
    "min_deviation",
    0.01,
    (0.005, 0.05, 0.005),
    "Floor for the deviation threshold, as a fraction of price",
  ),
  ParamMeta::period(
    "min_bars",
    10.0,
    (5.0, 50.0, 5.0),
    "Minimum bar distance between an extreme and its confirming reversal",
  ),
];

/// Look up the metadata for one analyzer parameter by name
pub fn param_meta(name: &str) -> Option<&'static ParamMeta> {
  ANALYZER_PARAMS.iter().find(|p| p.name == name)
}

impl AnalyzerBuilder {
  /// Applies parameter values from a map, e.g. one point of a grid search.
  ///
  /// Missing parameters keep their current values; unknown names are
  /// rejected so optimizer typos fail loudly.
  pub fn with_params(mut self, params: &HashMap<&str, f64>) -> Result<Self> {
    for (&name, &value) in params {
      let Some(meta) = param_meta(name) else {
        return Err(AnalyzeError::InvalidConfig(format!("unknown parameter: {name}")));
      };
      meta.validate(value)?;
      self = match name {
        "atr_period" => self.atr_period(value as usize),
        "atr_window" => self.atr_window(value as usize),
        "atr_multiplier" => self.atr_multiplier(value),
        "min_deviation" => self.min_deviation(value),
        "min_bars" => self.min_bars(value as usize),
        _ => unreachable!("parameter present in ANALYZER_PARAMS"),
      };
    }
    Ok(self)
  }
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Fraction from params with default fallback
pub fn get_fraction(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Fraction> {
  let value = params.get(key).copied().unwrap_or(default);
  Fraction::new(value)
}

/// Helper to get a Period from params with default fallback
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let value = params.get(key).copied().unwrap_or(default as f64);
  Period::new(value as usize)
}

// ============================================================
// TESTS
// ============================================================
