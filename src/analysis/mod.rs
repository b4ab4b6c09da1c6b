//! Analysis pipeline: volatility-adaptive threshold, ZigZag pivots,
//! confirmation signals, and measured-move projection.

pub mod measured_move;
pub mod signals;
pub mod volatility;
pub mod zigzag;

pub use measured_move::{find_moves, GateConfig};
pub use volatility::adaptive_deviation;
pub use zigzag::detect_pivots;
