//! Integration tests for the measured-move analysis pipeline.
//!
//! These tests validate the public API end to end: adaptive deviation,
//! pivot detection, pattern matching, gating, and parallel scanning.

use mmscan::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

impl OHLCV for TestBar {
    fn timestamp(&self) -> i64 {
        self.t
    }

    fn open(&self) -> f64 {
        self.o
    }

    fn high(&self) -> f64 {
        self.h
    }

    fn low(&self) -> f64 {
        self.l
    }

    fn close(&self) -> f64 {
        self.c
    }

    fn volume(&self) -> f64 {
        self.v
    }
}

/// Zero-range bars from consecutive `(start, count, step)` price segments.
fn step_bars(segments: &[(f64, usize, f64)]) -> Vec<TestBar> {
    let mut bars = Vec::new();
    for &(start, count, step) in segments {
        for k in 0..count {
            let price = start + k as f64 * step;
            bars.push(TestBar {
                t: bars.len() as i64,
                o: price,
                h: price,
                l: price,
                c: price,
                v: 1000.0,
            });
        }
    }
    bars
}

/// Rise 100 -> 150 over 10 bars, fall to 120 over 10 bars, hold at 120.
/// Produces pivots Low(100), High(150), Low(120): one bullish move with a
/// 0.6 retracement and a 170 target.
fn bullish_series() -> Vec<TestBar> {
    step_bars(&[(100.0, 11, 5.0), (147.0, 10, -3.0), (120.0, 20, 0.0)])
}

#[test]
fn bullish_measured_move_end_to_end() {
    let analyzer = AnalyzerBuilder::new().build().unwrap();
    let analysis = analyzer.analyze(&bullish_series()).unwrap();

    assert_eq!(analysis.reference_price, 120.0);
    assert_eq!(analysis.pivots.len(), 3);
    assert_eq!(analysis.pivots[0].kind, PivotKind::Low);
    assert_eq!(analysis.pivots[1].kind, PivotKind::High);
    assert_eq!(analysis.pivots[1].index, 10);
    assert_eq!(analysis.pivots[1].price, 150.0);

    assert_eq!(analysis.moves.len(), 1);
    let m = &analysis.moves[0];
    assert_eq!(m.direction, Direction::Bullish);
    assert_eq!(m.a.price, 100.0);
    assert_eq!(m.b.price, 150.0);
    assert_eq!(m.c.price, 120.0);
    assert_eq!(m.target, 170.0);
    assert!((m.retracement - 0.6).abs() < 1e-12);
    assert_eq!(m.proximity_to_c, 0.0);
    assert!((m.proximity_to_d - 50.0 / 170.0).abs() < 1e-12);
}

#[test]
fn bearish_measured_move_end_to_end() {
    // Mirror image: fall 150 -> 100, rise to 130, hold.
    let bars = step_bars(&[(150.0, 11, -5.0), (103.0, 10, 3.0), (130.0, 20, 0.0)]);
    let analysis = AnalyzerBuilder::new().build().unwrap().analyze(&bars).unwrap();

    assert_eq!(analysis.moves.len(), 1);
    let m = &analysis.moves[0];
    assert_eq!(m.direction, Direction::Bearish);
    assert_eq!(m.target, 80.0);
    assert!((m.retracement - 0.6).abs() < 1e-12);
}

#[test]
fn monotonic_series_has_no_moves() {
    let bars = step_bars(&[(100.0, 60, 1.0)]);
    let analysis = AnalyzerBuilder::new().build().unwrap().analyze(&bars).unwrap();

    // Seed low plus forced final high: not enough structure for a pattern.
    assert_eq!(analysis.pivots.len(), 2);
    assert!(analysis.moves.is_empty());
}

#[test]
fn fibonacci_gate_filters_shallow_retracement() {
    // Shallow pullback: 150 -> 140 is a 0.2 retracement of the 50 impulse.
    let bars = step_bars(&[(100.0, 11, 5.0), (149.0, 10, -1.0), (140.0, 20, 0.0)]);

    let plain = AnalyzerBuilder::new().build().unwrap();
    assert_eq!(plain.analyze(&bars).unwrap().moves.len(), 1);

    let gated = AnalyzerBuilder::new().fibonacci_gate(true).build().unwrap();
    assert!(gated.analyze(&bars).unwrap().moves.is_empty());
}

#[test]
fn fibonacci_gate_keeps_healthy_retracement() {
    let gated = AnalyzerBuilder::new().fibonacci_gate(true).build().unwrap();
    // 0.6 retracement sits inside the 0.382..=0.786 band.
    assert_eq!(gated.analyze(&bullish_series()).unwrap().moves.len(), 1);
}

#[test]
fn analysis_is_deterministic() {
    let bars = bullish_series();
    let analyzer = AnalyzerBuilder::new().momentum_gate(true).build().unwrap();
    assert_eq!(analyzer.analyze(&bars).unwrap(), analyzer.analyze(&bars).unwrap());
}

#[test]
fn at_most_five_moves_reported() {
    // Long alternating swing sequence produces many pivots.
    let mut segments = Vec::new();
    for i in 0..12 {
        let base = 100.0 + (i % 2) as f64 * 50.0;
        let step = if i % 2 == 0 { 5.0 } else { -4.0 };
        segments.push((base, 11, step));
    }
    let bars = step_bars(&segments);

    let analysis = AnalyzerBuilder::new()
        .min_bars(5)
        .build()
        .unwrap()
        .analyze(&bars)
        .unwrap();
    assert!(analysis.moves.len() <= 5);
}

#[test]
fn analysis_serializes_to_json() {
    let analysis = AnalyzerBuilder::new()
        .build()
        .unwrap()
        .analyze(&bullish_series())
        .unwrap();

    let json = serde_json::to_string(&analysis).unwrap();
    let back: Analysis = serde_json::from_str(&json).unwrap();
    assert_eq!(back, analysis);
}

#[test]
fn moves_near_target_filters_by_proximity() {
    let analysis = AnalyzerBuilder::new()
        .build()
        .unwrap()
        .analyze(&bullish_series())
        .unwrap();

    // Reference 120 is ~29% away from the 170 target.
    assert_eq!(analysis.moves_near_target(0.5).count(), 1);
    assert_eq!(analysis.moves_near_target(0.05).count(), 0);
}

#[test]
fn parallel_scan_splits_results_and_errors() {
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let good = bullish_series();
    let empty: Vec<TestBar> = vec![];
    let flat = step_bars(&[(100.0, 40, 0.0)]);

    let instruments: Vec<(&str, &[TestBar])> =
        vec![("UP", &good), ("EMPTY", &empty), ("FLAT", &flat)];
    let (results, errors) = scan_parallel(&analyzer, instruments);

    assert_eq!(results.len(), 2);
    assert!(results.iter().any(|r| r.symbol == "UP" && r.analysis.moves.len() == 1));
    assert!(results.iter().any(|r| r.symbol == "FLAT" && r.analysis.moves.is_empty()));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].symbol, "EMPTY");
    assert_eq!(errors[0].error, AnalyzeError::DataNotFound);
}

#[test]
fn pivot_timestamps_resolve_back_to_bars() {
    let bars = bullish_series();
    let analysis = AnalyzerBuilder::new().build().unwrap().analyze(&bars).unwrap();

    for pivot in &analysis.pivots {
        let index = timestamp_index(&bars, pivot.timestamp).unwrap();
        assert_eq!(index, pivot.index);
    }
}

#[test]
fn higher_multiplier_needs_bigger_swings() {
    // A 5% swing is visible at multiplier 3 but vanishes at a coarse
    // threshold (forced deviation via min_deviation floor).
    let bars = step_bars(&[(100.0, 11, 0.5), (104.5, 10, -0.3), (102.0, 20, 0.0)]);

    let fine = AnalyzerBuilder::new()
        .min_deviation(0.005)
        .atr_multiplier(1.0)
        .build()
        .unwrap();
    let coarse = AnalyzerBuilder::new().min_deviation(0.2).build().unwrap();

    assert!(fine.analyze(&bars).unwrap().pivots.len() >= 2);
    assert!(coarse.analyze(&bars).unwrap().pivots.is_empty());
}
