//! Property-based tests for pivot detection and pattern invariants.

use mmscan::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
struct TestBar {
    t: i64,
    price: f64,
}

impl OHLCV for TestBar {
    fn timestamp(&self) -> i64 {
        self.t
    }

    fn open(&self) -> f64 {
        self.price
    }

    fn high(&self) -> f64 {
        self.price
    }

    fn low(&self) -> f64 {
        self.price
    }

    fn close(&self) -> f64 {
        self.price
    }

    fn volume(&self) -> f64 {
        1000.0
    }
}

/// Random-walk bars: cumulative steps from 100, kept strictly positive.
fn walk_bars(steps: &[f64]) -> Vec<TestBar> {
    let mut price = 100.0;
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            price = (price + step).max(1.0);
            TestBar {
                t: i as i64,
                price,
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn pivots_alternate_and_indices_ascend(
        steps in prop::collection::vec(-5.0f64..5.0, 2..200),
        deviation in 0.01f64..0.3,
        min_bars in 0usize..5,
    ) {
        let bars = walk_bars(&steps);
        let pivots = detect_pivots(&bars, deviation, min_bars);

        for pair in pivots.windows(2) {
            prop_assert_ne!(pair[0].kind, pair[1].kind);
            prop_assert!(pair[0].index < pair[1].index);
        }
        for pivot in &pivots {
            prop_assert!(pivot.index < bars.len());
            prop_assert_eq!(pivot.timestamp, bars[pivot.index].timestamp());
        }
    }

    #[test]
    fn analysis_invariants_hold_on_random_walks(
        steps in prop::collection::vec(-5.0f64..5.0, 30..150),
    ) {
        let bars = walk_bars(&steps);
        let analyzer = AnalyzerBuilder::new().min_bars(3).build().unwrap();
        let analysis = analyzer.analyze(&bars).unwrap();

        prop_assert!(analysis.deviation >= 0.01);
        prop_assert_eq!(analysis.reference_price, bars[bars.len() - 1].close());
        prop_assert!(analysis.moves.len() <= 5);

        for m in &analysis.moves {
            let impulse = (m.b.price - m.a.price).abs();
            match m.direction {
                Direction::Bullish => {
                    prop_assert!(m.c.price > m.a.price);
                    prop_assert!((m.target - (m.c.price + impulse)).abs() < 1e-9);
                }
                Direction::Bearish => {
                    prop_assert!(m.c.price < m.a.price);
                    prop_assert!((m.target - (m.c.price - impulse)).abs() < 1e-9);
                }
            }
            prop_assert!(m.retracement >= 0.0);
            prop_assert!(m.proximity_to_c >= 0.0);
            prop_assert!(m.proximity_to_d >= 0.0);
            prop_assert_eq!(m.reference_price, analysis.reference_price);
            // Corners arrive in time order.
            prop_assert!(m.a.timestamp < m.b.timestamp);
            prop_assert!(m.b.timestamp < m.c.timestamp);
        }
    }

    #[test]
    fn fibonacci_gate_bounds_every_retracement(
        steps in prop::collection::vec(-5.0f64..5.0, 30..150),
    ) {
        let bars = walk_bars(&steps);
        let analyzer = AnalyzerBuilder::new()
            .min_bars(3)
            .fibonacci_gate(true)
            .build()
            .unwrap();

        for m in &analyzer.analyze(&bars).unwrap().moves {
            prop_assert!((0.382..=0.786).contains(&m.retracement));
        }
    }

    #[test]
    fn gates_only_remove_moves(
        steps in prop::collection::vec(-5.0f64..5.0, 30..150),
    ) {
        let bars = walk_bars(&steps);
        let plain = AnalyzerBuilder::new().min_bars(3).build().unwrap();
        let gated = AnalyzerBuilder::new()
            .min_bars(3)
            .fibonacci_gate(true)
            .time_symmetry_gate(true)
            .momentum_gate(true)
            .build()
            .unwrap();

        let all = plain.analyze(&bars).unwrap().moves;
        for m in gated.analyze(&bars).unwrap().moves {
            prop_assert!(all.contains(&m));
        }
    }
}
