//! Property-based tests for the validator's bound checks.
//!
//! Values are whole numbers held in f64 so that boundary comparisons are exact.

use igkit::{
    Bound, DealingRules, Direction, DistanceOrigin, Leg, OrderParams, Quote, ValidationError,
    validate_new_order, validate_order_update,
};
use proptest::prelude::*;

fn rules(min_size: f64, min_dist: f64, max_dist: f64, min_step: f64) -> DealingRules {
    DealingRules::builder()
        .market_order_preference("AVAILABLE_DEFAULT_ON")
        .trailing_stop_preference("AVAILABLE")
        .min_deal_size(min_size)
        .min_stop_or_limit_distance(min_dist)
        .max_stop_or_limit_distance(max_dist)
        .min_controlled_risk_stop_distance(min_dist)
        .min_step_distance(min_step)
        .build()
        .unwrap()
}

/// (min_dist, max_dist) with min <= max
fn window_strategy() -> impl Strategy<Value = (f64, f64)> {
    (1u32..=50, 0u32..=200).prop_map(|(min, span)| (min as f64, (min + span) as f64))
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Buy), Just(Direction::Sell)]
}

fn quote_strategy() -> impl Strategy<Value = Quote> {
    (1_000u32..=20_000, 0u32..=10).prop_map(|(bid, spread)| {
        Quote::new(bid as f64, (bid + spread) as f64)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // ========================================================================
    // SIZE
    // ========================================================================

    #[test]
    fn size_at_or_above_minimum_passes(min in 1u32..=100, extra in 0u32..=100) {
        let rules = rules(min as f64, 1.0, 100.0, 1.0);
        let order = OrderParams::new(Direction::Buy, (min + extra) as f64);
        prop_assert!(validate_order_update(&order, &rules, Quote::new(100.0, 100.0)).is_ok());
    }

    #[test]
    fn size_below_minimum_fails(min in 2u32..=100, short in 1u32..=100) {
        let size = min.saturating_sub(short).max(1) as f64;
        prop_assume!(size < min as f64);
        let rules = rules(min as f64, 1.0, 100.0, 1.0);
        let order = OrderParams::new(Direction::Buy, size);
        let is_size_error = matches!(
            validate_order_update(&order, &rules, Quote::new(100.0, 100.0)),
            Err(ValidationError::SizeOutOfRange { .. })
        );
        prop_assert!(is_size_error);
    }

    // ========================================================================
    // RAW DISTANCES
    // ========================================================================

    #[test]
    fn distance_inside_window_passes(
        (min, max) in window_strategy(),
        frac in 0.0f64..=1.0,
        direction in direction_strategy(),
    ) {
        let d = (min + (max - min) * frac).round().clamp(min, max);
        let rules = rules(1.0, min, max, 1.0);
        let order = OrderParams::new(direction, 1.0)
            .with_stop_distance(d)
            .with_limit_distance(d);
        prop_assert!(validate_new_order(&order, &rules, Quote::new(100.0, 100.0)).is_ok());
    }

    #[test]
    fn distance_one_below_minimum_fails((min, max) in window_strategy()) {
        let rules = rules(1.0, min, max, 1.0);
        let order = OrderParams::new(Direction::Buy, 1.0)
            .with_stop_distance(min - 1.0)
            .with_limit_distance(min);
        let err = validate_new_order(&order, &rules, Quote::new(100.0, 100.0)).unwrap_err();
        prop_assert_eq!(err, ValidationError::DistanceOutOfRange {
            leg: Leg::Stop,
            origin: DistanceOrigin::Distance,
            distance: min - 1.0,
            bound: Bound::Min,
            bound_value: min,
        });
    }

    #[test]
    fn distance_one_above_maximum_fails((min, max) in window_strategy()) {
        let rules = rules(1.0, min, max, 1.0);
        let order = OrderParams::new(Direction::Sell, 1.0)
            .with_stop_distance(min)
            .with_limit_distance(max + 1.0);
        let err = validate_new_order(&order, &rules, Quote::new(100.0, 100.0)).unwrap_err();
        prop_assert_eq!(err, ValidationError::DistanceOutOfRange {
            leg: Leg::Limit,
            origin: DistanceOrigin::Distance,
            distance: max + 1.0,
            bound: Bound::Max,
            bound_value: max,
        });
    }

    // ========================================================================
    // LEVEL TRANSLATION
    // ========================================================================

    /// A stop level placed `d` points on the losing side validates exactly like a raw distance `d`.
    #[test]
    fn stop_level_matches_equivalent_distance(
        (min, max) in window_strategy(),
        d in 0u32..=300,
        direction in direction_strategy(),
        quote in quote_strategy(),
    ) {
        let d = d as f64;
        let rules = rules(1.0, min, max, 1.0);
        let level = match direction {
            Direction::Buy => quote.bid - d,
            Direction::Sell => quote.offer + d,
        };
        let by_level = OrderParams::new(direction, 1.0).with_stop_level(level);
        let by_distance = OrderParams::new(direction, 1.0).with_stop_distance(d);

        let level_ok = validate_order_update(&by_level, &rules, quote).is_ok();
        let distance_ok = validate_order_update(&by_distance, &rules, quote).is_ok();
        prop_assert_eq!(level_ok, distance_ok);
        prop_assert_eq!(level_ok, d >= min && d <= max);
    }

    #[test]
    fn limit_level_matches_equivalent_distance(
        (min, max) in window_strategy(),
        d in 0u32..=300,
        direction in direction_strategy(),
        quote in quote_strategy(),
    ) {
        let d = d as f64;
        let rules = rules(1.0, min, max, 1.0);
        let level = match direction {
            Direction::Buy => quote.bid + d,
            Direction::Sell => quote.offer - d,
        };
        let order = OrderParams::new(direction, 1.0).with_limit_level(level);
        prop_assert_eq!(
            validate_order_update(&order, &rules, quote).is_ok(),
            d >= min && d <= max
        );
    }

    // ========================================================================
    // TRAILING STEP
    // ========================================================================

    #[test]
    fn increment_threshold_is_inclusive(step in 1u32..=20, inc in 0u32..=40) {
        let rules = rules(1.0, 1.0, 100.0, step as f64);
        let order = OrderParams::new(Direction::Buy, 1.0)
            .with_stop_distance(10.0)
            .with_stop_increment(inc as f64);
        let result = validate_order_update(&order, &rules, Quote::new(100.0, 100.0));
        if inc >= step {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(ValidationError::StepDistanceOutOfRange {
                increment: inc as f64,
                min: step as f64,
            }));
        }
    }

    // ========================================================================
    // CONFLICTS
    // ========================================================================

    /// Conflicts win regardless of how bad the other fields are.
    #[test]
    fn conflict_dominates(size in -10.0f64..10.0, level in -1e6f64..1e6, d in -1e6f64..1e6) {
        let rules = rules(1.0, 2.0, 50.0, 1.0);
        let order = OrderParams::new(Direction::Buy, size)
            .with_stop_level(level)
            .with_stop_distance(d);
        prop_assert_eq!(
            validate_new_order(&order, &rules, Quote::new(100.0, 100.0)),
            Err(ValidationError::ConflictingParameters { leg: Leg::Stop })
        );
    }
}
