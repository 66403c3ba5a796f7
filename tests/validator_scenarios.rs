//! End-to-end validation scenarios against a fixed rules snapshot.

use igkit::{
    Bound, DealingRules, Direction, DistanceOrigin, Leg, LimitLeg, OrderParams, Quote, StopLeg,
    ValidationError, validate_new_order, validate_order_update,
};

/// min deal size 0.5, stop/limit window [2, 50], min trailing step 1
fn rules() -> DealingRules {
    DealingRules::builder()
        .market_order_preference("AVAILABLE_DEFAULT_ON")
        .trailing_stop_preference("AVAILABLE")
        .min_deal_size(0.5)
        .min_stop_or_limit_distance(2.0)
        .max_stop_or_limit_distance(50.0)
        .min_controlled_risk_stop_distance(4.0)
        .min_step_distance(1.0)
        .build()
        .unwrap()
}

fn flat() -> Quote {
    Quote::new(100.0, 100.0)
}

// ============================================================================
// Accepted orders
// ============================================================================

#[test]
fn buy_with_raw_distances_passes() {
    let order = OrderParams::new(Direction::Buy, 1.0)
        .with_stop_distance(3.0)
        .with_limit_distance(10.0);
    let intent = validate_new_order(&order, &rules(), flat()).unwrap();
    assert_eq!(intent.direction, Direction::Buy);
    assert_eq!(intent.stop, Some(StopLeg::Distance(3.0)));
    assert_eq!(intent.limit, Some(LimitLeg::Distance(10.0)));
}

#[test]
fn sell_with_levels_passes() {
    let quote = Quote::new(99.5, 100.0);
    let order = OrderParams::new(Direction::Sell, 2.0)
        .with_stop_level(105.0)
        .with_limit_level(90.0);
    assert!(validate_new_order(&order, &rules(), quote).is_ok());
}

#[test]
fn minimum_size_is_accepted() {
    let order = OrderParams::new(Direction::Buy, 0.5)
        .with_stop_distance(2.0)
        .with_limit_distance(50.0);
    assert!(validate_new_order(&order, &rules(), flat()).is_ok());
}

#[test]
fn trailing_order_at_min_step_passes() {
    let order = OrderParams::new(Direction::Buy, 1.0)
        .with_stop_distance(10.0)
        .with_limit_distance(20.0)
        .with_stop_increment(1.0);
    assert!(validate_new_order(&order, &rules(), flat()).is_ok());
}

// ============================================================================
// Ordering of checks
// ============================================================================

#[test]
fn conflict_reported_before_anything_else() {
    let order = OrderParams::new(Direction::Buy, 1.0)
        .with_limit_level(110.0)
        .with_limit_distance(5.0);
    assert_eq!(
        validate_new_order(&order, &rules(), flat()),
        Err(ValidationError::ConflictingParameters { leg: Leg::Limit })
    );
    assert_eq!(
        validate_order_update(&order, &rules(), flat()),
        Err(ValidationError::ConflictingParameters { leg: Leg::Limit })
    );
}

#[test]
fn stop_conflict() {
    let order = OrderParams::new(Direction::Sell, 1.0)
        .with_limit_distance(10.0)
        .with_stop_level(105.0)
        .with_stop_distance(5.0);
    assert_eq!(
        validate_new_order(&order, &rules(), flat()),
        Err(ValidationError::ConflictingParameters { leg: Leg::Stop })
    );
}

#[test]
fn missing_limit_reported_before_bounds_on_new_order() {
    let order = OrderParams::new(Direction::Buy, 1.0).with_stop_distance(1.0);
    assert_eq!(
        validate_new_order(&order, &rules(), flat()),
        Err(ValidationError::MissingParameter { leg: Leg::Limit })
    );
}

#[test]
fn same_order_as_update_hits_stop_minimum() {
    let order = OrderParams::new(Direction::Buy, 1.0).with_stop_distance(1.0);
    let err = validate_order_update(&order, &rules(), flat()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::DistanceOutOfRange {
            leg: Leg::Stop,
            bound: Bound::Min,
            ..
        }
    ));
}

#[test]
fn missing_stop_on_new_order_but_fine_on_update() {
    let order = OrderParams::new(Direction::Buy, 1.0).with_limit_distance(10.0);
    assert_eq!(
        validate_new_order(&order, &rules(), flat()),
        Err(ValidationError::MissingParameter { leg: Leg::Stop })
    );
    assert!(validate_order_update(&order, &rules(), flat()).is_ok());
}

#[test]
fn size_checked_before_distances() {
    let order = OrderParams::new(Direction::Buy, 0.4)
        .with_stop_distance(100.0)
        .with_limit_distance(100.0);
    assert_eq!(
        validate_new_order(&order, &rules(), flat()),
        Err(ValidationError::SizeOutOfRange {
            size: 0.4,
            min: 0.5
        })
    );
}

#[test]
fn limit_distance_checked_before_stop_distance() {
    let order = OrderParams::new(Direction::Buy, 1.0)
        .with_stop_distance(1.0)
        .with_limit_distance(51.0);
    let err = validate_new_order(&order, &rules(), flat()).unwrap_err();
    assert_eq!(err.leg(), Some(Leg::Limit));
}

#[test]
fn increment_checked_last() {
    let order = OrderParams::new(Direction::Buy, 1.0)
        .with_stop_level(99.0)
        .with_limit_distance(10.0)
        .with_stop_increment(0.1);
    let err = validate_new_order(&order, &rules(), flat()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::DistanceOutOfRange {
            leg: Leg::Stop,
            origin: DistanceOrigin::Level,
            ..
        }
    ));
}

// ============================================================================
// Level translation
// ============================================================================

#[test]
fn buy_levels_use_bid() {
    // bid 100, offer 103: a buy stop at 97 is 3 away from the bid
    let quote = Quote::new(100.0, 103.0);
    let order = OrderParams::new(Direction::Buy, 1.0)
        .with_stop_level(97.0)
        .with_limit_level(150.0);
    assert!(validate_new_order(&order, &rules(), quote).is_ok());

    let too_far = OrderParams::new(Direction::Buy, 1.0)
        .with_stop_level(97.0)
        .with_limit_level(151.0);
    assert_eq!(
        validate_new_order(&too_far, &rules(), quote),
        Err(ValidationError::DistanceOutOfRange {
            leg: Leg::Limit,
            origin: DistanceOrigin::Level,
            distance: 51.0,
            bound: Bound::Max,
            bound_value: 50.0,
        })
    );
}

#[test]
fn sell_levels_use_offer() {
    let quote = Quote::new(97.0, 100.0);
    let order = OrderParams::new(Direction::Sell, 1.0)
        .with_stop_level(101.0)
        .with_limit_distance(10.0);
    assert_eq!(
        validate_new_order(&order, &rules(), quote),
        Err(ValidationError::DistanceOutOfRange {
            leg: Leg::Stop,
            origin: DistanceOrigin::Level,
            distance: 1.0,
            bound: Bound::Min,
            bound_value: 2.0,
        })
    );
}

#[test]
fn stop_on_profitable_side_is_rejected() {
    let order = OrderParams::new(Direction::Buy, 1.0)
        .with_stop_level(105.0)
        .with_limit_distance(10.0);
    let err = validate_new_order(&order, &rules(), flat()).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::DistanceOutOfRange {
            distance,
            bound: Bound::Min,
            ..
        } if distance == -5.0
    ));
}

#[test]
fn error_messages_are_readable() {
    let order = OrderParams::new(Direction::Buy, 1.0)
        .with_stop_distance(1.0)
        .with_limit_distance(10.0);
    let err = validate_new_order(&order, &rules(), flat()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "stop distance 1 (raw) breaches min_stop_or_limit_distance of 2"
    );
}
