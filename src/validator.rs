//! Pre-submission order validation against an instrument's dealing rules.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. conflicting level/distance on one leg (only when starting from [`OrderParams`])
//! 2. both legs present (new orders only)
//! 3. size at or above the minimum deal size
//! 4. raw limit then stop distance inside `[min, max]`
//! 5. limit then stop level, translated to a distance from the bid (buy) or
//!    offer (sell), inside the same window
//! 6. trailing increment at or above the minimum step
//!
//! All bounds are inclusive.

use crate::direction::Direction;
use crate::error::{Bound, ValidationError};
use crate::order::{DistanceOrigin, Leg, LimitLeg, OrderIntent, OrderParams, StopLeg};
use crate::quote::Quote;
use crate::rules::DealingRules;

/// Validate the parameters of a new order. Both legs are mandatory.
///
/// Returns the typed intent so callers can build the request payload from it.
pub fn validate_new_order(
    params: &OrderParams,
    rules: &DealingRules,
    quote: Quote,
) -> Result<OrderIntent, ValidationError> {
    let intent = params.to_intent()?;
    OrderValidator::new(rules).check_new(&intent, quote)?;
    Ok(intent)
}

/// Validate the parameters of an amendment. Only the legs supplied are checked.
pub fn validate_order_update(
    params: &OrderParams,
    rules: &DealingRules,
    quote: Quote,
) -> Result<OrderIntent, ValidationError> {
    let intent = params.to_intent()?;
    OrderValidator::new(rules).check_update(&intent, quote)?;
    Ok(intent)
}

/// Amendment of a trailing-stop position. Unlike a regular order, the stop
/// level and the trailing distance are sent together, so they are not
/// mutually exclusive here.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailingAmendment {
    pub direction: Direction,
    pub size: f64,
    pub stop_level: Option<f64>,
    pub trailing_distance: Option<f64>,
    pub trailing_increment: Option<f64>,
}

/// Stateless checker bound to one rules snapshot.
#[derive(Clone, Copy, Debug)]
pub struct OrderValidator<'a> {
    rules: &'a DealingRules,
}

impl<'a> OrderValidator<'a> {
    pub fn new(rules: &'a DealingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'a DealingRules {
        self.rules
    }

    /// Full check for a new order.
    pub fn check_new(&self, intent: &OrderIntent, quote: Quote) -> Result<(), ValidationError> {
        intent.require_legs()?;
        self.check_bounds(intent, quote)
    }

    /// Check for an amendment: missing legs are fine, supplied ones must fit.
    pub fn check_update(&self, intent: &OrderIntent, quote: Quote) -> Result<(), ValidationError> {
        self.check_bounds(intent, quote)
    }

    /// Check a trailing-stop amendment: size, trailing distance, stop level, increment.
    pub fn check_trailing_amendment(
        &self,
        amendment: &TrailingAmendment,
        quote: Quote,
    ) -> Result<(), ValidationError> {
        self.check_size(amendment.size)?;
        if let Some(distance) = amendment.trailing_distance {
            self.check_distance(Leg::Stop, DistanceOrigin::Distance, distance)?;
        }
        if let Some(level) = amendment.stop_level {
            let distance = quote.stop_distance(amendment.direction, level);
            self.check_distance(Leg::Stop, DistanceOrigin::Level, distance)?;
        }
        if let Some(increment) = amendment.trailing_increment {
            self.check_increment(increment)?;
        }
        Ok(())
    }

    fn check_bounds(&self, intent: &OrderIntent, quote: Quote) -> Result<(), ValidationError> {
        self.check_size(intent.size)?;

        if let Some(LimitLeg::Distance(distance)) = intent.limit {
            self.check_distance(Leg::Limit, DistanceOrigin::Distance, distance)?;
        }
        if let Some(StopLeg::Distance(distance)) = intent.stop {
            self.check_distance(Leg::Stop, DistanceOrigin::Distance, distance)?;
        }

        if let Some(LimitLeg::Level(level)) = intent.limit {
            let distance = quote.limit_distance(intent.direction, level);
            self.check_distance(Leg::Limit, DistanceOrigin::Level, distance)?;
        }
        if let Some(StopLeg::Level(level)) = intent.stop {
            let distance = quote.stop_distance(intent.direction, level);
            self.check_distance(Leg::Stop, DistanceOrigin::Level, distance)?;
        }

        if let Some(increment) = intent.stop_increment {
            self.check_increment(increment)?;
        }
        Ok(())
    }

    /// Size must be a positive number no smaller than the minimum deal size.
    pub fn check_size(&self, size: f64) -> Result<(), ValidationError> {
        let min = self.rules.min_deal_size().value;
        if !size.is_finite() || size <= 0.0 || size < min {
            return Err(ValidationError::SizeOutOfRange { size, min });
        }
        Ok(())
    }

    /// Distance must lie in `[min_stop_or_limit_distance, max_stop_or_limit_distance]`.
    /// The maximum is checked first; NaN fails it.
    pub fn check_distance(
        &self,
        leg: Leg,
        origin: DistanceOrigin,
        distance: f64,
    ) -> Result<(), ValidationError> {
        let max = self.rules.max_stop_or_limit_distance().value;
        if distance.is_nan() || distance > max {
            return Err(ValidationError::DistanceOutOfRange {
                leg,
                origin,
                distance,
                bound: Bound::Max,
                bound_value: max,
            });
        }
        let min = self.rules.min_stop_or_limit_distance().value;
        if distance < min {
            return Err(ValidationError::DistanceOutOfRange {
                leg,
                origin,
                distance,
                bound: Bound::Min,
                bound_value: min,
            });
        }
        Ok(())
    }

    /// Trailing increment must be at least the minimum step distance.
    pub fn check_increment(&self, increment: f64) -> Result<(), ValidationError> {
        let min = self.rules.min_step_distance().value;
        if increment.is_nan() || increment < min {
            return Err(ValidationError::StepDistanceOutOfRange { increment, min });
        }
        Ok(())
    }
}
