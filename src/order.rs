//! Order parameters: the loose input form and the validated, typed intent.
//!
//! [`OrderParams`] mirrors what a caller hands over at an API or CLI boundary:
//! every stop/limit field optional and independent. [`OrderIntent`] is what the
//! validator works on; each leg is a sum type, so "level and distance both
//! set" cannot be represented once the conversion has succeeded.

use std::fmt;

use crate::direction::Direction;
use crate::error::ValidationError;

/// One of the two protective legs of an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Leg {
    Limit,
    Stop,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Limit => f.write_str("limit"),
            Leg::Stop => f.write_str("stop"),
        }
    }
}

/// Whether a checked distance was supplied directly or derived from a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceOrigin {
    Distance,
    Level,
}

impl fmt::Display for DistanceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceOrigin::Distance => f.write_str("raw"),
            DistanceOrigin::Level => f.write_str("from level"),
        }
    }
}

/// Take-profit leg.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LimitLeg {
    /// Distance from the current market price, in points.
    Distance(f64),
    /// Absolute price level.
    Level(f64),
}

/// Stop-loss leg.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopLeg {
    /// Distance from the current market price, in points.
    Distance(f64),
    /// Absolute price level.
    Level(f64),
}

/// A typed order: at most one form per leg.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderIntent {
    pub direction: Direction,
    pub size: f64,
    pub limit: Option<LimitLeg>,
    pub stop: Option<StopLeg>,
    /// Trailing stop increment; only meaningful on trailing orders.
    pub stop_increment: Option<f64>,
}

impl OrderIntent {
    pub fn new(direction: Direction, size: f64) -> Self {
        Self {
            direction,
            size,
            limit: None,
            stop: None,
            stop_increment: None,
        }
    }

    pub fn with_limit(mut self, limit: LimitLeg) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_stop(mut self, stop: StopLeg) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_stop_increment(mut self, increment: f64) -> Self {
        self.stop_increment = Some(increment);
        self
    }

    /// Fails with `MissingParameter` unless both legs are present, stop first.
    pub fn require_legs(&self) -> Result<(), ValidationError> {
        if self.stop.is_none() {
            return Err(ValidationError::MissingParameter { leg: Leg::Stop });
        }
        if self.limit.is_none() {
            return Err(ValidationError::MissingParameter { leg: Leg::Limit });
        }
        Ok(())
    }

    pub fn limit_distance(&self) -> Option<f64> {
        match self.limit {
            Some(LimitLeg::Distance(d)) => Some(d),
            _ => None,
        }
    }

    pub fn limit_level(&self) -> Option<f64> {
        match self.limit {
            Some(LimitLeg::Level(l)) => Some(l),
            _ => None,
        }
    }

    pub fn stop_distance(&self) -> Option<f64> {
        match self.stop {
            Some(StopLeg::Distance(d)) => Some(d),
            _ => None,
        }
    }

    pub fn stop_level(&self) -> Option<f64> {
        match self.stop {
            Some(StopLeg::Level(l)) => Some(l),
            _ => None,
        }
    }
}

/// Untyped order parameters as supplied by a caller.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct OrderParams {
    pub direction: Direction,
    pub size: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub limit_distance: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub limit_level: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stop_distance: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stop_level: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stop_increment: Option<f64>,
}

impl OrderParams {
    pub fn new(direction: Direction, size: f64) -> Self {
        Self {
            direction,
            size,
            limit_distance: None,
            limit_level: None,
            stop_distance: None,
            stop_level: None,
            stop_increment: None,
        }
    }

    pub fn with_limit_distance(mut self, distance: f64) -> Self {
        self.limit_distance = Some(distance);
        self
    }

    pub fn with_limit_level(mut self, level: f64) -> Self {
        self.limit_level = Some(level);
        self
    }

    pub fn with_stop_distance(mut self, distance: f64) -> Self {
        self.stop_distance = Some(distance);
        self
    }

    pub fn with_stop_level(mut self, level: f64) -> Self {
        self.stop_level = Some(level);
        self
    }

    pub fn with_stop_increment(mut self, increment: f64) -> Self {
        self.stop_increment = Some(increment);
        self
    }

    /// Resolve each leg into its typed form. Limit conflicts are reported before stop conflicts.
    pub fn to_intent(&self) -> Result<OrderIntent, ValidationError> {
        let limit = match (self.limit_distance, self.limit_level) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::ConflictingParameters { leg: Leg::Limit });
            }
            (Some(d), None) => Some(LimitLeg::Distance(d)),
            (None, Some(l)) => Some(LimitLeg::Level(l)),
            (None, None) => None,
        };
        let stop = match (self.stop_distance, self.stop_level) {
            (Some(_), Some(_)) => {
                return Err(ValidationError::ConflictingParameters { leg: Leg::Stop });
            }
            (Some(d), None) => Some(StopLeg::Distance(d)),
            (None, Some(l)) => Some(StopLeg::Level(l)),
            (None, None) => None,
        };
        Ok(OrderIntent {
            direction: self.direction,
            size: self.size,
            limit,
            stop,
            stop_increment: self.stop_increment,
        })
    }
}

impl TryFrom<&OrderParams> for OrderIntent {
    type Error = ValidationError;

    fn try_from(params: &OrderParams) -> Result<Self, Self::Error> {
        params.to_intent()
    }
}

impl From<&OrderIntent> for OrderParams {
    fn from(intent: &OrderIntent) -> Self {
        Self {
            direction: intent.direction,
            size: intent.size,
            limit_distance: intent.limit_distance(),
            limit_level: intent.limit_level(),
            stop_distance: intent.stop_distance(),
            stop_level: intent.stop_level(),
            stop_increment: intent.stop_increment,
        }
    }
}
