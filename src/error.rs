//! Validation errors for order submission, and rules-parsing errors.

use std::fmt;

use crate::order::{DistanceOrigin, Leg};

/// Which side of the stop/limit distance window was breached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    /// Name of the dealing rule the bound comes from.
    pub fn rule_name(self) -> &'static str {
        match self {
            Bound::Min => "min_stop_or_limit_distance",
            Bound::Max => "max_stop_or_limit_distance",
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule_name())
    }
}

/// Errors returned by order validation. The first failing check wins.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ValidationError {
    /// Both a level and a distance were given for the same leg.
    #[error("only one of {leg} level or {leg} distance can be set on an order")]
    ConflictingParameters { leg: Leg },

    /// A new order was submitted without one of its mandatory legs.
    #[error("one of {leg} level or {leg} distance must be set on a new order")]
    MissingParameter { leg: Leg },

    /// Deal size is below the instrument minimum (or not a positive number).
    #[error("order size {size} is below the market minimum of {min}")]
    SizeOutOfRange { size: f64, min: f64 },

    /// A stop or limit distance, raw or derived from a level, is outside `[min, max]`.
    #[error("{leg} distance {distance} ({origin}) breaches {bound} of {bound_value}")]
    DistanceOutOfRange {
        leg: Leg,
        origin: DistanceOrigin,
        distance: f64,
        bound: Bound,
        bound_value: f64,
    },

    /// Trailing stop increment is below the instrument's minimum step.
    #[error("trailing stop increment {increment} is below the market minimum step of {min}")]
    StepDistanceOutOfRange { increment: f64, min: f64 },
}

impl ValidationError {
    /// The leg the failure refers to, if any.
    pub fn leg(&self) -> Option<Leg> {
        match self {
            ValidationError::ConflictingParameters { leg }
            | ValidationError::MissingParameter { leg }
            | ValidationError::DistanceOutOfRange { leg, .. } => Some(*leg),
            ValidationError::StepDistanceOutOfRange { .. } => Some(Leg::Stop),
            ValidationError::SizeOutOfRange { .. } => None,
        }
    }
}

/// A dealing-rules snapshot that cannot be trusted for validation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RulesError {
    #[error("dealing rules are missing required field `{0}`")]
    MissingField(&'static str),

    #[error("dealing rule `{field}` has invalid value {value}")]
    InvalidValue { field: &'static str, value: f64 },
}
