//! # igkit
//!
//! Order-parameter validation for IG spread-betting and CFD markets.
//!
//! Every IG market publishes a set of dealing rules: the smallest deal size,
//! how close and how far a stop or limit may sit from the market, and the
//! smallest step of a trailing stop. Orders that break them are rejected by the
//! dealing desk. This crate checks an order locally before it is sent.
//!
//! ## Quick Start
//!
//! ```
//! use igkit::{DealingRules, Direction, OrderParams, Quote, ValidationError, validate_new_order};
//!
//! let rules = DealingRules::builder()
//!     .market_order_preference("AVAILABLE_DEFAULT_ON")
//!     .trailing_stop_preference("AVAILABLE")
//!     .min_deal_size(0.5)
//!     .min_stop_or_limit_distance(2.0)
//!     .max_stop_or_limit_distance(50.0)
//!     .min_controlled_risk_stop_distance(4.0)
//!     .min_step_distance(1.0)
//!     .build()
//!     .unwrap();
//! let quote = Quote::new(100.0, 100.5);
//!
//! let order = OrderParams::new(Direction::Buy, 1.0)
//!     .with_stop_distance(5.0)
//!     .with_limit_level(110.0);
//! assert!(validate_new_order(&order, &rules, quote).is_ok());
//!
//! // Stop one point away, minimum is two.
//! let tight = OrderParams::new(Direction::Buy, 1.0)
//!     .with_stop_distance(1.0)
//!     .with_limit_distance(10.0);
//! assert!(matches!(
//!     validate_new_order(&tight, &rules, quote),
//!     Err(ValidationError::DistanceOutOfRange { .. })
//! ));
//! ```
//!
//! ## Levels and distances
//!
//! A stop or limit is given either as a distance in points from the market or as
//! an absolute level. Levels are turned into distances from the bid for a buy and
//! from the offer for a sell, then checked against the same window as raw
//! distances. Giving both forms for one leg is a [`ValidationError::ConflictingParameters`].
//!
//! ## Features
//!
//! - `serde`: (de)serialization of the model, including parsing the
//!   `dealingRules` object of a market details response straight into
//!   [`DealingRules`].

mod direction;
mod error;
mod order;
mod quote;
mod rules;
mod validator;

pub use direction::Direction;
pub use error::{Bound, RulesError, ValidationError};
pub use order::{DistanceOrigin, Leg, LimitLeg, OrderIntent, OrderParams, StopLeg};
pub use quote::Quote;
pub use rules::{DealingRules, DealingRulesBuilder, RawDealingRules, RawUnitValue, Unit, UnitValue};
pub use validator::{OrderValidator, TrailingAmendment, validate_new_order, validate_order_update};
