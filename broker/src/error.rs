//! Broker error types.

use igkit::{RulesError, ValidationError};

/// Errors that can occur during broker operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("authentication error: {0}")]
    Auth(String),

    /// The API answered with a non-success status.
    #[error("request failed with status {status}: {error_code}")]
    Api { status: u16, error_code: String },

    #[error("API allowance exceeded: {0}")]
    RateLimit(String),

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("market {epic} is closed")]
    MarketClosed { epic: String },

    #[error("no bid/offer available for {epic}")]
    NoQuote { epic: String },

    #[error("close size {requested} must be positive and no larger than the position size {position}")]
    InvalidCloseSize { requested: f64, position: f64 },

    /// A trailing stop moves by distance; IG refuses one given as a level.
    #[error("trailing stop on {epic} must be given as a distance, not a level")]
    TrailingStopLevel { epic: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rules(#[from] RulesError),
}

impl BrokerError {
    /// Map an IG error payload to an error. Allowance breaches get their own variant.
    pub fn from_api(status: u16, error_code: String) -> Self {
        if error_code.contains("exceeded") {
            BrokerError::RateLimit(error_code)
        } else {
            BrokerError::Api { status, error_code }
        }
    }

    /// True for locally detected order problems (nothing was sent).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BrokerError::Validation(_) | BrokerError::TrailingStopLevel { .. }
        )
    }
}
