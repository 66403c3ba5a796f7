//! Error types for igctl.

use std::path::PathBuf;

use igkit_broker::BrokerError;

/// All errors that can occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("invalid input: {0}")]
    Input(String),

    #[error("confirmation prompt failed: {0}")]
    Prompt(String),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

impl Error {
    /// The order was refused locally by the validator.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Broker(e) if e.is_validation())
    }

    /// Process exit status: 2 for a rejected order, 1 for anything else.
    pub fn exit_code(&self) -> i32 {
        if self.is_validation() { 2 } else { 1 }
    }
}

impl From<igkit::ValidationError> for Error {
    fn from(e: igkit::ValidationError) -> Self {
        Error::Broker(BrokerError::Validation(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use igkit::{Leg, ValidationError};

    #[test]
    fn validation_errors_are_flagged() {
        let err: Error = ValidationError::MissingParameter { leg: Leg::Stop }.into();
        assert!(err.is_validation());
        assert!(!Error::Input("bad".into()).is_validation());
        assert!(!Error::Broker(BrokerError::NotAuthenticated).is_validation());
    }

    #[test]
    fn exit_codes() {
        let rejected: Error = ValidationError::MissingParameter { leg: Leg::Stop }.into();
        assert_eq!(rejected.exit_code(), 2);
        let trailing = Error::Broker(BrokerError::TrailingStopLevel {
            epic: "IX.D.FTSE.DAILY.IP".into(),
        });
        assert_eq!(trailing.exit_code(), 2);
        assert_eq!(Error::Prompt("not a terminal".into()).exit_code(), 1);
        assert_eq!(Error::Input("bad".into()).exit_code(), 1);
    }
}
