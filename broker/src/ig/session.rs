//! Environment selection, login credentials and session tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Which IG gateway to talk to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Demo,
    Live,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Demo => "https://demo-api.ig.com/gateway/deal",
            Environment::Live => "https://api.ig.com/gateway/deal",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Demo => f.write_str("demo"),
            Environment::Live => f.write_str("live"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "demo" => Ok(Environment::Demo),
            "live" => Ok(Environment::Live),
            _ => Err(format!("unknown environment: {s} (expected demo or live)")),
        }
    }
}

/// API key and login. Secrets are wiped on drop and never printed.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: Zeroizing<String>,
    pub identifier: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(api_key: &str, identifier: &str, password: &str) -> Self {
        Self {
            api_key: Zeroizing::new(api_key.to_string()),
            identifier: identifier.to_string(),
            password: Zeroizing::new(password.to_string()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Tokens returned by a successful login, sent on every later request.
pub struct Session {
    pub cst: Zeroizing<String>,
    pub security_token: Zeroizing<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls() {
        assert_eq!(
            Environment::Demo.base_url(),
            "https://demo-api.ig.com/gateway/deal"
        );
        assert_eq!(Environment::Live.base_url(), "https://api.ig.com/gateway/deal");
        assert_eq!("LIVE".parse(), Ok(Environment::Live));
        assert!("paper".parse::<Environment>().is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::new("key-123", "trader", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("trader"));
        assert!(!shown.contains("key-123"));
        assert!(!shown.contains("hunter2"));

        let session = Session {
            cst: Zeroizing::new("cst-token".into()),
            security_token: Zeroizing::new("xst-token".into()),
        };
        assert!(!format!("{session:?}").contains("token"));
    }
}
