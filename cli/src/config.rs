//! TOML configuration loading and validation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use igkit_broker::ig::{Credentials, Environment};
use igkit_broker::{DealOptions, TimeInForce};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Environment variable consulted when the config file carries no password.
pub const PASSWORD_ENV: &str = "IGCTL_PASSWORD";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub dealing: DealingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(deserialize_with = "secret")]
    pub api_key: Zeroizing<String>,
    pub identifier: String,
    #[serde(default, deserialize_with = "optional_secret")]
    pub password: Option<Zeroizing<String>>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("environment", &self.environment)
            .field("api_key", &"[REDACTED]")
            .field("identifier", &self.identifier)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_timeout() -> u64 {
    30
}

fn secret<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Zeroizing<String>, D::Error> {
    String::deserialize(d).map(Zeroizing::new)
}

fn optional_secret<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<Zeroizing<String>>, D::Error> {
    Option::<String>::deserialize(d).map(|s| s.map(Zeroizing::new))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountConfig {
    /// Switch to this account after login.
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DealingConfig {
    #[serde(default = "default_currency")]
    pub currency_code: String,
    #[serde(default)]
    pub time_in_force: TimeInForce,
    #[serde(default)]
    pub guaranteed_stop: bool,
}

impl Default for DealingConfig {
    fn default() -> Self {
        Self {
            currency_code: default_currency(),
            time_in_force: TimeInForce::default(),
            guaranteed_stop: false,
        }
    }
}

fn default_currency() -> String {
    "GBP".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    pub fn validate(&self) -> Result<()> {
        if self.connection.api_key.trim().is_empty() {
            return Err(Error::Config("api_key must not be empty".into()));
        }
        if self.connection.identifier.trim().is_empty() {
            return Err(Error::Config("identifier must not be empty".into()));
        }
        if self.connection.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be > 0".into()));
        }
        if self.account.id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(Error::Config("account id must not be empty when set".into()));
        }
        let currency = &self.dealing.currency_code;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::Config(format!(
                "currency_code must be a three-letter ISO code, got \"{currency}\""
            )));
        }
        Ok(())
    }

    /// Login credentials, with the password taken from `IGCTL_PASSWORD` when
    /// the file has none.
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_with(std::env::var(PASSWORD_ENV).ok())
    }

    fn credentials_with(&self, env_password: Option<String>) -> Result<Credentials> {
        let env_password = env_password.map(Zeroizing::new);
        let password = self
            .connection
            .password
            .as_ref()
            .or(env_password.as_ref())
            .ok_or_else(|| {
                Error::Config(format!("no password in config and {PASSWORD_ENV} is not set"))
            })?;
        Ok(Credentials::new(
            &self.connection.api_key,
            &self.connection.identifier,
            password,
        ))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.connection.timeout_secs)
    }

    /// Defaults applied to every new position.
    pub fn deal_options(&self) -> DealOptions {
        DealOptions {
            currency_code: self.dealing.currency_code.clone(),
            time_in_force: self.dealing.time_in_force,
            guaranteed_stop: self.dealing.guaranteed_stop,
        }
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[connection]
environment = "demo"
api_key = "0123456789abcdef"
identifier = "trader"
password = "hunter2"
timeout_secs = 20

[account]
id = "Z3JYYT"

[dealing]
currency_code = "EUR"
time_in_force = "EXECUTE_AND_ELIMINATE"

[logging]
dir = "./logs"
audit_file = "audit.jsonl"
"#
    }

    fn minimal_toml() -> &'static str {
        r#"
[connection]
api_key = "0123456789abcdef"
identifier = "trader"
"#
    }

    #[test]
    fn parse_example_config() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        assert_eq!(config.connection.environment, Environment::Demo);
        assert_eq!(config.connection.identifier, "trader");
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.account.id.as_deref(), Some("Z3JYYT"));
        assert_eq!(config.dealing.time_in_force, TimeInForce::ExecuteAndEliminate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn defaults_fill_missing_sections() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.connection.timeout_secs, 30);
        assert!(config.account.id.is_none());
        assert_eq!(config.deal_options(), DealOptions::default());
        assert_eq!(config.audit_path(), PathBuf::from("./logs/audit.jsonl"));
    }

    #[test]
    fn live_environment() {
        let toml = example_toml().replace("\"demo\"", "\"live\"");
        let config: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.connection.environment, Environment::Live);
    }

    #[test]
    fn validate_catches_bad_currency() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.dealing.currency_code = "pounds".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_blank_account() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.account.id = Some(" ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_catches_zero_timeout() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.connection.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn password_falls_back_to_env() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert!(config.credentials_with(None).is_err());
        let creds = config.credentials_with(Some("from-env".into())).unwrap();
        assert_eq!(creds.password.as_str(), "from-env");
    }

    #[test]
    fn file_password_wins_over_env() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        let creds = config.credentials_with(Some("from-env".into())).unwrap();
        assert_eq!(creds.password.as_str(), "hunter2");
        assert_eq!(creds.identifier, "trader");
    }

    #[test]
    fn debug_hides_secrets() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        let shown = format!("{config:?}");
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("0123456789abcdef"));
    }
}
