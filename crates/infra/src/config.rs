//! Configuration loading and representation.
//!
//! Settings come from the process environment only. Three keys are required;
//! everything else has a default. Missing required keys are reported all at
//! once so an operator can fix the environment in one pass.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Environment variable names.
pub mod keys {
    pub const MAIL_USERNAME: &str = "MAIL_USERNAME";
    pub const MAIL_PASSWORD: &str = "MAIL_PASSWORD";
    pub const SECRET_KEY: &str = "SECRET_KEY";
    pub const MAIL_SERVER: &str = "MAIL_SERVER";
    pub const MAIL_PORT: &str = "MAIL_PORT";
    pub const MAIL_USE_TLS: &str = "MAIL_USE_TLS";
    pub const MAIL_DEFAULT_SENDER: &str = "MAIL_DEFAULT_SENDER";
    pub const MAIL_TIMEOUT_SECS: &str = "MAIL_TIMEOUT_SECS";
    pub const RECIPIENT_EMAIL: &str = "RECIPIENT_EMAIL";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const APP_DEBUG: &str = "APP_DEBUG";
    pub const APP_HOST: &str = "APP_HOST";
    pub const APP_PORT: &str = "APP_PORT";

    pub const FLASK_SECRET_KEY: &str = "FLASK_SECRET_KEY";
    pub const FLASK_DEBUG: &str = "FLASK_DEBUG";
}

/// Older deployment name read when `key` itself is unset.
fn legacy_alias(key: &str) -> Option<&'static str> {
    match key {
        keys::SECRET_KEY => Some(keys::FLASK_SECRET_KEY),
        keys::APP_DEBUG => Some(keys::FLASK_DEBUG),
        _ => None,
    }
}

/// Keys that must be set (and non-blank), in reporting order.
pub const REQUIRED_KEYS: [&str; 3] = [keys::MAIL_USERNAME, keys::MAIL_PASSWORD, keys::SECRET_KEY];

pub const DEFAULT_MAIL_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_MAIL_PORT: u16 = 587;
pub const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DATABASE_URL: &str = "sqlite:instance/app.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// A string that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: String,
    pub password: Secret,
    pub default_sender: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub debug: bool,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mail: MailSettings,
    pub secret_key: Secret,
    /// Where contact submissions go. Absence is a per-request warning, not a startup error.
    pub recipient: Option<String>,
    pub database_url: String,
    pub server: ServerSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get = |key: &str| set(key).or_else(|| legacy_alias(key).and_then(|alias| set(alias)));

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        let required = |key: &'static str| get(key).ok_or_else(|| ConfigError::Missing(vec![key]));

        let username = required(keys::MAIL_USERNAME)?;
        let password = required(keys::MAIL_PASSWORD)?;
        let secret_key = required(keys::SECRET_KEY)?;

        let mail = MailSettings {
            server: get(keys::MAIL_SERVER).unwrap_or_else(|| DEFAULT_MAIL_SERVER.to_string()),
            port: parse_or(keys::MAIL_PORT, get(keys::MAIL_PORT), DEFAULT_MAIL_PORT)?,
            use_tls: parse_bool_or(keys::MAIL_USE_TLS, get(keys::MAIL_USE_TLS), true)?,
            default_sender: get(keys::MAIL_DEFAULT_SENDER).unwrap_or_else(|| username.clone()),
            timeout: Duration::from_secs(parse_or(
                keys::MAIL_TIMEOUT_SECS,
                get(keys::MAIL_TIMEOUT_SECS),
                DEFAULT_MAIL_TIMEOUT_SECS,
            )?),
            username,
            password: Secret::new(password),
        };

        let server = ServerSettings {
            host: get(keys::APP_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(keys::APP_PORT, get(keys::APP_PORT), DEFAULT_PORT)?,
            debug: parse_bool_or(keys::APP_DEBUG, get(keys::APP_DEBUG), false)?,
        };

        Ok(Self {
            mail,
            secret_key: Secret::new(secret_key),
            recipient: get(keys::RECIPIENT_EMAIL),
            database_url: get(keys::DATABASE_URL).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            server,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse();
            parsed.map_err(|_| ConfigError::Invalid { key, value })
        }
    }
}

fn parse_bool_or(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
