//! Configuration types, built from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Everything the service needs at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    /// `None` when no SMTP credentials are configured.
    pub mail: Option<MailConfig>,
    /// `None` falls back to the in-memory store.
    pub firestore: Option<FirestoreConfig>,
    /// Optional JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Directory for rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            llm: llm_config_from_env()?,
            mail: MailConfig::from_env()?,
            firestore: FirestoreConfig::from_env(),
            catalog_path: std::env::var("MANOBAL_CATALOG_PATH").ok().map(PathBuf::from),
            log_dir: std::env::var("MANOBAL_LOG_DIR").ok().map(PathBuf::from),
        })
    }
}

/// HTTP server and request-handling settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Sessions untouched for this long are dropped.
    pub session_idle_timeout: Duration,
    /// Applied to article fetches only.
    pub article_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            article_timeout: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            bind: parse_env("MANOBAL_BIND")?.unwrap_or(defaults.bind),
            session_idle_timeout: parse_env::<u64>("MANOBAL_SESSION_IDLE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_idle_timeout),
            article_timeout: parse_env::<u64>("MANOBAL_ARTICLE_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.article_timeout),
        })
    }
}

fn llm_config_from_env() -> Result<LlmConfig, ConfigError> {
    let api_key = std::env::var("COHERE_API_KEY")
        .map_err(|_| ConfigError::MissingEnvVar("COHERE_API_KEY".to_string()))?;
    let model =
        std::env::var("MANOBAL_MODEL").unwrap_or_else(|_| "command-r-plus".to_string());

    Ok(LlmConfig {
        backend: LlmBackend::Cohere,
        api_key: SecretString::from(api_key),
        model,
        base_url: std::env::var("COHERE_BASE_URL").ok(),
    })
}

/// SMTP settings for booking confirmations.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl MailConfig {
    /// Returns `None` if `EMAIL_USER` is not set (confirmation mail disabled).
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(username) = std::env::var("EMAIL_USER") else {
            return Ok(None);
        };
        let password = std::env::var("EMAIL_PASS")
            .map_err(|_| ConfigError::MissingEnvVar("EMAIL_PASS".to_string()))?;
        let smtp_host = std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let smtp_port = parse_env("SMTP_PORT")?.unwrap_or(587);
        let from_address = std::env::var("EMAIL_FROM").unwrap_or_else(|_| username.clone());

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            username,
            password: SecretString::from(password),
            from_address,
        }))
    }
}

/// Firestore REST access.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub access_token: SecretString,
    /// Overrides the public endpoint (emulator, tests).
    pub base_url: Option<String>,
}

impl FirestoreConfig {
    /// Returns `None` unless both project id and token are set.
    pub fn from_env() -> Option<Self> {
        let project_id = std::env::var("FIRESTORE_PROJECT_ID").ok()?;
        let access_token = std::env::var("FIRESTORE_ACCESS_TOKEN").ok()?;
        Some(Self {
            project_id,
            access_token: SecretString::from(access_token),
            base_url: std::env::var("FIRESTORE_BASE_URL").ok(),
        })
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind.port(), 5000);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.article_timeout, Duration::from_secs(10));
    }

    #[test]
    fn parse_value_accepts_padded_numbers() {
        let port: u16 = parse_value("SMTP_PORT", " 465 ").unwrap();
        assert_eq!(port, 465);
    }

    #[test]
    fn parse_value_reports_key_on_failure() {
        let err = parse_value::<u16>("SMTP_PORT", "not-a-port").unwrap_err();
        match err {
            ConfigError::InvalidValue { key, message } => {
                assert_eq!(key, "SMTP_PORT");
                assert!(message.contains("not-a-port"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_value_socket_addr() {
        let addr: SocketAddr = parse_value("MANOBAL_BIND", "127.0.0.1:8080").unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
