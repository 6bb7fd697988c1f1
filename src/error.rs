//! Error types for Manobal.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems found while loading or validating the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Empty {field} in {kind} entry {id:?}")]
    EmptyField {
        kind: &'static str,
        id: String,
        field: &'static str,
    },

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Counsellor {counsellor} refers to unknown college {college_id}")]
    UnknownCollege {
        counsellor: String,
        college_id: String,
    },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Provider {provider} server error: {reason}")]
    ServerError { provider: String, reason: String },
}

/// Outbound mail errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail delivery is not configured")]
    NotConfigured,

    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("server disconnected: {0}")]
    Disconnected(String),

    #[error("{0}")]
    Send(String),
}

/// Document store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Request to {collection} failed: {reason}")]
    Request { collection: String, reason: String },

    #[error("Store rejected write to {collection} (HTTP {status}): {body}")]
    Rejected {
        collection: String,
        status: u16,
        body: String,
    },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Metadata scraping errors.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Content contains forbidden terms: {}", .0.join(", "))]
    Forbidden(Vec<String>),
}
