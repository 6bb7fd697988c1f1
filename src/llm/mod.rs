//! LLM integration for Manobal.
//!
//! Supports:
//! - **Cohere**: chat API via rig-core, persona sent as the preamble
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait.

pub mod provider;
mod rig_adapter;

pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::error::LlmError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Cohere,
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Overrides the backend's default API base URL.
    pub base_url: Option<String>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::Cohere => create_cohere_provider(config),
    }
}

fn create_cohere_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::cohere;

    let api_key = config.api_key.expose_secret();
    let client: cohere::Client = match &config.base_url {
        Some(url) => cohere::Client::builder()
            .api_key(api_key)
            .base_url(url)
            .build(),
        None => cohere::Client::new(api_key),
    }
    .map_err(|e| LlmError::RequestFailed {
        provider: "cohere".to_string(),
        reason: format!("Failed to create Cohere client: {}", e),
    })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Cohere (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "cohere")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_missing_key_still_constructs() {
        // rig-core clients accept any string as API key at construction time.
        // The actual auth failure happens when making a request.
        let config = LlmConfig {
            backend: LlmBackend::Cohere,
            api_key: secrecy::SecretString::from("test-key"),
            model: "command-r-plus".to_string(),
            base_url: None,
        };
        let provider = create_provider(&config);
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "command-r-plus");
    }

    #[test]
    fn test_create_provider_with_custom_base_url() {
        let config = LlmConfig {
            backend: LlmBackend::Cohere,
            api_key: secrecy::SecretString::from("test-key"),
            model: "command-r".to_string(),
            base_url: Some("http://127.0.0.1:9".to_string()),
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "command-r");
    }
}
