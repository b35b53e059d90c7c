//! LLM Provider Adapters.
//!
//! Implementations of the LlmProvider port.
//!
//! ## Available Adapters
//!
//! - `MockLlmProvider` - Scripted replies for testing
//! - `OpenAIProvider` - OpenAI chat completions (and compatible endpoints)
//! - `AnthropicProvider` - Anthropic Messages API

mod anthropic_provider;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider, DEFAULT_ANTHROPIC_MODEL};
pub use mock_provider::{MockLlmProvider, MockResponse, DEFAULT_MOCK_REPLY};
pub use openai_provider::{
    OpenAIConfig, OpenAIProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL,
};

use std::sync::Arc;

use crate::config::{AiConfig, AiProvider};
use crate::ports::{LlmProvider, ProviderError};

/// Builds the configured primary provider.
///
/// # Errors
///
/// Returns `ProviderError::AuthenticationFailed` if the primary provider has
/// no API key, or `InvalidRequest` if its HTTP client cannot be built.
pub fn provider_from_config(config: &AiConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    match config.primary_provider {
        AiProvider::OpenAI => {
            let key = config
                .openai_api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or(ProviderError::AuthenticationFailed)?;

            let mut openai = OpenAIConfig::new(key)
                .with_model(&config.openai_model)
                .with_timeout(config.timeout())
                .with_max_retries(config.max_retries);
            if let Some(url) = &config.openai_base_url {
                openai = openai.with_base_url(url);
            }

            Ok(Arc::new(OpenAIProvider::new(openai)?))
        }
        AiProvider::Anthropic => {
            let key = config
                .anthropic_api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or(ProviderError::AuthenticationFailed)?;

            let anthropic = AnthropicConfig::new(key)
                .with_model(&config.anthropic_model)
                .with_timeout(config.timeout())
                .with_max_retries(config.max_retries);

            Ok(Arc::new(AnthropicProvider::new(anthropic)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_openai_by_default() {
        let config = AiConfig {
            openai_api_key: Some("sk-xxx".to_string()),
            openai_model: "gpt-4o".to_string(),
            ..Default::default()
        };

        let provider = provider_from_config(&config).unwrap();

        let info = provider.provider_info();
        assert_eq!(info.name, "openai");
        assert_eq!(info.model, "gpt-4o");
    }

    #[test]
    fn builds_anthropic_when_selected() {
        let config = AiConfig {
            primary_provider: AiProvider::Anthropic,
            anthropic_api_key: Some("sk-ant-xxx".to_string()),
            ..Default::default()
        };

        let provider = provider_from_config(&config).unwrap();

        assert_eq!(provider.provider_info().name, "anthropic");
    }

    #[test]
    fn missing_key_is_authentication_error() {
        let result = provider_from_config(&AiConfig::default());
        assert!(matches!(result, Err(ProviderError::AuthenticationFailed)));
    }
}
