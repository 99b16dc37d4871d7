use async_trait::async_trait;

use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Configuration for an LLM provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    /// Overrides the provider's public endpoint (proxies, tests)
    pub api_base: Option<String>,
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        let adapter: Box<dyn LLMAdapter> = match provider.name.as_str() {
            "google" | "gemini" => Box::new(match &provider.api_base {
                Some(base) => crate::llm::google::GoogleAdapter::with_api_base(&provider.api_key, base),
                None => crate::llm::google::GoogleAdapter::new(&provider.api_key),
            }),
            other => {
                return Err(AppError::Config(format!("Unsupported provider: {}", other)));
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
        })
    }

    /// Wrap an existing adapter, e.g. an alternative or mocked model provider
    pub fn with_adapter(provider_name: impl Into<String>, adapter: Box<dyn LLMAdapter>) -> Self {
        Self {
            adapter,
            provider_name: provider_name.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_provider_is_supported() {
        let llm = LLM::new(LLMProviderConfig {
            name: "google".into(),
            api_key: "test-key".into(),
            api_base: None,
        })
        .unwrap();
        assert_eq!(llm.provider_name(), "google");
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let result = LLM::new(LLMProviderConfig {
            name: "carrier-pigeon".into(),
            api_key: "test-key".into(),
            api_base: None,
        });
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
