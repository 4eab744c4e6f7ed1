use async_trait::async_trait;
use crate::types::{AppError, AppResult, GenerationResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> GenerationResult<LLMResponse>;
}

/// Configuration for an LLM provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub api_base: String,
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        let adapter: Box<dyn LLMAdapter> = match provider.name.as_str() {
            "google" | "gemini" => Box::new(crate::llm::google::GoogleAdapter::with_base_url(
                &provider.api_key,
                &provider.api_base,
            )),
            other => {
                return Err(AppError::Configuration(format!(
                    "Unsupported provider: {}",
                    other
                )))
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
        })
    }

    /// Wrap an already constructed adapter.
    pub fn from_adapter(name: impl Into<String>, adapter: Box<dyn LLMAdapter>) -> Self {
        Self {
            adapter,
            provider_name: name.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> GenerationResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_provider_aliases() {
        for name in ["google", "gemini"] {
            let llm = LLM::new(LLMProviderConfig {
                name: name.to_string(),
                api_key: "test-key".to_string(),
                api_base: crate::config::DEFAULT_API_BASE.to_string(),
            })
            .unwrap();
            assert_eq!(llm.provider_name(), name);
        }
    }

    #[test]
    fn test_unknown_provider_is_configuration_error() {
        let result = LLM::new(LLMProviderConfig {
            name: "carrier-pigeon".to_string(),
            api_key: "test-key".to_string(),
            api_base: "http://localhost".to_string(),
        });
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
