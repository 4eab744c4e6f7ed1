// Test double for the generation service

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm::LLMAdapter;
use crate::types::{GenerationResult, LLMRequest, LLMResponse, TokenUsage};

/// Records every prompt it sees and answers from a fixed result.
pub struct ScriptedAdapter {
    prompts: Arc<Mutex<Vec<String>>>,
    result: GenerationResult<String>,
}

impl ScriptedAdapter {
    pub fn new(result: GenerationResult<String>) -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    /// Handle to the prompts received so far.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        self.prompts.clone()
    }
}

#[async_trait]
impl LLMAdapter for ScriptedAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> GenerationResult<LLMResponse> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);
        self.result.clone().map(|content| LLMResponse {
            content,
            finish_reason: "STOP".to_string(),
            usage: TokenUsage::default(),
        })
    }
}
