// LLM abstraction layer

pub mod provider;
pub mod google;

pub use provider::*;
pub use crate::types::{GenerationError, GenerationResult, LLMMessage, LLMRequest, LLMResponse, TokenUsage};

#[cfg(test)]
pub(crate) mod testing;
