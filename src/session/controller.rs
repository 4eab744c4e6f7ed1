//! Chat Session Controller
//!
//! Builds the effective prompt for a question, calls the generation service
//! once and records the exchange in the session transcript.

use std::sync::Arc;

use tracing::{info, warn};

use super::{ChatMessage, ChatSession, ExtractedDocument};
use crate::config::LLMConfig;
use crate::llm::{LLMProviderConfig, LLM};
use crate::types::{AppError, AppResult, GenerationError, LLMMessage, LLMRequest};

pub const MISSING_API_KEY: &str = "Gemini API key not found. Add GEMINI_API_KEY to the secrets file or set GEMINI_API_KEY / GOOGLE_API_KEY in the environment.";

/// Model parameters sent with every request.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl From<&LLMConfig> for GenerationSettings {
    fn from(config: &LLMConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Result of a submission that reached the generation service.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The assistant reply, already appended to the transcript.
    Answered(ChatMessage),
    /// The service failed; only the user message was recorded.
    Failed(GenerationError),
}

/// Reasons a submission is refused before anything is recorded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("{0}")]
    Configuration(String),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyQuestion => {
                AppError::InvalidRequest("question must not be empty".to_string())
            }
            ChatError::Configuration(message) => AppError::Configuration(message),
        }
    }
}

pub struct ChatController {
    llm: Option<Arc<LLM>>,
    settings: GenerationSettings,
}

impl ChatController {
    pub fn new(llm: Option<Arc<LLM>>, settings: GenerationSettings) -> Self {
        Self { llm, settings }
    }

    /// Build a Gemini-backed controller. Without an API key the controller is
    /// still created but every submission is refused with a configuration error.
    pub fn from_config(config: &LLMConfig) -> AppResult<Self> {
        let llm = match &config.api_key {
            Some(api_key) => Some(Arc::new(LLM::new(LLMProviderConfig {
                name: "google".to_string(),
                api_key: api_key.clone(),
                api_base: config.api_base.clone(),
            })?)),
            None => {
                warn!("{}", MISSING_API_KEY);
                None
            }
        };
        Ok(Self::new(llm, GenerationSettings::from(config)))
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// The text actually sent to the model for `question`.
    pub fn build_prompt(
        document: Option<&ExtractedDocument>,
        question: &str,
        use_document: bool,
    ) -> String {
        match document {
            Some(doc) if use_document && doc.has_text() => format!(
                "Here is the study material:\n\n{}\n\nQuestion: {}",
                doc.text, question
            ),
            _ => question.to_string(),
        }
    }

    /// Clear the session transcript.
    pub fn reset(&self, session: &mut ChatSession) {
        info!(session_id = %session.id(), messages = session.transcript().len(), "Resetting transcript");
        session.reset();
    }

    /// Ask `question` in `session`.
    ///
    /// The user message is recorded before the service is called. A reply is
    /// recorded only on success; a service failure is returned as
    /// `SubmitOutcome::Failed` and leaves the user message as the last entry.
    pub async fn submit(
        &self,
        session: &mut ChatSession,
        question: &str,
        use_document: bool,
    ) -> Result<SubmitOutcome, ChatError> {
        if question.trim().is_empty() {
            return Err(ChatError::EmptyQuestion);
        }
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| ChatError::Configuration(MISSING_API_KEY.to_string()))?;

        let augmented = use_document && session.document().is_some_and(|d| d.has_text());
        let prompt = Self::build_prompt(session.document(), question, use_document);

        session.push(ChatMessage::user(question));

        info!(
            session_id = %session.id(),
            question_len = question.len(),
            prompt_len = prompt.len(),
            augmented,
            "Submitting question"
        );

        let request = LLMRequest {
            model: self.settings.model.clone(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match llm.create_chat_completion(&request).await {
            Ok(response) => {
                info!(
                    session_id = %session.id(),
                    finish_reason = %response.finish_reason,
                    total_tokens = response.usage.total_tokens,
                    "Answer received"
                );
                let reply = ChatMessage::assistant(response.content);
                session.push(reply.clone());
                Ok(SubmitOutcome::Answered(reply))
            }
            Err(e) => {
                warn!(session_id = %session.id(), kind = e.kind(), "Generation failed: {}", e);
                Ok(SubmitOutcome::Failed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedAdapter;
    use crate::session::Role;
    use crate::types::GenerationResult;
    use std::sync::Mutex;

    fn controller(result: GenerationResult<String>) -> (ChatController, Arc<Mutex<Vec<String>>>) {
        let adapter = ScriptedAdapter::new(result);
        let prompts = adapter.prompts();
        let llm = LLM::from_adapter("scripted", Box::new(adapter));
        let settings = GenerationSettings {
            model: "test-model".to_string(),
            max_tokens: None,
            temperature: None,
        };
        (ChatController::new(Some(Arc::new(llm)), settings), prompts)
    }

    fn markdown(text: &str) -> ExtractedDocument {
        ExtractedDocument {
            filename: "chapter1.md".to_string(),
            content_type: "text/markdown".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_build_prompt() {
        let doc = markdown("Chapter 1: Kinematics");
        assert_eq!(
            ChatController::build_prompt(Some(&doc), "Summarize", true),
            "Here is the study material:\n\nChapter 1: Kinematics\n\nQuestion: Summarize"
        );
        assert_eq!(ChatController::build_prompt(Some(&doc), "Summarize", false), "Summarize");
        assert_eq!(ChatController::build_prompt(None, "Summarize", true), "Summarize");
        assert_eq!(
            ChatController::build_prompt(Some(&markdown("  \n ")), "Summarize", true),
            "Summarize"
        );
    }

    #[tokio::test]
    async fn test_successful_submit_adds_two_messages() {
        let (controller, _) = controller(Ok("Kinematics studies motion.".to_string()));
        let mut session = ChatSession::new();
        session.push(ChatMessage::user("earlier"));
        session.push(ChatMessage::assistant("reply"));

        let outcome = controller.submit(&mut session, "What is kinematics?", true).await.unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Answered(ChatMessage::assistant("Kinematics studies motion."))
        );
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[2], ChatMessage::user("What is kinematics?"));
        assert_eq!(transcript[3].role(), Role::Assistant);
        assert_eq!(transcript[3].content(), "Kinematics studies motion.");
    }

    #[tokio::test]
    async fn test_document_is_sent_but_not_recorded() {
        let (controller, prompts) = controller(Ok("Summary".to_string()));
        let mut session = ChatSession::new();
        session.set_document(markdown("Chapter 1: Kinematics"));

        controller.submit(&mut session, "Summarize", true).await.unwrap();

        let sent = prompts.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Chapter 1: Kinematics"));
        assert!(sent[0].contains("Summarize"));
        assert_eq!(session.transcript()[0].content(), "Summarize");
    }

    #[tokio::test]
    async fn test_document_reused_every_turn_until_disabled() {
        let (controller, prompts) = controller(Ok("ok".to_string()));
        let mut session = ChatSession::new();
        session.set_document(markdown("Chapter 1: Kinematics"));

        controller.submit(&mut session, "First", true).await.unwrap();
        controller.submit(&mut session, "Second", true).await.unwrap();
        controller.submit(&mut session, "Third", false).await.unwrap();

        let sent = prompts.lock().unwrap().clone();
        assert!(sent[0].contains("Chapter 1"));
        assert!(sent[1].contains("Chapter 1"));
        assert_eq!(sent[2], "Third");
    }

    #[tokio::test]
    async fn test_failed_generation_records_only_user_message() {
        let (controller, _) = controller(Err(GenerationError::Network("connection refused".to_string())));
        let mut session = ChatSession::new();

        let outcome = controller.submit(&mut session, "Define momentum", true).await.unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(GenerationError::Network("connection refused".to_string()))
        );
        assert_eq!(session.transcript(), &[ChatMessage::user("Define momentum")]);
    }

    #[tokio::test]
    async fn test_empty_question_is_refused() {
        let (controller, prompts) = controller(Ok("unused".to_string()));
        let mut session = ChatSession::new();

        let result = controller.submit(&mut session, "   ", true).await;

        assert_eq!(result, Err(ChatError::EmptyQuestion));
        assert!(session.transcript().is_empty());
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_blocks_submission() {
        let controller = ChatController::new(
            None,
            GenerationSettings {
                model: "test-model".to_string(),
                max_tokens: None,
                temperature: None,
            },
        );
        let mut session = ChatSession::new();

        let result = controller.submit(&mut session, "Hello?", true).await;

        assert!(matches!(result, Err(ChatError::Configuration(_))));
        assert!(!controller.is_configured());
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_reset_empties_transcript() {
        let (controller, _) = controller(Ok("answer".to_string()));
        let mut session = ChatSession::new();
        controller.submit(&mut session, "One", true).await.unwrap();
        controller.submit(&mut session, "Two", true).await.unwrap();
        assert_eq!(session.transcript().len(), 4);

        controller.reset(&mut session);

        assert_eq!(session.transcript().len(), 0);
    }
}
