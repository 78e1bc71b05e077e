use crate::{ChatSession, TerminalParams};
use fintech_sdk::LanguageModel;
use std::sync::Arc;

pub struct Terminal {
    model: Arc<dyn LanguageModel + Send + Sync>,
    system_prompt: Arc<str>,
    max_tokens: Option<u32>,
}

impl Terminal {
    #[must_use]
    pub fn new(params: TerminalParams) -> Self {
        Self {
            model: params.model,
            system_prompt: params.system_prompt.into(),
            max_tokens: params.max_tokens,
        }
    }

    /// Create a chat session with its own turn log
    pub fn create_session(&self) -> ChatSession {
        ChatSession::new(
            self.model.clone(),
            self.system_prompt.clone(),
            self.max_tokens,
        )
    }

    pub fn builder(model: Arc<dyn LanguageModel + Send + Sync>) -> TerminalParams {
        TerminalParams::new(model)
    }

    pub fn model_id(&self) -> String {
        self.model.model_id()
    }
}
