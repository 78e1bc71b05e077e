use crate::{instruction::FINTECH_SYSTEM_PROMPT, Terminal};
use fintech_sdk::LanguageModel;
use std::sync::Arc;

/// Model used when none is configured.
pub const DEFAULT_MODEL_ID: &str = "gemini-3-pro-preview";

/// Parameters required to create a new terminal.
/// # Default Values
/// - `system_prompt`: `FINTECH_SYSTEM_PROMPT`
/// - `max_tokens`: `None`
pub struct TerminalParams {
    /// The language model every session of the terminal talks to.
    pub model: Arc<dyn LanguageModel + Send + Sync>,
    /// Sent as the system instruction with every request.
    pub system_prompt: String,
    /// Upper bound on generated tokens per reply.
    pub max_tokens: Option<u32>,
}

impl TerminalParams {
    pub fn new(model: Arc<dyn LanguageModel + Send + Sync>) -> Self {
        Self {
            model,
            system_prompt: FINTECH_SYSTEM_PROMPT.to_string(),
            max_tokens: None,
        }
    }

    /// Replace the system instruction
    #[must_use]
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Set the max tokens per reply
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    #[must_use]
    pub fn build(self) -> Terminal {
        Terminal::new(self)
    }
}
