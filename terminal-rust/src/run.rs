use crate::{
    classify::classify,
    instruction::{
        build_prompt, RequestMode, CONNECTION_ERROR_HINT, CONNECTION_ERROR_PREFIX,
        CREDENTIAL_ERROR_TEXT, EMPTY_REPLY_TEXT, STRICT_MODE_NOTICE,
    },
    opentelemetry::TurnSpan,
    AttachedFile, ChatTurn, PendingContext, Sender, SessionContext, Source, StagedInput,
    TerminalError,
};
use fintech_sdk::{LanguageModel, LanguageModelInput, Message, Part, Tool};
use futures::lock::Mutex;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, info, warn};

/// Number of prior turns sent as conversation history.
pub const HISTORY_WINDOW: usize = 5;

/// How a failed generation call is reported back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnFailure {
    /// The provider rejected the API key.
    Credential,
    /// Anything else. Carries the provider message for diagnostics.
    Connection(String),
}

impl TurnFailure {
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("api key not valid") || lowered.contains("unauthorized") {
            Self::Credential
        } else {
            Self::Connection(message.to_string())
        }
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, Self::Credential)
    }

    /// Text of the synthetic AI turn.
    pub fn message(&self) -> String {
        match self {
            Self::Credential => CREDENTIAL_ERROR_TEXT.to_string(),
            Self::Connection(detail) if detail.is_empty() => {
                format!("{CONNECTION_ERROR_PREFIX} {CONNECTION_ERROR_HINT}")
            }
            Self::Connection(detail) => format!("{CONNECTION_ERROR_PREFIX} {detail}"),
        }
    }
}

/// One chat conversation: the turn log, the request kept for a fallback
/// retry, the staging area and the in-flight flag.
pub struct ChatSession {
    model: Arc<dyn LanguageModel + Send + Sync>,
    system_prompt: Arc<str>,
    max_tokens: Option<u32>,
    state: SessionState,
}

#[derive(Default)]
struct SessionState {
    turns: Mutex<Vec<ChatTurn>>,
    pending: Mutex<Option<PendingContext>>,
    staged: Mutex<StagedInput>,
    generating: AtomicBool,
}

/// Holds the in-flight flag for the duration of one generation call.
struct GeneratingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> GeneratingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, TerminalError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TerminalError::TurnInFlight)?;
        Ok(Self { flag })
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl ChatSession {
    pub(crate) fn new(
        model: Arc<dyn LanguageModel + Send + Sync>,
        system_prompt: Arc<str>,
        max_tokens: Option<u32>,
    ) -> Self {
        Self {
            model,
            system_prompt,
            max_tokens,
            state: SessionState::default(),
        }
    }

    /// Send one user turn to the model and append the AI reply.
    ///
    /// Returns `Ok(None)` without touching the log when there is neither text
    /// nor a file to send. Provider failures are not errors here: they become
    /// an AI turn with a `TERMINAL_ERROR:` text, and a rejected credential
    /// also clears `context.credential_valid`.
    ///
    /// A retry re-sends `prompt`/`files` with extended search and does not
    /// append a user turn or replace the pending context.
    pub async fn submit_turn(
        &self,
        context: &mut SessionContext,
        prompt: &str,
        files: Vec<AttachedFile>,
        is_extended_retry: bool,
    ) -> Result<Option<ChatTurn>, TerminalError> {
        if prompt.trim().is_empty() && files.is_empty() {
            debug!("nothing to submit");
            return Ok(None);
        }

        let _generating = GeneratingGuard::acquire(&self.state.generating)?;
        let mode = RequestMode::select(!files.is_empty(), is_extended_retry);

        let history = {
            let mut turns = self.state.turns.lock().await;
            let history = history_messages(&turns);
            if !is_extended_retry {
                turns.push(ChatTurn::user(prompt, files.clone()));
            }
            history
        };

        if !is_extended_retry {
            *self.state.pending.lock().await = Some(PendingContext {
                prompt: prompt.to_string(),
                files: files.clone(),
            });
            *self.state.staged.lock().await = StagedInput::default();
        }

        let span = TurnSpan::new(mode, history.len(), files.len());
        let input = self.build_input(history, prompt, &files, mode);
        debug!(
            mode = mode.map_or("unset", RequestMode::as_str),
            messages = input.messages.len(),
            "sending turn to {}",
            self.model.provider()
        );

        let turn = match span.instrument_future(self.model.generate(input)).await {
            Ok(response) => {
                let text = response.text();
                let text = if text.is_empty() {
                    EMPTY_REPLY_TEXT.to_string()
                } else {
                    text
                };
                let sources = response
                    .sources
                    .map(|sources| sources.into_iter().map(Source::from).collect());
                let turn = ChatTurn::ai(text, sources);
                span.on_reply(
                    classify(&turn.text),
                    turn.sources.as_ref().map_or(0, Vec::len),
                );
                turn
            }
            Err(error) => {
                let failure = TurnFailure::classify(&error.to_string());
                span.on_error(&error, failure.is_credential());
                warn!(%error, credential = failure.is_credential(), "generation failed");
                if failure.is_credential() {
                    context.credential_valid = false;
                }
                ChatTurn::ai(failure.message(), None)
            }
        };

        self.state.turns.lock().await.push(turn.clone());
        info!(turn_id = %turn.id, "turn completed");
        Ok(Some(turn))
    }

    /// Re-send the last request with extended search after the user accepted
    /// a fallback offer. Does nothing when no request has been made yet.
    pub async fn accept_fallback(
        &self,
        context: &mut SessionContext,
    ) -> Result<Option<ChatTurn>, TerminalError> {
        let Some(pending) = self.pending_context().await else {
            debug!("no pending request to extend");
            return Ok(None);
        };
        self.submit_turn(context, &pending.prompt, pending.files, true)
            .await
    }

    /// Keep answers restricted to the documents. No model call is made.
    pub async fn decline_fallback(&self) -> ChatTurn {
        let turn = ChatTurn::ai(STRICT_MODE_NOTICE, None);
        self.state.turns.lock().await.push(turn.clone());
        turn
    }

    /// Submit whatever is in the staging area.
    pub async fn submit_staged(
        &self,
        context: &mut SessionContext,
    ) -> Result<Option<ChatTurn>, TerminalError> {
        let staged = self.staged().await;
        self.submit_turn(context, &staged.text, staged.files, false)
            .await
    }

    pub async fn stage_text(&self, text: impl Into<String>) {
        self.state.staged.lock().await.text = text.into();
    }

    pub async fn stage_file(&self, file: AttachedFile) {
        self.state.staged.lock().await.files.push(file);
    }

    pub async fn clear_staged(&self) {
        *self.state.staged.lock().await = StagedInput::default();
    }

    pub async fn staged(&self) -> StagedInput {
        self.state.staged.lock().await.clone()
    }

    pub async fn turns(&self) -> Vec<ChatTurn> {
        self.state.turns.lock().await.clone()
    }

    pub async fn pending_context(&self) -> Option<PendingContext> {
        self.state.pending.lock().await.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.state.generating.load(Ordering::Acquire)
    }

    fn build_input(
        &self,
        mut messages: Vec<Message>,
        prompt: &str,
        files: &[AttachedFile],
        mode: Option<RequestMode>,
    ) -> LanguageModelInput {
        let mut content: Vec<Part> = files.iter().map(AttachedFile::to_part).collect();
        content.push(Part::text(build_prompt(mode, prompt)));
        messages.push(Message::user(content));

        LanguageModelInput {
            system_prompt: Some(self.system_prompt.to_string()),
            messages,
            tools: RequestMode::uses_web_search(mode).then(|| vec![Tool::WebSearch]),
            max_tokens: self.max_tokens,
            temperature: Some(RequestMode::temperature(mode)),
        }
    }
}

/// The most recent turns as model messages, oldest first.
fn history_messages(turns: &[ChatTurn]) -> Vec<Message> {
    let start = turns.len().saturating_sub(HISTORY_WINDOW);
    turns[start..]
        .iter()
        .map(|turn| {
            let content = vec![Part::text(turn.text.clone())];
            match turn.sender {
                Sender::User => Message::user(content),
                Sender::Ai => Message::assistant(content),
            }
        })
        .collect()
}
