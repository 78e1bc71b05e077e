use thiserror::Error;

#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the provider failed or the parsing of the response
    /// failed. The request URL is stripped from the message.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The request returns a non-OK status code. The body is kept verbatim so
    /// provider messages (e.g. "API key not valid") reach the caller.
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The response from the provider was unexpected. (e.g. no candidates
    /// returned in a Gemini completion)
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

impl From<reqwest::Error> for LanguageModelError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.without_url())
    }
}

pub type LanguageModelResult<T> = Result<T, LanguageModelError>;
