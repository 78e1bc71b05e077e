use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("A turn is already being generated for this session.")]
    TurnInFlight,
    #[error("Failed to read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Session store error: {0}")]
    Io(#[from] std::io::Error),
}
