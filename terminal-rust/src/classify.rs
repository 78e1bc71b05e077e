use crate::instruction::{DOMAIN_ERROR_PREFIX, FALLBACK_MESSAGE, KEY_SELECTION_MARKER};

/// Presentation mode of a raw AI reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Ask the user to configure a credential. The text is still shown.
    KeySelection,
    /// Offer to broaden the search beyond the attached documents.
    FallbackOffer,
    /// Request rejected as outside the finance domain.
    DomainError,
    /// Free text that may carry charts and a confidence marker.
    Normal,
}

/// Classify a reply. Checks run in priority order and the first match wins.
/// Matching is literal and case-sensitive.
pub fn classify(text: &str) -> ReplyKind {
    if text.contains(KEY_SELECTION_MARKER) {
        ReplyKind::KeySelection
    } else if text == FALLBACK_MESSAGE {
        ReplyKind::FallbackOffer
    } else if text.starts_with(DOMAIN_ERROR_PREFIX) {
        ReplyKind::DomainError
    } else {
        ReplyKind::Normal
    }
}
