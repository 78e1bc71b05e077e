use crate::{
    blocks::{extract_blocks, Block},
    classify::{classify, ReplyKind},
    confidence::{extract_confidence, Confidence},
    types::{ChatTurn, Sender, Source},
};

/// A turn decoded into what the console should draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// User turns are shown as typed.
    Plain(String),
    /// Offer the credential configuration action next to the text.
    KeySelection(String),
    /// Show the text with an accept/decline choice.
    FallbackOffer(String),
    DomainError(String),
    Structured(StructuredReply),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredReply {
    /// Prose blocks have their confidence markers removed.
    pub blocks: Vec<Block>,
    pub confidence: Option<Confidence>,
    pub sources: Vec<Source>,
}

pub fn interpret(turn: &ChatTurn) -> Reply {
    if turn.sender == Sender::User {
        return Reply::Plain(turn.text.clone());
    }

    match classify(&turn.text) {
        ReplyKind::KeySelection => Reply::KeySelection(turn.text.clone()),
        ReplyKind::FallbackOffer => Reply::FallbackOffer(turn.text.clone()),
        ReplyKind::DomainError => Reply::DomainError(turn.text.clone()),
        ReplyKind::Normal => Reply::Structured(structure(
            &turn.text,
            turn.sources.clone().unwrap_or_default(),
        )),
    }
}

fn structure(text: &str, sources: Vec<Source>) -> StructuredReply {
    let mut confidence = None;
    let blocks = extract_blocks(text)
        .into_iter()
        .map(|block| match block {
            Block::Prose(prose) => {
                let (display, level) = extract_confidence(&prose);
                confidence = confidence.or(level);
                Block::Prose(display)
            }
            chart @ Block::Chart(_) => chart,
        })
        .collect();

    StructuredReply {
        blocks,
        confidence,
        sources,
    }
}
