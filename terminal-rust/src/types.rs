use crate::id_utils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown for grounding chunks that came back without a title.
pub const DEFAULT_SOURCE_TITLE: &str = "Market Intelligence Link";

const SOURCE_TITLE_DISPLAY_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A file picked by the user for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub name: String,
    pub mime_type: String,
    /// Base64 for images, raw text otherwise.
    pub payload: String,
}

/// A web citation returned with a search-grounded reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

impl Source {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }

    /// Title shortened for a citation chip.
    pub fn display_title(&self) -> String {
        if self.title.chars().count() > SOURCE_TITLE_DISPLAY_LEN {
            let head: String = self.title.chars().take(SOURCE_TITLE_DISPLAY_LEN).collect();
            format!("{head}...")
        } else {
            self.title.clone()
        }
    }
}

impl From<fintech_sdk::WebSource> for Source {
    fn from(value: fintech_sdk::WebSource) -> Self {
        Self {
            title: value
                .title
                .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string()),
            uri: value.uri,
        }
    }
}

/// One entry of the chat log. Turns are never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub attached_files: Vec<AttachedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>, attached_files: Vec<AttachedFile>) -> Self {
        Self::create(Sender::User, text.into(), attached_files, None)
    }

    /// An empty source list is stored as `None`.
    pub fn ai(text: impl Into<String>, sources: Option<Vec<Source>>) -> Self {
        let sources = sources.filter(|sources| !sources.is_empty());
        Self::create(Sender::Ai, text.into(), vec![], sources)
    }

    fn create(
        sender: Sender,
        text: String,
        attached_files: Vec<AttachedFile>,
        sources: Option<Vec<Source>>,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            id: id_utils::turn_id(timestamp),
            sender,
            text,
            timestamp,
            attached_files,
            sources,
        }
    }
}

/// The last user request, kept so it can be re-issued with extended search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingContext {
    pub prompt: String,
    pub files: Vec<AttachedFile>,
}

/// Input the user has typed or attached but not yet sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedInput {
    pub text: String,
    pub files: Vec<AttachedFile>,
}

impl StagedInput {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.files.is_empty()
    }
}
