use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::LazyLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// High confidence gets the positive badge, anything else the cautionary one.
    pub fn is_high(self) -> bool {
        self == Self::High
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static CONFIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Confidence: (High|Medium|Low)").expect("confidence pattern is valid")
});

/// Remove every confidence marker from `text` and return the level of the
/// first one.
pub fn extract_confidence(text: &str) -> (String, Option<Confidence>) {
    let level = CONFIDENCE_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|label| Confidence::from_label(label.as_str()));
    let display = CONFIDENCE_RE.replace_all(text, "").into_owned();
    (display, level)
}
