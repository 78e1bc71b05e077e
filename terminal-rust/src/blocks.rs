use crate::chart::ChartSpec;
use tracing::debug;

pub const CHART_TAG_OPEN: &str = "[CHART_DATA:";

/// A chart tag that parsed successfully, with the exact text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBlock {
    pub spec: ChartSpec,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Prose(String),
    Chart(ChartBlock),
}

impl Block {
    /// The slice of the reply this block was cut from.
    pub fn raw(&self) -> &str {
        match self {
            Self::Prose(text) => text,
            Self::Chart(chart) => &chart.raw,
        }
    }
}

/// Split a reply into prose and chart blocks, in source order.
///
/// Every tag is surrounded by prose blocks, empty ones included. Tags whose
/// body is not a valid chart are dropped and leave only their neighbouring
/// prose behind.
pub fn extract_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    for tag in find_tags(text) {
        blocks.push(Block::Prose(text[cursor..tag.start].to_string()));
        let body = text[tag.body_start..tag.body_end].trim();
        match serde_json::from_str::<ChartSpec>(body) {
            Ok(spec) => blocks.push(Block::Chart(ChartBlock {
                spec,
                raw: text[tag.start..tag.end].to_string(),
            })),
            Err(error) => debug!(%error, "dropping malformed chart tag"),
        }
        cursor = tag.end;
    }

    blocks.push(Block::Prose(text[cursor..].to_string()));
    blocks
}

struct TagSpan {
    start: usize,
    body_start: usize,
    body_end: usize,
    /// One past the closing bracket.
    end: usize,
}

fn find_tags(text: &str) -> Vec<TagSpan> {
    let mut tags = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(CHART_TAG_OPEN) {
        let start = cursor + offset;
        let body_start = start + CHART_TAG_OPEN.len();
        let Some(body_end) = balanced_body_end(text, body_start)
            .or_else(|| text[body_start..].find(']').map(|pos| body_start + pos))
        else {
            break;
        };
        let end = body_end + 1;
        tags.push(TagSpan {
            start,
            body_start,
            body_end,
            end,
        });
        cursor = end;
    }

    tags
}

/// Index of the `]` closing a tag whose body is a single JSON object or array.
///
/// Brackets inside JSON strings are ignored, so `"label": "Q[1]"` does not end
/// the tag early. Returns `None` when the body does not start with `{`/`[`, is
/// unbalanced, or is not followed by `]` after optional whitespace.
fn balanced_body_end(text: &str, body_start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut index = body_start;
    while bytes.get(index)?.is_ascii_whitespace() {
        index += 1;
    }
    if !matches!(bytes[index], b'{' | b'[') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    loop {
        let byte = *bytes.get(index)?;
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        index += 1;
    }

    index += 1;
    while bytes.get(index)?.is_ascii_whitespace() {
        index += 1;
    }
    (bytes[index] == b']').then_some(index)
}
