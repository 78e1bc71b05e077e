mod attachment;
mod blocks;
mod chart;
mod classify;
mod confidence;
mod errors;
mod id_utils;
pub mod instruction;
mod opentelemetry;
mod params;
mod reply;
mod run;
mod session;
mod terminal;
mod types;

pub use attachment::{guess_mime_type, read_attachments};
pub use blocks::{extract_blocks, Block, ChartBlock, CHART_TAG_OPEN};
pub use chart::{ChartEntry, ChartKind, ChartSpec, DEFAULT_CHART_TITLE};
pub use classify::{classify, ReplyKind};
pub use confidence::{extract_confidence, Confidence};
pub use errors::TerminalError;
pub use instruction::RequestMode;
pub use params::{TerminalParams, DEFAULT_MODEL_ID};
pub use reply::{interpret, Reply, StructuredReply};
pub use run::{ChatSession, TurnFailure, HISTORY_WINDOW};
pub use session::{FlagStore, SessionContext, AUTH_FLAG_KEY};
pub use terminal::Terminal;
pub use types::*;
