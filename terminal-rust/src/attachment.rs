use crate::{AttachedFile, TerminalError};
use base64::{engine::general_purpose::STANDARD, Engine};
use fintech_sdk::Part;
use futures::future::try_join_all;
use std::path::Path;

impl AttachedFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            payload: payload.into(),
        }
    }

    /// Images are stored as base64, everything else as (lossy) UTF-8 text.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        let mime_type = mime_type.into();
        let payload = if is_image_mime(&mime_type) {
            STANDARD.encode(bytes)
        } else {
            String::from_utf8_lossy(bytes).into_owned()
        };
        Self::new(name, mime_type, payload)
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, TerminalError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TerminalError::Attachment {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Ok(Self::from_bytes(name, guess_mime_type(path), &bytes))
    }

    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }

    /// The request part carrying this file for the current turn.
    pub(crate) fn to_part(&self) -> Part {
        if self.is_image() {
            Part::image(strip_data_url(&self.payload), self.mime_type.clone())
        } else {
            Part::text(format!(
                "Attached Document Content (Filename: {}):\n---BEGIN---\n{}\n---END---",
                self.name, self.payload
            ))
        }
    }
}

/// Read every file concurrently. Files come back in input order and the first
/// failure fails the whole batch.
pub async fn read_attachments<P: AsRef<Path>>(
    paths: &[P],
) -> Result<Vec<AttachedFile>, TerminalError> {
    try_join_all(paths.iter().map(AttachedFile::from_path)).await
}

fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        if let Some((_, data)) = payload.split_once(";base64,") {
            return data;
        }
    }
    payload
}

pub fn guess_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("md") => "text/markdown",
        _ => "text/plain",
    }
}
