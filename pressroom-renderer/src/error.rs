//! Error types for pressroom-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from page rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Portable Text content that could not be converted to HTML.
///
/// Never surfaced past the page builders; they degrade to plain text instead.
#[derive(Debug, Error)]
pub enum RichTextError {
    #[error("rich text must be an array of blocks, got {found}")]
    NotAnArray { found: &'static str },

    #[error("block {index} is not an object")]
    NotAnObject { index: usize },

    #[error("block {index} has no _type")]
    MissingType { index: usize },

    #[error("block {index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}
