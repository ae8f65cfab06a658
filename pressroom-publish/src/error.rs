//! Error types for pressroom-publish.

use thiserror::Error;

use pressroom_core::{DocumentId, ManifestError};
use pressroom_renderer::RenderError;

use crate::source::SourceError;
use crate::storage::StorageError;

/// All errors that abort a publish run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The document targeted by an incremental publish does not exist.
    #[error("document not found: {id}")]
    NotFound { id: DocumentId },

    #[error("content source error: {0}")]
    Source(#[from] SourceError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The stored manifest could not be parsed, or the new one serialized.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
}
