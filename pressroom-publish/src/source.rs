//! Content source abstraction.

use thiserror::Error;

use pressroom_core::{ContentKind, ContentRecord, DocumentId};

/// Errors raised while fetching records from the CMS.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("document not found: {id}")]
    NotFound { id: DocumentId },

    #[error("content API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("content API transport error: {0}")]
    Transport(#[source] Box<ureq::Transport>),

    #[error("could not decode content API response: {0}")]
    Decode(#[source] std::io::Error),
}

/// Read access to published CMS records.
pub trait ContentSource: Send + Sync {
    /// Fetch one record by identifier. Drafts are returned when no published
    /// version exists.
    fn fetch_one(&self, id: &DocumentId) -> Result<ContentRecord, SourceError>;

    /// Every published record of `kind`, newest first.
    fn fetch_all(&self, kind: ContentKind) -> Result<Vec<ContentRecord>, SourceError>;
}
