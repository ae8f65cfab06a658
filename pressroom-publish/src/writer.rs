//! Content-gated writes against a [`SiteStore`].
//!
//! ## `write_file` protocol
//!
//! 1. Normalise line endings to LF.
//! 2. Re-read the path to get its current content and revision token.
//! 3. Compare with the stored content; skip if identical.
//! 4. In dry-run mode, report the write and stop.
//! 5. Put the content, echoing the token from step 2.

use std::fmt;

use crate::storage::{BackendKind, SiteStore, StorageError, StoredFile};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: String },
    /// File was skipped; stored content already matches.
    Unchanged { path: String },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: String },
}

impl WriteResult {
    pub fn path(&self) -> &str {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

impl fmt::Display for WriteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteResult::Written { path } => write!(f, "wrote {path}"),
            WriteResult::Unchanged { path } => write!(f, "unchanged {path}"),
            WriteResult::WouldWrite { path } => write!(f, "would write {path}"),
        }
    }
}

/// Write `content` to `path`, re-reading it first for a fresh revision token.
pub fn write_file(
    store: &dyn SiteStore,
    path: &str,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, StorageError> {
    let current = store.get(path)?;
    write_over(store, path, content, current.as_ref(), dry_run)
}

/// Write `content` over a previously read version of `path`.
///
/// `current` is trusted as-is: if the file changed after it was read, remote
/// stores reject the put with [`StorageError::Conflict`].
pub(crate) fn write_over(
    store: &dyn SiteStore,
    path: &str,
    content: &str,
    current: Option<&StoredFile>,
    dry_run: bool,
) -> Result<WriteResult, StorageError> {
    let normalized = content.replace("\r\n", "\n");
    let content = normalized.as_str();

    if current.is_some_and(|file| file.content == content) {
        tracing::debug!("unchanged: {path}");
        return Ok(WriteResult::Unchanged {
            path: path.to_string(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {path}");
        return Ok(WriteResult::WouldWrite {
            path: path.to_string(),
        });
    }

    let token = match current {
        Some(file) => match (&file.token, store.kind()) {
            (Some(token), _) => Some(token),
            (None, BackendKind::Local) => None,
            (None, BackendKind::Remote) => {
                return Err(StorageError::MissingToken {
                    path: path.to_string(),
                })
            }
        },
        None => None,
    };
    store.put(path, content, token)?;

    tracing::info!("wrote: {path}");
    Ok(WriteResult::Written {
        path: path.to_string(),
    })
}
