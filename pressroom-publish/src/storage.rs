//! Site storage abstraction.
//!
//! A [`SiteStore`] holds the generated site as UTF-8 files keyed by
//! site-relative paths (`articles/index.html`, `manifest.json`, ...). Remote
//! backends hand out a [`RevisionToken`] with every read; a write must echo the
//! token of the version it replaces or it is rejected with
//! [`StorageError::Conflict`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use pressroom_core::Backend;

use crate::github::GitHubStore;
use crate::local::LocalStore;

/// Which concurrency model a store follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Optimistic concurrency with revision tokens.
    Remote,
    /// Plain directory. Tokens are neither issued nor checked.
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Remote => f.write_str("remote"),
            BackendKind::Local => f.write_str("local"),
        }
    }
}

/// Opaque version identifier of a stored file (a blob sha on GitHub).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionToken(pub String);

impl fmt::Display for RevisionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A file as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: String,
    /// Always `Some` on remote backends, `None` on local ones.
    pub token: Option<RevisionToken>,
}

/// Errors raised by any [`SiteStore`]. All of them are fatal to a run.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file changed since it was read, or the token is stale.
    #[error("conflict writing {path}: the file was modified concurrently")]
    Conflict { path: String },

    /// A remote file was read back without a revision token.
    #[error("no revision token for existing remote file {path}")]
    MissingToken { path: String },

    #[error("HTTP {status} for {path}: {body}")]
    Http {
        path: String,
        status: u16,
        body: String,
    },

    #[error("transport error for {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: Box<ureq::Transport>,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid site path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The backend returned something that is not a UTF-8 file.
    #[error("could not decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Convenience constructor for [`StorageError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.into(),
        source,
    }
}

/// Backend-neutral read/write access to the generated site.
pub trait SiteStore: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Read a file. A missing path is `Ok(None)`.
    fn get(&self, path: &str) -> Result<Option<StoredFile>, StorageError>;

    /// Create or overwrite a file.
    ///
    /// Remote backends require `token` to match the current version of an
    /// existing file and to be `None` for a new one.
    fn put(
        &self,
        path: &str,
        content: &str,
        token: Option<&RevisionToken>,
    ) -> Result<(), StorageError>;

    /// Human-readable location for log lines.
    fn describe(&self) -> String;
}

/// Construct the store selected by the run configuration.
pub fn open_store(backend: &Backend) -> Box<dyn SiteStore> {
    match backend {
        Backend::GitHub(target) => Box::new(GitHubStore::new(target.clone())),
        Backend::Local { root } => Box::new(LocalStore::new(root.clone())),
    }
}
