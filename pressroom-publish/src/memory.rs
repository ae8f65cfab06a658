//! In-memory [`SiteStore`].
//!
//! Mirrors either backend: [`MemoryStore::remote`] issues a fresh
//! [`RevisionToken`] on every write and rejects stale or missing tokens the way
//! the GitHub contents API does; [`MemoryStore::local`] ignores tokens.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::storage::{BackendKind, RevisionToken, SiteStore, StorageError, StoredFile};

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<String, (String, u64)>,
    next_revision: u64,
    puts: usize,
}

impl Inner {
    fn store(&mut self, path: &str, content: &str) {
        self.next_revision += 1;
        self.files
            .insert(path.to_string(), (content.to_string(), self.next_revision));
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    kind: BackendKind,
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Token-checking store with GitHub semantics.
    pub fn remote() -> Self {
        Self::with_kind(BackendKind::Remote)
    }

    /// Token-free store with local-directory semantics.
    pub fn local() -> Self {
        Self::with_kind(BackendKind::Local)
    }

    fn with_kind(kind: BackendKind) -> Self {
        MemoryStore {
            kind,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Seed or overwrite a file directly, bypassing token checks.
    ///
    /// Simulates a concurrent writer on remote stores: the file gets a new
    /// revision, invalidating any token handed out before.
    #[must_use]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    /// See [`MemoryStore::with_file`].
    pub fn insert(&self, path: &str, content: &str) {
        self.lock().store(path, content);
    }

    /// Current content of `path`, if any.
    pub fn contents(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|(content, _)| content.clone())
    }

    /// Every stored path, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    /// Number of successful [`SiteStore::put`] calls.
    pub fn put_count(&self) -> usize {
        self.lock().puts
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave `Inner` half-updated.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn token_for(revision: u64) -> RevisionToken {
        RevisionToken(format!("rev-{revision}"))
    }
}

impl SiteStore for MemoryStore {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn get(&self, path: &str) -> Result<Option<StoredFile>, StorageError> {
        let inner = self.lock();
        Ok(inner.files.get(path).map(|(content, revision)| StoredFile {
            content: content.clone(),
            token: match self.kind {
                BackendKind::Remote => Some(Self::token_for(*revision)),
                BackendKind::Local => None,
            },
        }))
    }

    fn put(
        &self,
        path: &str,
        content: &str,
        token: Option<&RevisionToken>,
    ) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if self.kind == BackendKind::Remote {
            let current = inner.files.get(path).map(|(_, rev)| Self::token_for(*rev));
            if current.as_ref() != token {
                return Err(StorageError::Conflict {
                    path: path.to_string(),
                });
            }
        }
        inner.store(path, content);
        inner.puts += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory ({})", self.kind)
    }
}
