//! Filesystem-backed [`SiteStore`].
//!
//! ## Write protocol
//!
//! 1. Validate the site path (relative, no `..`).
//! 2. Create parent directories.
//! 3. Write to `<path>.pressroom.tmp`.
//! 4. Rename to the final path (atomic on POSIX).

use std::path::{Component, Path, PathBuf};

use crate::storage::{io_err, BackendKind, RevisionToken, SiteStore, StorageError, StoredFile};

/// A site rooted at a local directory, e.g. a `gh-pages` worktree.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    /// Map a site-relative path into the root, rejecting escapes.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let invalid = |reason| StorageError::InvalidPath {
            path: path.to_string(),
            reason,
        };
        if path.is_empty() {
            return Err(invalid("empty path"));
        }
        let rel = Path::new(path);
        for component in rel.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir => return Err(invalid("contains '..'")),
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("must be relative"))
                }
            }
        }
        Ok(self.root.join(rel))
    }
}

impl SiteStore for LocalStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn get(&self, path: &str) -> Result<Option<StoredFile>, StorageError> {
        let full = self.resolve(path)?;
        match std::fs::read_to_string(&full) {
            Ok(content) => Ok(Some(StoredFile {
                content,
                token: None,
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(full, e)),
        }
    }

    fn put(
        &self,
        path: &str,
        content: &str,
        _token: Option<&RevisionToken>,
    ) -> Result<(), StorageError> {
        let full = self.resolve(path)?;
        let tmp = PathBuf::from(format!("{}.pressroom.tmp", full.display()));
        atomic_write(&full, &tmp, content)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

fn atomic_write(path: &Path, tmp: &Path, content: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
