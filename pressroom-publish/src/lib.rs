//! # pressroom-publish
//!
//! Storage backends, the Sanity content source and the publish orchestrator.
//!
//! Build a [`Publisher`] from a resolved [`SiteConfig`](pressroom_core::SiteConfig),
//! a [`ContentSource`], a [`SiteStore`] and a renderer, then call
//! [`Publisher::run`] with either a single document or a full rebuild.

pub mod error;
pub mod github;
pub mod local;
pub mod memory;
pub mod pipeline;
pub mod sanity;
pub mod source;
pub mod storage;
pub mod writer;

pub use error::PublishError;
pub use github::GitHubStore;
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use pipeline::{PublishReport, PublishScope, Publisher, SkippedEntry};
pub use sanity::SanityClient;
pub use source::{ContentSource, SourceError};
pub use storage::{open_store, BackendKind, RevisionToken, SiteStore, StorageError, StoredFile};
pub use writer::{write_file, WriteResult};
