//! Pressroom core library: content types, the site manifest and run configuration.
//!
//! - [`types`]: content records and kinds as they come from the CMS
//! - [`manifest`]: the published-site index and its merge rules
//! - [`config`]: [`SiteConfig`] resolution
//! - [`error`]: [`ManifestError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod manifest;
pub mod timestamp;
pub mod types;

pub use config::{Backend, ConfigOptions, PublishTarget, SiteConfig, SiteMeta};
pub use error::{ConfigError, ManifestError};
pub use manifest::{Manifest, ManifestEntry, MergeOutcome, MANIFEST_PATH};
pub use types::{ContentKind, ContentRecord, DocumentId, SlugField};
