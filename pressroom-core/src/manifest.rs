//! Site manifest: the JSON index of everything that has been published.
//!
//! # Document shape
//!
//! ```text
//! {
//!   "articles":        [ManifestEntry, ...],
//!   "recommendations": [ManifestEntry, ...],
//!   "updatedAt":       "2024-06-01T09:30:00.000Z"
//! }
//! ```
//!
//! The manifest is read whole, mutated in memory and written back whole.
//! Within each kind's sequence both `id` and `slug` are unique: [`Manifest::merge`]
//! uses either one as the merge key.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::timestamp;
use crate::types::{non_empty, ContentKind, ContentRecord, DocumentId};

/// Site-relative path of the manifest document.
pub const MANIFEST_PATH: &str = "manifest.json";

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One manifest row: the display projection of a [`ContentRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: DocumentId,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<String>,
}

impl ManifestEntry {
    /// Project a record into its manifest row.
    pub fn from_record(record: &ContentRecord) -> Self {
        let owned = |value: &Option<String>| non_empty(value).unwrap_or_default().to_string();
        let mut entry = ManifestEntry {
            id: record.id.clone(),
            slug: record.slug(),
            title: record.display_title(),
            excerpt: String::new(),
            published_at: record.published_at,
            ticker: None,
            recommendation_type: None,
            target_price: None,
            time_horizon: None,
        };
        match record.kind {
            ContentKind::Article => {
                entry.excerpt = owned(&record.excerpt);
            }
            ContentKind::Recommendation => {
                entry.ticker = Some(owned(&record.ticker));
                entry.recommendation_type = Some(owned(&record.recommendation_type));
                entry.target_price = record.target_price;
                entry.time_horizon = Some(owned(&record.time_horizon));
            }
        }
        entry
    }
}

/// What [`Manifest::merge`] did with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No entry matched; the new one was appended.
    Added,
    /// The entry at `index` matched by id or slug and was overwritten.
    Replaced { index: usize },
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Root of the site index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub articles: Vec<ManifestEntry>,
    #[serde(default)]
    pub recommendations: Vec<ManifestEntry>,
    #[serde(default = "Utc::now", with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::empty()
    }
}

impl Manifest {
    /// A manifest with no entries, stamped now.
    pub fn empty() -> Self {
        Manifest {
            articles: Vec::new(),
            recommendations: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Parse a manifest document. Missing sequences read as empty.
    pub fn from_json(contents: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(contents).map_err(ManifestError::Parse)
    }

    /// Two-space indented JSON, the on-disk form.
    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
    }

    pub fn entries(&self, kind: ContentKind) -> &[ManifestEntry] {
        match kind {
            ContentKind::Article => &self.articles,
            ContentKind::Recommendation => &self.recommendations,
        }
    }

    fn entries_mut(&mut self, kind: ContentKind) -> &mut Vec<ManifestEntry> {
        match kind {
            ContentKind::Article => &mut self.articles,
            ContentKind::Recommendation => &mut self.recommendations,
        }
    }

    /// Total number of entries across both kinds.
    pub fn len(&self) -> usize {
        self.articles.len() + self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge `record` into its kind's sequence.
    ///
    /// The first entry (in sequence order) whose id **or** slug matches the
    /// new entry is replaced in place; otherwise the entry is appended.
    /// `updated_at` is bumped either way.
    pub fn merge(&mut self, record: &ContentRecord) -> MergeOutcome {
        let entry = ManifestEntry::from_record(record);
        let list = self.entries_mut(record.kind);
        let outcome = match list
            .iter()
            .position(|e| e.id == entry.id || e.slug == entry.slug)
        {
            Some(index) => {
                list[index] = entry;
                MergeOutcome::Replaced { index }
            }
            None => {
                list.push(entry);
                MergeOutcome::Added
            }
        };
        self.updated_at = Utc::now();
        outcome
    }

    /// Entries of `kind`, most recently published first.
    ///
    /// Stable: equal timestamps keep manifest order. Entries without a
    /// timestamp sort last.
    pub fn newest_first(&self, kind: ContentKind) -> Vec<&ManifestEntry> {
        let mut items: Vec<&ManifestEntry> = self.entries(kind).iter().collect();
        items.sort_by_key(|e| Reverse(e.published_at));
        items
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
