//! Domain types for CMS content records.
//!
//! Records deserialize straight from the Sanity query projection, so field
//! names follow the CMS (`_id`, `_type`, camelCase). Rich-text fields stay as
//! raw JSON; the renderer decides whether they are well-formed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

const DRAFT_PREFIX: &str = "drafts.";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed CMS document identifier (`_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// The identifier with any `drafts.` prefix removed.
    pub fn published_id(&self) -> &str {
        self.0.strip_prefix(DRAFT_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The two kinds of publishable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "article")]
    Article,
    #[serde(rename = "stockRecommendation", alias = "recommendation")]
    Recommendation,
}

impl ContentKind {
    /// Both kinds in manifest order.
    pub fn all() -> &'static [ContentKind] {
        &[ContentKind::Article, ContentKind::Recommendation]
    }

    /// CMS `_type` value.
    pub fn type_name(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Recommendation => "stockRecommendation",
        }
    }

    /// Output directory and manifest key.
    pub fn plural(&self) -> &'static str {
        match self {
            ContentKind::Article => "articles",
            ContentKind::Recommendation => "recommendations",
        }
    }

    /// Site-relative path of the detail page for `slug`.
    pub fn detail_path(&self, slug: &str) -> String {
        format!("{}/{slug}.html", self.plural())
    }

    /// Site-relative path of the listing page.
    pub fn listing_path(&self) -> String {
        format!("{}/index.html", self.plural())
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(ContentKind::Article),
            "stockRecommendation" | "recommendation" => Ok(ContentKind::Recommendation),
            other => Err(format!(
                "unknown content type '{other}'; expected: article, stockRecommendation"
            )),
        }
    }
}

/// CMS slug field: either a bare string or a `{ current }` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlugField {
    Plain(String),
    Object { current: Option<String> },
}

impl SlugField {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SlugField::Plain(s) => Some(s.as_str()),
            SlugField::Object { current } => current.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Content record
// ---------------------------------------------------------------------------

/// A content record fetched from the CMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(rename = "_type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<SlugField>,
    /// Portable Text blocks (articles).
    #[serde(default)]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub recommendation_type: Option<String>,
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default)]
    pub time_horizon: Option<String>,
    /// Portable Text blocks (recommendations).
    #[serde(default)]
    pub reasons: Option<serde_json::Value>,
}

impl ContentRecord {
    /// Empty record of `kind`; fields are filled in by the caller.
    pub fn new(id: impl Into<DocumentId>, kind: ContentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            slug: None,
            body: None,
            excerpt: None,
            published_at: None,
            ticker: None,
            company_name: None,
            recommendation_type: None,
            target_price: None,
            time_horizon: None,
            reasons: None,
        }
    }

    /// Filename stem and URL segment for this record.
    ///
    /// First non-empty of: slug, ticker, id without `drafts.`, `untitled`.
    pub fn slug(&self) -> String {
        self.slug
            .as_ref()
            .and_then(SlugField::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| non_empty(&self.ticker))
            .or_else(|| Some(self.id.published_id()).filter(|s| !s.is_empty()))
            .unwrap_or("untitled")
            .to_string()
    }

    /// Title shown in listings and page headers.
    pub fn display_title(&self) -> String {
        let title = match self.kind {
            ContentKind::Article => non_empty(&self.title),
            ContentKind::Recommendation => {
                non_empty(&self.company_name).or_else(|| non_empty(&self.ticker))
            }
        };
        title.unwrap_or("Untitled").to_string()
    }

    /// Rich-text field for this record's kind.
    pub fn rich_text(&self) -> Option<&serde_json::Value> {
        match self.kind {
            ContentKind::Article => self.body.as_ref(),
            ContentKind::Recommendation => self.reasons.as_ref(),
        }
    }
}

/// `Some(&str)` only when the option holds a non-empty string.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
