//! Template contexts: serializable page payloads built from records and the manifest.
//!
//! Every template receives `{ site, page }`. Values are pre-formatted here so
//! templates only interpolate; escaping happens in tera.

use serde::Serialize;

use pressroom_core::{
    timestamp,
    types::non_empty,
    ContentKind, ContentRecord, Manifest, ManifestEntry, SiteMeta,
};

use crate::format::{grouped_number, plain_number, us_date, EM_DASH};
use crate::rich_text;

/// Home-page recommendation table size.
pub const HOME_RECOMMENDATION_LIMIT: usize = 10;

/// Shared site payload.
#[derive(Debug, Clone, Serialize)]
pub struct SiteCtx {
    pub title: String,
    pub base_path: String,
}

impl SiteCtx {
    pub fn from_meta(site: &SiteMeta) -> Self {
        SiteCtx {
            title: site.title.clone(),
            base_path: site.base_path.clone(),
        }
    }

    fn href(&self, kind: ContentKind, slug: &str) -> String {
        format!("{}/{}", self.base_path, kind.detail_path(slug))
    }
}

/// Root object handed to tera.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext<T: Serialize> {
    pub site: SiteCtx,
    pub page: T,
}

impl<T: Serialize> PageContext<T> {
    pub fn new(site: &SiteMeta, page: T) -> Self {
        PageContext {
            site: SiteCtx::from_meta(site),
            page,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, tera::Error> {
        tera::Context::from_serialize(self)
    }
}

// ---------------------------------------------------------------------------
// Detail pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ArticleCtx {
    pub title: String,
    pub excerpt: String,
    /// ISO timestamp for `<meta name="date">`.
    pub published: Option<String>,
    /// Trusted HTML; rendered with `| safe`.
    pub body_html: String,
}

impl ArticleCtx {
    pub fn from_record(record: &ContentRecord) -> Self {
        ArticleCtx {
            title: record.display_title(),
            excerpt: non_empty(&record.excerpt).unwrap_or_default().to_string(),
            published: record.published_at.as_ref().map(timestamp::format),
            body_html: rich_text::render_or_plain(record.rich_text()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationCtx {
    pub title: String,
    pub ticker: String,
    pub recommendation_type: String,
    pub target_price: Option<String>,
    pub time_horizon: String,
    pub published: Option<String>,
    /// Trusted HTML; rendered with `| safe`.
    pub reasons_html: String,
}

impl RecommendationCtx {
    pub fn from_record(record: &ContentRecord) -> Self {
        let text = |value: &Option<String>| non_empty(value).unwrap_or_default().to_string();
        RecommendationCtx {
            title: record.display_title(),
            ticker: text(&record.ticker),
            recommendation_type: text(&record.recommendation_type),
            target_price: record.target_price.map(plain_number),
            time_horizon: text(&record.time_horizon),
            published: record.published_at.as_ref().map(timestamp::format),
            reasons_html: rich_text::render_or_plain(record.rich_text()),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ListingItem {
    pub title: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingCtx {
    pub heading: &'static str,
    pub items: Vec<ListingItem>,
}

impl ListingCtx {
    pub fn from_manifest(manifest: &Manifest, kind: ContentKind, site: &SiteMeta) -> Self {
        let site = SiteCtx::from_meta(site);
        let items = manifest
            .newest_first(kind)
            .into_iter()
            .map(|entry| ListingItem {
                title: entry.title.clone(),
                href: site.href(kind, &entry.slug),
            })
            .collect();
        ListingCtx {
            heading: listing_heading(kind),
            items,
        }
    }
}

pub fn listing_heading(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Article => "Articles",
        ContentKind::Recommendation => "Stock Recommendations",
    }
}

// ---------------------------------------------------------------------------
// Home page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HomeRow {
    pub ticker: String,
    pub company: String,
    pub recommendation_type: String,
    pub badge_class: &'static str,
    pub date: String,
    pub target_price: String,
    pub time_horizon: String,
    pub href: String,
}

impl HomeRow {
    fn from_entry(entry: &ManifestEntry, site: &SiteCtx) -> Self {
        let or_dash = |value: &Option<String>| non_empty(value).unwrap_or(EM_DASH).to_string();
        let badge_class = match entry
            .recommendation_type
            .as_deref()
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("buy") => "badge-buy",
            Some("sell") => "badge-sell",
            _ => "badge-neutral",
        };
        HomeRow {
            ticker: or_dash(&entry.ticker),
            company: if entry.title.is_empty() {
                EM_DASH.to_string()
            } else {
                entry.title.clone()
            },
            recommendation_type: or_dash(&entry.recommendation_type),
            badge_class,
            date: entry
                .published_at
                .as_ref()
                .map(us_date)
                .unwrap_or_else(|| EM_DASH.to_string()),
            target_price: entry
                .target_price
                .map(|p| format!("${}", grouped_number(p)))
                .unwrap_or_else(|| EM_DASH.to_string()),
            time_horizon: or_dash(&entry.time_horizon),
            href: site.href(ContentKind::Recommendation, &entry.slug),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeCtx {
    pub rows: Vec<HomeRow>,
}

impl HomeCtx {
    pub fn from_manifest(manifest: &Manifest, site: &SiteMeta) -> Self {
        let site = SiteCtx::from_meta(site);
        let rows = manifest
            .newest_first(ContentKind::Recommendation)
            .into_iter()
            .take(HOME_RECOMMENDATION_LIMIT)
            .map(|entry| HomeRow::from_entry(entry, &site))
            .collect();
        HomeCtx { rows }
    }
}
