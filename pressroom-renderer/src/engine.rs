//! Tera rendering engine: the [`Page`] enum, [`TemplateEngine`] and [`SiteRenderer`].
//!
//! # Output layout
//!
//! | Page           | Output path                    |
//! |----------------|--------------------------------|
//! | Article        | `articles/<slug>.html`         |
//! | Recommendation | `recommendations/<slug>.html`  |
//! | Listing        | `<kind-plural>/index.html`     |
//! | Home           | `index.html`                   |
//! | Stylesheet     | `styles.css` (static)          |

use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Tera;

use pressroom_core::{ContentKind, ContentRecord, Manifest, SiteMeta};

use crate::context::{ArticleCtx, HomeCtx, ListingCtx, PageContext, RecommendationCtx};
use crate::error::RenderError;
use crate::escape::escape_html;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("shared/_layout.html.tera", include_str!("templates/_partials/layout.html.tera")),
    ("shared/_nav.html.tera", include_str!("templates/_partials/nav.html.tera")),
    ("pages/article.html.tera", include_str!("templates/article.html.tera")),
    (
        "pages/recommendation.html.tera",
        include_str!("templates/recommendation.html.tera"),
    ),
    ("pages/listing.html.tera", include_str!("templates/listing.html.tera")),
    ("pages/index.html.tera", include_str!("templates/index.html.tera")),
];

/// Shared stylesheet written to `styles.css`.
pub const STYLESHEET: &str = include_str!("templates/styles.css");

pub const STYLESHEET_PATH: &str = "styles.css";
pub const HOME_PATH: &str = "index.html";

// ---------------------------------------------------------------------------
// Template overrides
// ---------------------------------------------------------------------------

/// Replacement sources for embedded templates, keyed by embedded name.
///
/// A file under the override directory replaces the embedded template with
/// the same relative path (`pages/article.html.tera`). Files that match no
/// embedded template are logged and ignored.
#[derive(Debug, Default)]
struct TemplateOverrides {
    sources: Vec<(&'static str, String)>,
}

impl TemplateOverrides {
    fn load(dir: &Path) -> Result<Self, RenderError> {
        let mut overrides = TemplateOverrides::default();
        if !dir.is_dir() {
            tracing::debug!("no template directory at {}", dir.display());
            return Ok(overrides);
        }

        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            let entries = std::fs::read_dir(&current).map_err(|source| RenderError::Io {
                path: current.clone(),
                source,
            })?;
            for entry in entries {
                let path = entry
                    .map_err(|source| RenderError::Io {
                        path: current.clone(),
                        source,
                    })?
                    .path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    overrides.add(dir, path)?;
                }
            }
        }
        Ok(overrides)
    }

    fn add(&mut self, dir: &Path, path: PathBuf) -> Result<(), RenderError> {
        let relative = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let Some(&(embedded, _)) = TPLS.iter().find(|(known, _)| *known == name) else {
            tracing::warn!("ignoring {}: no embedded template named '{name}'", path.display());
            return Ok(());
        };
        let source = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("template override: {embedded}");
        self.sources.push((embedded, source));
        Ok(())
    }

    fn source_for(&self, name: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .map(|(_, source)| source.as_str())
    }
}

fn build_tera(overrides: &TemplateOverrides) -> Result<Tera, RenderError> {
    let templates = TPLS.iter().map(|(name, embedded)| {
        let source = overrides.source_for(name).unwrap_or(*embedded);
        (*name, source)
    });

    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html.tera", ".html"]);
    tera.set_escape_fn(escape_html);
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Every templated page the site is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Article,
    Recommendation,
    Listing,
    Home,
}

impl Page {
    pub fn all() -> &'static [Page] {
        &[Page::Article, Page::Recommendation, Page::Listing, Page::Home]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            Page::Article => "pages/article.html.tera",
            Page::Recommendation => "pages/recommendation.html.tera",
            Page::Listing => "pages/listing.html.tera",
            Page::Home => "pages/index.html.tera",
        }
    }

    /// Detail page template for `kind`.
    pub fn detail(kind: ContentKind) -> Page {
        match kind {
            ContentKind::Article => Page::Article,
            ContentKind::Recommendation => Page::Recommendation,
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine for rendering templates with optional user overrides.
///
/// `user_template_dir` may hold replacements for embedded templates, named by
/// relative path (e.g. `pages/article.html.tera`, `shared/_nav.html.tera`).
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let overrides = match user_template_dir {
            Some(dir) => TemplateOverrides::load(dir)?,
            None => TemplateOverrides::default(),
        };
        let tera = build_tera(&overrides)?;
        Ok(TemplateEngine { tera })
    }

    /// Render `page` with `ctx` as the root context.
    pub fn render<T: Serialize>(
        &self,
        page: Page,
        ctx: &PageContext<T>,
    ) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(page.template_name(), &tera_ctx)?)
    }
}

// ---------------------------------------------------------------------------
// SiteRenderer
// ---------------------------------------------------------------------------

/// Renders detail pages and site indexes. Pure: no I/O after construction.
pub struct SiteRenderer {
    engine: TemplateEngine,
}

impl SiteRenderer {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(SiteRenderer {
            engine: TemplateEngine::new(user_template_dir)?,
        })
    }

    /// Detail page HTML for one record.
    pub fn render_document(
        &self,
        record: &ContentRecord,
        site: &SiteMeta,
    ) -> Result<String, RenderError> {
        let page = Page::detail(record.kind);
        match record.kind {
            ContentKind::Article => self
                .engine
                .render(page, &PageContext::new(site, ArticleCtx::from_record(record))),
            ContentKind::Recommendation => self.engine.render(
                page,
                &PageContext::new(site, RecommendationCtx::from_record(record)),
            ),
        }
    }

    /// Listing page for one kind, newest first.
    pub fn render_listing(
        &self,
        manifest: &Manifest,
        kind: ContentKind,
        site: &SiteMeta,
    ) -> Result<String, RenderError> {
        let ctx = PageContext::new(site, ListingCtx::from_manifest(manifest, kind, site));
        self.engine.render(Page::Listing, &ctx)
    }

    /// Home page with the most recent recommendations.
    pub fn render_home(&self, manifest: &Manifest, site: &SiteMeta) -> Result<String, RenderError> {
        let ctx = PageContext::new(site, HomeCtx::from_manifest(manifest, site));
        self.engine.render(Page::Home, &ctx)
    }

    /// Every manifest-derived file: both listings, the home page, the stylesheet.
    ///
    /// Returns `Vec<(site_relative_path, content)>` in write order.
    pub fn render_indexes(
        &self,
        manifest: &Manifest,
        site: &SiteMeta,
    ) -> Result<Vec<(String, String)>, RenderError> {
        let mut out = Vec::with_capacity(4);
        for kind in ContentKind::all() {
            out.push((kind.listing_path(), self.render_listing(manifest, *kind, site)?));
        }
        out.push((HOME_PATH.to_string(), self.render_home(manifest, site)?));
        out.push((STYLESHEET_PATH.to_string(), STYLESHEET.to_string()));
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
