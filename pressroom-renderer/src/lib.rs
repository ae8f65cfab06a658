//! # pressroom-renderer
//!
//! Tera-based renderer that turns CMS records and the site manifest into
//! static HTML pages.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pressroom_core::{Manifest, SiteMeta};
//! use pressroom_renderer::SiteRenderer;
//!
//! fn render_indexes(manifest: &Manifest, site: &SiteMeta) {
//!     if let Ok(renderer) = SiteRenderer::new(None) {
//!         if let Ok(outputs) = renderer.render_indexes(manifest, site) {
//!             for (path, content) in outputs {
//!                 println!("{}: {} bytes", path, content.len());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod escape;
pub mod format;
pub mod rich_text;

pub use context::{PageContext, HOME_RECOMMENDATION_LIMIT};
pub use engine::{Page, SiteRenderer, TemplateEngine, HOME_PATH, STYLESHEET, STYLESHEET_PATH};
pub use error::{RenderError, RichTextError};
pub use escape::escape_html;
