//! `pressroom publish`: incremental publish or full rebuild.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use pressroom_core::ConfigOptions;
use pressroom_publish::{
    open_store, PublishReport, PublishScope, Publisher, SanityClient, SiteStore, WriteResult,
};
use pressroom_renderer::SiteRenderer;

use super::StoreArgs;

/// Arguments for `pressroom publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Sanity project id.
    #[arg(long, env = "SANITY_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Sanity dataset name.
    #[arg(long, env = "SANITY_DATASET")]
    pub dataset: Option<String>,

    /// Sanity read token, for private datasets.
    #[arg(long, env = "SANITY_TOKEN", hide_env_values = true)]
    pub sanity_token: Option<String>,

    /// Sanity API version (defaults to 2024-01-01).
    #[arg(long, env = "SANITY_API_VERSION")]
    pub api_version: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Document to publish. Omit for a full rebuild.
    #[arg(long, env = "DOCUMENT_ID")]
    pub document_id: Option<String>,

    /// `article` or `stockRecommendation`.
    #[arg(long, env = "DOCUMENT_TYPE")]
    pub document_type: Option<String>,

    /// Site title used in page headers.
    #[arg(long, env = "SITE_TITLE")]
    pub site_title: Option<String>,

    /// Link prefix, e.g. `/my-repo`. Derived from the repository when omitted.
    #[arg(long, env = "BASE_PATH")]
    pub base_path: Option<String>,

    /// Directory of `.tera` files overriding the built-in templates.
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Show what would be written without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl PublishArgs {
    fn options(&self) -> ConfigOptions {
        ConfigOptions {
            sanity_project_id: self.project_id.clone(),
            sanity_dataset: self.dataset.clone(),
            sanity_token: self.sanity_token.clone(),
            sanity_api_version: self.api_version.clone(),
            document_id: self.document_id.clone(),
            document_type: self.document_type.clone(),
            site_title: self.site_title.clone(),
            base_path: self.base_path.clone(),
            ..self.store.options()
        }
    }

    pub fn run(self) -> Result<()> {
        let config = self.options().resolve().context("invalid configuration")?;
        if let Some(dir) = &self.templates {
            tracing::info!("template overrides from {}", dir.display());
        }
        let renderer =
            SiteRenderer::new(self.templates.as_deref()).context("failed to load templates")?;
        let source = SanityClient::new(config.source.clone());
        let store = open_store(&config.backend);
        let scope = PublishScope::from_target(config.target.clone());

        let report = Publisher::new(&config, &source, store.as_ref(), &renderer)
            .dry_run(self.dry_run)
            .run(scope.clone())
            .with_context(|| format!("publish failed ({scope})"))?;

        print_report(&report, &store.describe(), self.dry_run);
        Ok(())
    }
}

fn print_report(report: &PublishReport, location: &str, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}{} {} → {location} ({} written, {} unchanged)",
        "✓".green().bold(),
        report.scope,
        report.written(),
        report.unchanged()
    );

    for w in &report.writes {
        match w {
            WriteResult::Written { path } => println!("  ✎  {path}"),
            WriteResult::WouldWrite { path } => println!("  ~  {path}"),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.dimmed()),
        }
    }

    for skipped in &report.skipped {
        println!(
            "  {} skipped {} {}: {}",
            "!".yellow().bold(),
            skipped.kind,
            skipped.id,
            skipped.reason
        );
    }

    println!(
        "Manifest: {} article(s), {} recommendation(s)",
        report.articles, report.recommendations
    );
}
