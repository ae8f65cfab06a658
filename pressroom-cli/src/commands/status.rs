//! `pressroom status`: inspect the published manifest.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use pressroom_core::{timestamp, ContentKind, Manifest, ManifestEntry, MANIFEST_PATH};
use pressroom_publish::{open_store, SiteStore};

use super::StoreArgs;

/// Arguments for `pressroom status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let backend = self
            .store
            .options()
            .resolve_backend()
            .context("invalid configuration")?;
        let store = open_store(&backend);
        let location = store.describe();

        let manifest = match store
            .get(MANIFEST_PATH)
            .with_context(|| format!("failed to read {MANIFEST_PATH} from {location}"))?
        {
            Some(file) => Some(
                Manifest::from_json(&file.content)
                    .with_context(|| format!("{MANIFEST_PATH} on {location} is corrupt"))?,
            ),
            None => None,
        };

        if self.json {
            print_json(&location, manifest.as_ref())?;
            return Ok(());
        }
        print_table(&location, manifest.as_ref());
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson {
    store: String,
    updated_at: Option<String>,
    articles: Vec<EntryJson>,
    recommendations: Vec<EntryJson>,
}

#[derive(Serialize)]
struct EntryJson {
    id: String,
    slug: String,
    title: String,
    path: String,
    published_at: Option<String>,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "slug")]
    slug: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "published")]
    published: String,
}

fn entry_json(kind: ContentKind, entry: &ManifestEntry) -> EntryJson {
    EntryJson {
        id: entry.id.0.clone(),
        slug: entry.slug.clone(),
        title: entry.title.clone(),
        path: kind.detail_path(&entry.slug),
        published_at: entry.published_at.as_ref().map(timestamp::format),
    }
}

fn print_json(location: &str, manifest: Option<&Manifest>) -> Result<()> {
    let entries = |kind: ContentKind| -> Vec<EntryJson> {
        manifest
            .map(|m| {
                m.newest_first(kind)
                    .into_iter()
                    .map(|e| entry_json(kind, e))
                    .collect()
            })
            .unwrap_or_default()
    };
    let report = StatusJson {
        store: location.to_string(),
        updated_at: manifest.map(|m| timestamp::format(&m.updated_at)),
        articles: entries(ContentKind::Article),
        recommendations: entries(ContentKind::Recommendation),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_table(location: &str, manifest: Option<&Manifest>) {
    let Some(manifest) = manifest else {
        println!(
            "{} No {MANIFEST_PATH} at {location}. Run `pressroom publish` to create one.",
            "■".bright_black().bold()
        );
        return;
    };

    println!(
        "{} {location}: {} article(s), {} recommendation(s), updated {}",
        "■".green().bold(),
        manifest.articles.len(),
        manifest.recommendations.len(),
        timestamp::format(&manifest.updated_at)
    );
    if manifest.is_empty() {
        return;
    }

    let rows: Vec<EntryRow> = ContentKind::all()
        .iter()
        .flat_map(|kind| {
            manifest.newest_first(*kind).into_iter().map(move |e| EntryRow {
                kind: kind.plural(),
                slug: e.slug.clone(),
                title: e.title.clone(),
                published: e
                    .published_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "—".to_string()),
            })
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
