//! Publish orchestration shared by every entrypoint.
//!
//! A run walks `Start → {Incremental | FullRebuild} → PagesWritten →
//! ManifestWritten → IndexesWritten → Done`. Any error returned from
//! [`Publisher::run`] aborts the remaining steps; files already written stay.

use std::fmt;

use pressroom_core::{
    ContentKind, ContentRecord, DocumentId, Manifest, PublishTarget, SiteConfig, MANIFEST_PATH,
};
use pressroom_renderer::SiteRenderer;

use crate::error::PublishError;
use crate::source::{ContentSource, SourceError};
use crate::storage::{BackendKind, SiteStore, StoredFile};
use crate::writer::{write_file, write_over, WriteResult};

/// Scope for a publish run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishScope {
    /// Publish one document and refresh the indexes.
    Document(PublishTarget),
    /// Re-render everything the manifest knows about.
    Rebuild,
}

impl PublishScope {
    /// `Document` when a target is configured, `Rebuild` otherwise.
    pub fn from_target(target: Option<PublishTarget>) -> Self {
        target.map_or(PublishScope::Rebuild, PublishScope::Document)
    }
}

impl fmt::Display for PublishScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishScope::Document(target) => write!(f, "{} {}", target.kind, target.id),
            PublishScope::Rebuild => f.write_str("full rebuild"),
        }
    }
}

/// A manifest entry dropped during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub id: DocumentId,
    pub kind: ContentKind,
    pub reason: String,
}

/// What a run did.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub scope: PublishScope,
    pub writes: Vec<WriteResult>,
    pub skipped: Vec<SkippedEntry>,
    /// Entry counts in the manifest as written.
    pub articles: usize,
    pub recommendations: usize,
}

impl PublishReport {
    fn new(scope: PublishScope) -> Self {
        PublishReport {
            scope,
            writes: Vec::new(),
            skipped: Vec::new(),
            articles: 0,
            recommendations: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Written { .. } | WriteResult::WouldWrite { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Unchanged { .. }))
    }

    fn count(&self, pred: impl Fn(&WriteResult) -> bool) -> usize {
        self.writes.iter().filter(|w| pred(w)).count()
    }
}

/// Drives incremental publishes and full rebuilds.
pub struct Publisher<'a> {
    config: &'a SiteConfig,
    source: &'a dyn ContentSource,
    store: &'a dyn SiteStore,
    renderer: &'a SiteRenderer,
    dry_run: bool,
}

impl<'a> Publisher<'a> {
    pub fn new(
        config: &'a SiteConfig,
        source: &'a dyn ContentSource,
        store: &'a dyn SiteStore,
        renderer: &'a SiteRenderer,
    ) -> Self {
        Publisher {
            config,
            source,
            store,
            renderer,
            dry_run: false,
        }
    }

    /// Report writes without performing them.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the pipeline for `scope`.
    pub fn run(&self, scope: PublishScope) -> Result<PublishReport, PublishError> {
        tracing::info!("publishing {scope} to {}", self.store.describe());
        let mut report = PublishReport::new(scope.clone());

        let manifest = match &scope {
            PublishScope::Document(target) => self.publish_document(target, &mut report)?,
            PublishScope::Rebuild => self.rebuild(&mut report)?,
        };

        for (path, content) in self.renderer.render_indexes(&manifest, &self.config.site)? {
            report
                .writes
                .push(write_file(self.store, &path, &content, self.dry_run)?);
        }

        report.articles = manifest.entries(ContentKind::Article).len();
        report.recommendations = manifest.entries(ContentKind::Recommendation).len();
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Incremental publish
    // -----------------------------------------------------------------------

    fn publish_document(
        &self,
        target: &PublishTarget,
        report: &mut PublishReport,
    ) -> Result<Manifest, PublishError> {
        let record = self.source.fetch_one(&target.id).map_err(|err| match err {
            SourceError::NotFound { id } => PublishError::NotFound { id },
            other => PublishError::Source(other),
        })?;
        if record.kind != target.kind {
            tracing::warn!(
                "{} is a {}, not a {}; publishing as {}",
                target.id,
                record.kind,
                target.kind,
                record.kind
            );
        }

        let (mut manifest, stored) = match self.load_manifest()? {
            Some((manifest, stored)) => (manifest, Some(stored)),
            None => {
                tracing::warn!("{MANIFEST_PATH} not found, it will be created");
                (Manifest::empty(), None)
            }
        };
        let outcome = manifest.merge(&record);
        tracing::debug!("merged {} into manifest: {outcome:?}", record.id);

        let html = self.renderer.render_document(&record, &self.config.site)?;
        report.writes.push(write_file(
            self.store,
            &record.kind.detail_path(&record.slug()),
            &html,
            self.dry_run,
        )?);

        self.write_manifest(&manifest, stored.as_ref(), report)?;
        Ok(manifest)
    }

    // -----------------------------------------------------------------------
    // Full rebuild
    // -----------------------------------------------------------------------

    fn rebuild(&self, report: &mut PublishReport) -> Result<Manifest, PublishError> {
        let mut fresh = Manifest::empty();

        let stored = match self.load_manifest()? {
            Some((previous, stored)) => {
                for kind in ContentKind::all() {
                    for entry in previous.entries(*kind) {
                        match self.source.fetch_one(&entry.id) {
                            Ok(record) => self.republish(&record, &mut fresh, report)?,
                            Err(err) => skip(report, entry.id.clone(), *kind, err.to_string()),
                        }
                    }
                }
                Some(stored)
            }
            None if self.store.kind() == BackendKind::Local => {
                tracing::info!("{MANIFEST_PATH} not found, building from every published record");
                for record in self.fetch_everything()? {
                    self.republish(&record, &mut fresh, report)?;
                }
                None
            }
            None => {
                tracing::warn!(
                    "{MANIFEST_PATH} not found on {}; remote rebuild from scratch is not supported, \
                     writing an empty site index",
                    self.store.describe()
                );
                None
            }
        };

        self.write_manifest(&fresh, stored.as_ref(), report)?;
        Ok(fresh)
    }

    /// Render, write and merge one record. Render failures skip the record;
    /// storage failures abort the run.
    fn republish(
        &self,
        record: &ContentRecord,
        manifest: &mut Manifest,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let html = match self.renderer.render_document(record, &self.config.site) {
            Ok(html) => html,
            Err(err) => {
                skip(report, record.id.clone(), record.kind, err.to_string());
                return Ok(());
            }
        };
        report.writes.push(write_file(
            self.store,
            &record.kind.detail_path(&record.slug()),
            &html,
            self.dry_run,
        )?);
        manifest.merge(record);
        Ok(())
    }

    /// Both kinds, queried concurrently.
    fn fetch_everything(&self) -> Result<Vec<ContentRecord>, PublishError> {
        let source = self.source;
        let (articles, recommendations) = std::thread::scope(|s| {
            let articles = s.spawn(|| source.fetch_all(ContentKind::Article));
            let recommendations = s.spawn(|| source.fetch_all(ContentKind::Recommendation));
            (
                articles.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
                recommendations
                    .join()
                    .unwrap_or_else(|e| std::panic::resume_unwind(e)),
            )
        });
        let mut records = articles?;
        records.extend(recommendations?);
        Ok(records)
    }

    // -----------------------------------------------------------------------
    // Manifest I/O
    // -----------------------------------------------------------------------

    fn load_manifest(&self) -> Result<Option<(Manifest, StoredFile)>, PublishError> {
        match self.store.get(MANIFEST_PATH)? {
            Some(stored) => {
                let manifest = Manifest::from_json(&stored.content)?;
                Ok(Some((manifest, stored)))
            }
            None => Ok(None),
        }
    }

    /// Written over the run's initial read so a concurrent update conflicts.
    fn write_manifest(
        &self,
        manifest: &Manifest,
        stored: Option<&StoredFile>,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let json = manifest.to_json_pretty()?;
        report
            .writes
            .push(write_over(self.store, MANIFEST_PATH, &json, stored, self.dry_run)?);
        Ok(())
    }
}

fn skip(report: &mut PublishReport, id: DocumentId, kind: ContentKind, reason: String) {
    tracing::warn!("skipping {kind} {id}: {reason}");
    report.skipped.push(SkippedEntry { id, kind, reason });
}
