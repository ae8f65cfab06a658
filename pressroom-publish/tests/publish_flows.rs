use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use pressroom_core::config::SourceConfig;
use pressroom_core::{
    Backend, ContentKind, ContentRecord, DocumentId, Manifest, ManifestEntry, PublishTarget,
    SiteConfig, SiteMeta, SlugField, MANIFEST_PATH,
};
use pressroom_publish::{
    ContentSource, LocalStore, MemoryStore, PublishError, PublishScope, Publisher, SiteStore,
    SourceError, StorageError, WriteResult,
};
use pressroom_renderer::SiteRenderer;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct FakeSource {
    records: Vec<ContentRecord>,
    fetch_all_calls: AtomicUsize,
}

impl FakeSource {
    fn new(records: Vec<ContentRecord>) -> Self {
        FakeSource {
            records,
            fetch_all_calls: AtomicUsize::new(0),
        }
    }
}

impl ContentSource for FakeSource {
    fn fetch_one(&self, id: &DocumentId) -> Result<ContentRecord, SourceError> {
        self.records
            .iter()
            .find(|r| r.id.published_id() == id.published_id())
            .cloned()
            .ok_or_else(|| SourceError::NotFound { id: id.clone() })
    }

    fn fetch_all(&self, kind: ContentKind) -> Result<Vec<ContentRecord>, SourceError> {
        self.fetch_all_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.iter().filter(|r| r.kind == kind).cloned().collect())
    }
}

/// Rewrites the stored manifest on every fetch, like a second publisher
/// racing this one.
struct RacingSource<'s> {
    inner: FakeSource,
    store: &'s MemoryStore,
}

impl ContentSource for RacingSource<'_> {
    fn fetch_one(&self, id: &DocumentId) -> Result<ContentRecord, SourceError> {
        let mut theirs = Manifest::empty();
        theirs.merge(&article("intruder", "intruder", "Theirs", None));
        self.store
            .insert(MANIFEST_PATH, &theirs.to_json_pretty().unwrap());
        self.inner.fetch_one(id)
    }

    fn fetch_all(&self, kind: ContentKind) -> Result<Vec<ContentRecord>, SourceError> {
        self.inner.fetch_all(kind)
    }
}

fn config() -> SiteConfig {
    SiteConfig {
        site: SiteMeta {
            title: "LongTermPicksUSA".to_string(),
            base_path: String::new(),
        },
        source: SourceConfig {
            project_id: "proj".to_string(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            token: None,
        },
        backend: Backend::Local {
            root: "site".into(),
        },
        target: None,
    }
}

fn article(id: &str, slug: &str, title: &str, day: Option<u32>) -> ContentRecord {
    let mut record = ContentRecord::new(id, ContentKind::Article);
    record.slug = Some(SlugField::Plain(slug.to_string()));
    record.title = Some(title.to_string());
    record.published_at = day.map(|d| Utc.with_ymd_and_hms(2024, 5, d, 8, 0, 0).unwrap());
    record
}

fn recommendation(id: &str, ticker: &str) -> ContentRecord {
    let mut record = ContentRecord::new(id, ContentKind::Recommendation);
    record.ticker = Some(ticker.to_string());
    record.company_name = Some(format!("{ticker} Inc"));
    record.recommendation_type = Some("Buy".to_string());
    record.target_price = Some(250.0);
    record
}

fn document(id: &str, kind: ContentKind) -> PublishScope {
    PublishScope::Document(PublishTarget {
        id: DocumentId::from(id),
        kind,
    })
}

fn seeded_manifest(records: &[ContentRecord]) -> String {
    let mut manifest = Manifest::empty();
    for record in records {
        manifest.merge(record);
    }
    manifest.to_json_pretty().unwrap()
}

fn stored_manifest(store: &dyn SiteStore) -> Manifest {
    let file = store.get(MANIFEST_PATH).unwrap().expect("manifest written");
    Manifest::from_json(&file.content).unwrap()
}

// ---------------------------------------------------------------------------
// Incremental publish
// ---------------------------------------------------------------------------

#[test]
fn incremental_publish_writes_page_manifest_and_indexes() {
    let record = article("a1", "hello-world", "Hello World", Some(3));
    let source = FakeSource::new(vec![record.clone()]);
    let store = MemoryStore::remote();
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();

    let report = Publisher::new(&config, &source, &store, &renderer)
        .run(document("a1", ContentKind::Article))
        .expect("publish");

    assert_eq!(
        store.paths(),
        vec![
            "articles/hello-world.html",
            "articles/index.html",
            "index.html",
            "manifest.json",
            "recommendations/index.html",
            "styles.css",
        ]
    );
    assert_eq!(report.written(), 6);
    assert_eq!((report.articles, report.recommendations), (1, 0));

    // Round trip: the stored entry is exactly the record's projection.
    let manifest = stored_manifest(&store);
    assert_eq!(manifest.articles, vec![ManifestEntry::from_record(&record)]);

    let listing = store.contents("articles/index.html").unwrap();
    assert!(listing.contains(r#"<a href="/articles/hello-world.html">Hello World</a>"#));
}

#[test]
fn republishing_replaces_entry_and_skips_unchanged_pages() {
    let source = FakeSource::new(vec![recommendation("r1", "ACME")]);
    let store = MemoryStore::remote();
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();
    let publisher = Publisher::new(&config, &source, &store, &renderer);

    publisher.run(document("r1", ContentKind::Recommendation)).unwrap();
    let second = publisher
        .run(document("drafts.r1", ContentKind::Recommendation))
        .unwrap();

    assert_eq!(stored_manifest(&store).recommendations.len(), 1);
    let detail = second
        .writes
        .iter()
        .find(|w| w.path() == "recommendations/ACME.html")
        .expect("detail write");
    assert!(matches!(detail, WriteResult::Unchanged { .. }));
    assert!(matches!(
        second.writes.iter().find(|w| w.path() == "styles.css"),
        Some(WriteResult::Unchanged { .. })
    ));
}

#[test]
fn unknown_document_is_fatal() {
    let source = FakeSource::new(vec![]);
    let store = MemoryStore::remote();
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();

    let err = Publisher::new(&config, &source, &store, &renderer)
        .run(document("missing", ContentKind::Article))
        .unwrap_err();
    assert!(matches!(err, PublishError::NotFound { ref id } if id.0 == "missing"));
    assert_eq!(store.put_count(), 0);
}

#[test]
fn dry_run_writes_nothing() {
    let source = FakeSource::new(vec![article("a1", "a", "A", None)]);
    let store = MemoryStore::remote();
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();

    let report = Publisher::new(&config, &source, &store, &renderer)
        .dry_run(true)
        .run(document("a1", ContentKind::Article))
        .unwrap();

    assert_eq!(store.put_count(), 0);
    assert!(report
        .writes
        .iter()
        .all(|w| matches!(w, WriteResult::WouldWrite { .. })));
}

// ---------------------------------------------------------------------------
// Full rebuild
// ---------------------------------------------------------------------------

#[test]
fn rebuild_drops_entries_that_cannot_be_fetched() {
    let kept = article("a1", "kept", "Kept", Some(1));
    let gone = article("a2", "gone", "Gone", Some(2));
    let rec = recommendation("r1", "ACME");
    let store = MemoryStore::remote().with_file(
        MANIFEST_PATH,
        &seeded_manifest(&[kept.clone(), gone, rec.clone()]),
    );
    let source = FakeSource::new(vec![kept, rec]);
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();

    let report = Publisher::new(&config, &source, &store, &renderer)
        .run(PublishScope::Rebuild)
        .expect("rebuild completes");

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, DocumentId::from("a2"));
    assert_eq!((report.articles, report.recommendations), (1, 1));

    let manifest = stored_manifest(&store);
    let slugs: Vec<&str> = manifest.articles.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["kept"]);
    assert!(store.contents("recommendations/ACME.html").is_some());
}

#[test]
fn concurrent_manifest_change_is_a_conflict() {
    let record = article("a1", "mine", "Mine", Some(1));
    let store = MemoryStore::remote().with_file(MANIFEST_PATH, &seeded_manifest(&[record.clone()]));
    let source = RacingSource {
        inner: FakeSource::new(vec![record]),
        store: &store,
    };
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();

    let err = Publisher::new(&config, &source, &store, &renderer)
        .run(PublishScope::Rebuild)
        .unwrap_err();
    assert!(matches!(
        err,
        PublishError::Storage(StorageError::Conflict { ref path }) if path == MANIFEST_PATH
    ));

    // The other writer's manifest survives.
    assert_eq!(stored_manifest(&store).articles[0].slug, "intruder");
}

#[test]
fn local_rebuild_without_manifest_fetches_everything() {
    let source = FakeSource::new(vec![
        article("a1", "one", "One", Some(1)),
        article("a2", "two", "Two", Some(2)),
        recommendation("r1", "ACME"),
    ]);
    let store = MemoryStore::local();
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();

    let report = Publisher::new(&config, &source, &store, &renderer)
        .run(PublishScope::Rebuild)
        .unwrap();

    assert_eq!(source.fetch_all_calls.load(Ordering::SeqCst), 2);
    assert_eq!((report.articles, report.recommendations), (2, 1));
    for path in ["articles/one.html", "articles/two.html", "recommendations/ACME.html"] {
        assert!(store.contents(path).is_some(), "{path} missing");
    }
}

#[test]
fn remote_rebuild_without_manifest_writes_empty_site() {
    let source = FakeSource::new(vec![article("a1", "one", "One", None)]);
    let store = MemoryStore::remote();
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();

    let report = Publisher::new(&config, &source, &store, &renderer)
        .run(PublishScope::Rebuild)
        .unwrap();

    assert_eq!(source.fetch_all_calls.load(Ordering::SeqCst), 0);
    assert!(stored_manifest(&store).is_empty());
    assert_eq!(report.written(), 5);
    assert!(store
        .contents("index.html")
        .unwrap()
        .contains("No recommendations yet."));
}

// ---------------------------------------------------------------------------
// Local directory backend
// ---------------------------------------------------------------------------

#[test]
fn publish_into_local_directory() {
    let tmp = TempDir::new().unwrap();
    let store = LocalStore::new(tmp.path());
    let source = FakeSource::new(vec![recommendation("r1", "ACME")]);
    let renderer = SiteRenderer::new(None).unwrap();
    let config = config();

    Publisher::new(&config, &source, &store, &renderer)
        .run(document("r1", ContentKind::Recommendation))
        .unwrap();

    let home = std::fs::read_to_string(tmp.path().join("index.html")).unwrap();
    assert!(home.contains(r#"<a href="/recommendations/ACME.html">ACME</a>"#));
    assert!(home.contains("$250"));
    assert!(tmp.path().join("styles.css").exists());

    let manifest = stored_manifest(&store);
    assert_eq!(manifest.recommendations[0].ticker.as_deref(), Some("ACME"));
}
