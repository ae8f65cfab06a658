//! GitHub contents API and Sanity query API against a local mock server.

use pressroom_core::config::{GitHubTarget, Repository, SourceConfig};
use pressroom_core::{ContentKind, DocumentId};
use pressroom_publish::{
    ContentSource, GitHubStore, RevisionToken, SanityClient, SiteStore, SourceError,
    StorageError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTENTS: &str = "/repos/octo/picks/contents";
const QUERY: &str = "/v2024-01-01/data/query/production";

fn github(server: &MockServer) -> GitHubStore {
    GitHubStore::with_base_url(
        GitHubTarget {
            repository: Repository {
                owner: "octo".to_string(),
                name: "picks".to_string(),
            },
            token: "secret".to_string(),
            branch: "gh-pages".to_string(),
        },
        server.uri(),
    )
}

fn sanity(server: &MockServer, token: Option<&str>) -> SanityClient {
    SanityClient::with_base_url(
        SourceConfig {
            project_id: "abc123".to_string(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            token: token.map(str::to_string),
        },
        server.uri(),
    )
}

/// ureq blocks, so every call leaves the async test runtime.
async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn github_missing_file_reads_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{CONTENTS}/manifest.json")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = github(&server);
    let file = blocking(move || store.get("manifest.json")).await.unwrap();
    assert!(file.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn github_get_reads_branch_and_returns_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{CONTENTS}/articles/index.html")))
        .and(query_param("ref", "gh-pages"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sha": "abc123",
            "content": "PHA+aGk8\nL3A+\n",
            "encoding": "base64"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = github(&server);
    let file = blocking(move || store.get("articles/index.html"))
        .await
        .unwrap()
        .expect("stored file");
    assert_eq!(file.content, "<p>hi</p>");
    assert_eq!(file.token, Some(RevisionToken("abc123".to_string())));
}

#[tokio::test(flavor = "multi_thread")]
async fn github_put_echoes_sha_and_branch() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{CONTENTS}/index.html")))
        .and(body_partial_json(json!({
            "sha": "abc123",
            "branch": "gh-pages",
            "content": "aGVsbG8="
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = github(&server);
    blocking(move || store.put("index.html", "hello", Some(&RevisionToken("abc123".to_string()))))
        .await
        .expect("put accepted");
}

#[tokio::test(flavor = "multi_thread")]
async fn github_stale_sha_is_a_conflict() {
    for status in [409, 422] {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{CONTENTS}/manifest.json")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let store = github(&server);
        let err = blocking(move || {
            store.put("manifest.json", "{}", Some(&RevisionToken("old".to_string())))
        })
        .await
        .unwrap_err();
        assert!(
            matches!(err, StorageError::Conflict { ref path } if path == "manifest.json"),
            "status {status}: {err:?}"
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn github_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let store = github(&server);
    let err = blocking(move || store.get("index.html")).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Http { status: 502, ref body, .. } if body == "bad gateway"
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn github_encodes_reserved_characters_in_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{CONTENTS}/articles/a%23b%3Fc.html")))
        .and(query_param("ref", "gh-pages"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let store = github(&server);
    let file = blocking(move || store.get("articles/a#b?c.html")).await.unwrap();
    assert!(file.is_none());
}

// ---------------------------------------------------------------------------
// Sanity
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn sanity_null_result_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("$id", r#""r1""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
        .expect(1)
        .mount(&server)
        .await;

    let client = sanity(&server, None);
    let err = blocking(move || client.fetch_one(&DocumentId::from("drafts.r1")))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::NotFound { ref id } if id.0 == "drafts.r1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn sanity_fetch_one_sends_token_and_parses_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(header("Authorization", "Bearer sk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "_id": "r1",
                "_type": "stockRecommendation",
                "ticker": "ACME",
                "companyName": "Acme Corp",
                "targetPrice": 1250.5
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = sanity(&server, Some("sk"));
    let record = blocking(move || client.fetch_one(&DocumentId::from("r1")))
        .await
        .unwrap();
    assert_eq!(record.kind, ContentKind::Recommendation);
    assert_eq!(record.ticker.as_deref(), Some("ACME"));
    assert_eq!(record.target_price, Some(1250.5));
}

#[tokio::test(flavor = "multi_thread")]
async fn sanity_fetch_all_filters_by_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .and(query_param("$type", r#""article""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                {"_id": "a1", "_type": "article", "title": "One"},
                {"_id": "a2", "_type": "article", "title": "Two"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = sanity(&server, None);
    let records = blocking(move || client.fetch_all(ContentKind::Article))
        .await
        .unwrap();
    let titles: Vec<_> = records.iter().filter_map(|r| r.title.as_deref()).collect();
    assert_eq!(titles, vec!["One", "Two"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn sanity_http_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = sanity(&server, None);
    let err = blocking(move || client.fetch_all(ContentKind::Recommendation))
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Http { status: 500, ref body } if body == "boom"));
}
