//! GitHub contents API [`SiteStore`].
//!
//! Every file lives on a single branch (`gh-pages` by default). Reads return
//! the blob sha as the revision token; writes must send it back to replace an
//! existing file. GitHub answers a stale or missing sha with 409 or 422.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;

use pressroom_core::config::GitHubTarget;

use crate::storage::{BackendKind, RevisionToken, SiteStore, StorageError, StoredFile};

const API_BASE: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("pressroom/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

pub struct GitHubStore {
    agent: ureq::Agent,
    target: GitHubTarget,
    api_base: String,
}

impl GitHubStore {
    pub fn new(target: GitHubTarget) -> Self {
        Self::with_base_url(target, API_BASE)
    }

    /// Talk to a contents API served from `api_base` (GitHub Enterprise, tests).
    pub fn with_base_url(target: GitHubTarget, api_base: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        GitHubStore {
            agent,
            target,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Each path segment is percent-encoded so `#` or `?` in a slug stays in the path.
    fn contents_url(&self, path: &str) -> String {
        let encoded: Vec<_> = path
            .trim_start_matches('/')
            .split('/')
            .map(urlencoding::encode)
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            self.target.repository.owner,
            self.target.repository.name,
            encoded.join("/")
        )
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.target.token)
    }

    fn map_error(path: &str, err: ureq::Error) -> StorageError {
        match err {
            ureq::Error::Status(409 | 422, _) => StorageError::Conflict {
                path: path.to_string(),
            },
            ureq::Error::Status(status, response) => StorageError::Http {
                path: path.to_string(),
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => StorageError::Transport {
                path: path.to_string(),
                source: Box::new(transport),
            },
        }
    }
}

/// Decode a contents API payload. GitHub wraps base64 at 60 columns.
fn decode_content(path: &str, body: &ContentsResponse) -> Result<String, StorageError> {
    let decode_err = |reason: String| StorageError::Decode {
        path: path.to_string(),
        reason,
    };
    if let Some(encoding) = body.encoding.as_deref() {
        if encoding != "base64" {
            return Err(decode_err(format!("unsupported encoding '{encoding}'")));
        }
    }
    let compact: String = body
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| decode_err(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| decode_err(e.to_string()))
}

impl SiteStore for GitHubStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn get(&self, path: &str) -> Result<Option<StoredFile>, StorageError> {
        let response = match self
            .agent
            .get(&self.contents_url(path))
            .set("Accept", ACCEPT)
            .set("Authorization", &self.authorization())
            .set("User-Agent", USER_AGENT)
            .query("ref", &self.target.branch)
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(err) => return Err(Self::map_error(path, err)),
        };
        let body: ContentsResponse = response.into_json().map_err(|e| StorageError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let content = decode_content(path, &body)?;
        Ok(Some(StoredFile {
            content,
            token: Some(RevisionToken(body.sha)),
        }))
    }

    fn put(
        &self,
        path: &str,
        content: &str,
        token: Option<&RevisionToken>,
    ) -> Result<(), StorageError> {
        let mut body = json!({
            "message": format!("Publish: {path}"),
            "content": STANDARD.encode(content.as_bytes()),
            "branch": self.target.branch,
        });
        if let Some(token) = token {
            body["sha"] = json!(token.0);
        }
        self.agent
            .put(&self.contents_url(path))
            .set("Accept", ACCEPT)
            .set("Authorization", &self.authorization())
            .set("User-Agent", USER_AGENT)
            .send_json(body)
            .map_err(|err| Self::map_error(path, err))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "{}/{}@{}",
            self.target.repository.owner, self.target.repository.name, self.target.branch
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_core::config::Repository;

    fn store() -> GitHubStore {
        GitHubStore::new(GitHubTarget {
            repository: Repository {
                owner: "octo".to_string(),
                name: "picks".to_string(),
            },
            token: "secret".to_string(),
            branch: "gh-pages".to_string(),
        })
    }

    #[test]
    fn contents_url_is_repository_relative() {
        assert_eq!(
            store().contents_url("articles/index.html"),
            "https://api.github.com/repos/octo/picks/contents/articles/index.html"
        );
    }

    #[test]
    fn contents_url_encodes_each_segment() {
        assert_eq!(
            store().contents_url("articles/a#b?c d.html"),
            "https://api.github.com/repos/octo/picks/contents/articles/a%23b%3Fc%20d.html"
        );
    }

    #[test]
    fn base_url_is_overridable() {
        let store = GitHubStore::with_base_url(store().target, "http://127.0.0.1:9000/");
        assert_eq!(
            store.contents_url("index.html"),
            "http://127.0.0.1:9000/repos/octo/picks/contents/index.html"
        );
    }

    #[test]
    fn decodes_wrapped_base64() {
        let body = ContentsResponse {
            sha: "abc".to_string(),
            content: "eyJhcnRp\nY2xlcyI6W119\n".to_string(),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_content("manifest.json", &body).unwrap(), r#"{"articles":[]}"#);
    }

    #[test]
    fn rejects_unknown_encoding() {
        let body = ContentsResponse {
            sha: "abc".to_string(),
            content: String::new(),
            encoding: Some("none".to_string()),
        };
        assert!(matches!(
            decode_content("big.html", &body),
            Err(StorageError::Decode { .. })
        ));
    }
}
