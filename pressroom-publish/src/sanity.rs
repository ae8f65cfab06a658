//! Sanity HTTP query API [`ContentSource`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use pressroom_core::config::SourceConfig;
use pressroom_core::{ContentKind, ContentRecord, DocumentId};

use crate::source::{ContentSource, SourceError};

const PROJECTION: &str = "{ _id, _type, title, slug, body, excerpt, publishedAt, ticker, \
                          companyName, recommendationType, targetPrice, timeHorizon, reasons }";

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

pub struct SanityClient {
    agent: ureq::Agent,
    config: SourceConfig,
    /// Replaces the project host when set.
    api_base: Option<String>,
}

impl SanityClient {
    pub fn new(config: SourceConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        SanityClient {
            agent,
            config,
            api_base: None,
        }
    }

    /// Send queries to `api_base` instead of `https://<project>.api[cdn].sanity.io`.
    pub fn with_base_url(config: SourceConfig, api_base: impl Into<String>) -> Self {
        SanityClient {
            api_base: Some(api_base.into().trim_end_matches('/').to_string()),
            ..Self::new(config)
        }
    }

    /// `apicdn` for anonymous reads, `api` when authenticated.
    fn query_url(&self) -> String {
        let base = match &self.api_base {
            Some(base) => base.clone(),
            None => {
                let host = if self.config.token.is_some() { "api" } else { "apicdn" };
                format!("https://{}.{host}.sanity.io", self.config.project_id)
            }
        };
        format!(
            "{base}/v{}/data/query/{}",
            self.config.api_version.trim_start_matches('v'),
            self.config.dataset
        )
    }

    fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let mut request = self.agent.get(&self.query_url()).query("query", groq);
        for (name, value) in params {
            // Parameter values are JSON literals.
            let encoded = serde_json::Value::from(*value).to_string();
            request = request.query(&format!("${name}"), &encoded);
        }
        if let Some(token) = &self.config.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        let response = request.call().map_err(|err| match err {
            ureq::Error::Status(status, response) => SourceError::Http {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => SourceError::Transport(Box::new(transport)),
        })?;
        let body: QueryResponse<T> = response.into_json().map_err(SourceError::Decode)?;
        Ok(body.result)
    }
}

fn fetch_one_query() -> String {
    format!(r#"*[_id == $id || _id == "drafts." + $id][0]{PROJECTION}"#)
}

fn fetch_all_query() -> String {
    format!(
        r#"*[_type == $type && !(_id in path("drafts.**"))] | order(publishedAt desc){PROJECTION}"#
    )
}

impl ContentSource for SanityClient {
    fn fetch_one(&self, id: &DocumentId) -> Result<ContentRecord, SourceError> {
        let record: Option<ContentRecord> =
            self.query(&fetch_one_query(), &[("id", id.published_id())])?;
        let record = record.ok_or_else(|| SourceError::NotFound { id: id.clone() })?;
        tracing::debug!("fetched {} {}", record.kind, record.id);
        Ok(record)
    }

    fn fetch_all(&self, kind: ContentKind) -> Result<Vec<ContentRecord>, SourceError> {
        let records: Vec<ContentRecord> =
            self.query(&fetch_all_query(), &[("type", kind.type_name())])?;
        tracing::info!("fetched {} {} record(s)", records.len(), kind);
        Ok(records)
    }
}
