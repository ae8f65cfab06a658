//! Run configuration.
//!
//! [`ConfigOptions`] carries the raw, optional settings exactly as the CLI
//! collected them (flags or environment). [`ConfigOptions::resolve`] validates
//! them once into a [`SiteConfig`], which is then passed by reference to the
//! renderer and publisher. Nothing reads the environment after that point.
//!
//! | Setting | Env | Required |
//! |---------|-----|----------|
//! | Sanity project | `SANITY_PROJECT_ID` | always |
//! | Sanity dataset | `SANITY_DATASET` | always |
//! | GitHub token | `GITHUB_TOKEN` | unless `OUTPUT_DIR` |
//! | GitHub repository | `GITHUB_REPOSITORY` | unless `OUTPUT_DIR` |
//! | Document id / type | `DOCUMENT_ID`, `DOCUMENT_TYPE` | together or not at all |

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::types::{ContentKind, DocumentId};

pub const DEFAULT_SITE_TITLE: &str = "LongTermPicksUSA";
pub const DEFAULT_BRANCH: &str = "gh-pages";
pub const DEFAULT_API_VERSION: &str = "2024-01-01";

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Site-wide metadata shared by every rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteMeta {
    pub title: String,
    /// Prefix for every generated link, e.g. `/longtermpicksusa`. Empty for root sites.
    pub base_path: String,
}

/// Sanity dataset coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Bearer token for private datasets. Disables the CDN when set.
    pub token: Option<String>,
}

/// `owner/name` repository coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    /// Parse `owner/name`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            name: "GITHUB_REPOSITORY",
            value: value.to_string(),
            reason: reason.to_string(),
        };
        let (owner, name) = value.split_once('/').ok_or_else(|| invalid("expected owner/name"))?;
        if owner.is_empty() || name.contains('/') {
            return Err(invalid("expected owner/name"));
        }
        Ok(Repository {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Link prefix for GitHub project pages.
    ///
    /// `/name` for project sites; empty for user/org sites (`*.github.io`).
    pub fn pages_base_path(&self) -> String {
        if self.name.is_empty() || self.name.ends_with(".github.io") {
            String::new()
        } else {
            format!("/{}", self.name)
        }
    }
}

/// Remote store coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubTarget {
    pub repository: Repository,
    pub token: String,
    pub branch: String,
}

/// Where the generated site is stored. Chosen once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// GitHub contents API with optimistic concurrency.
    GitHub(GitHubTarget),
    /// A local directory; no concurrency tokens.
    Local { root: PathBuf },
}

/// A single document to publish incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub id: DocumentId,
    pub kind: ContentKind,
}

/// Fully validated configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub site: SiteMeta,
    pub source: SourceConfig,
    pub backend: Backend,
    /// `None` selects a full rebuild.
    pub target: Option<PublishTarget>,
}

// ---------------------------------------------------------------------------
// Raw options
// ---------------------------------------------------------------------------

/// Unvalidated settings. Empty strings count as missing.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub sanity_project_id: Option<String>,
    pub sanity_dataset: Option<String>,
    pub sanity_token: Option<String>,
    pub sanity_api_version: Option<String>,
    pub github_token: Option<String>,
    pub github_repository: Option<String>,
    pub branch: Option<String>,
    pub document_id: Option<String>,
    pub document_type: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub site_title: Option<String>,
    pub base_path: Option<String>,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    present(value).ok_or(ConfigError::Missing { name })
}

impl ConfigOptions {
    /// Validate everything needed for `publish`.
    pub fn resolve(&self) -> Result<SiteConfig, ConfigError> {
        let source = SourceConfig {
            project_id: required(&self.sanity_project_id, "SANITY_PROJECT_ID")?,
            dataset: required(&self.sanity_dataset, "SANITY_DATASET")?,
            api_version: present(&self.sanity_api_version)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            token: present(&self.sanity_token),
        };
        let backend = self.resolve_backend()?;
        let target = self.resolve_target()?;
        let site = self.resolve_site(&backend);
        Ok(SiteConfig {
            site,
            source,
            backend,
            target,
        })
    }

    /// Validate only the storage settings (used by `status`).
    pub fn resolve_backend(&self) -> Result<Backend, ConfigError> {
        if let Some(root) = self.output_dir.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            return Ok(Backend::Local { root: root.clone() });
        }
        let token = required(&self.github_token, "GITHUB_TOKEN")?;
        let repository = Repository::parse(&required(&self.github_repository, "GITHUB_REPOSITORY")?)?;
        Ok(Backend::GitHub(GitHubTarget {
            repository,
            token,
            branch: present(&self.branch).unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        }))
    }

    fn resolve_target(&self) -> Result<Option<PublishTarget>, ConfigError> {
        match (present(&self.document_id), present(&self.document_type)) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::Missing {
                name: "DOCUMENT_TYPE",
            }),
            (None, Some(_)) => Err(ConfigError::Missing { name: "DOCUMENT_ID" }),
            (Some(id), Some(kind)) => {
                let kind = kind.parse::<ContentKind>().map_err(|reason| ConfigError::Invalid {
                    name: "DOCUMENT_TYPE",
                    value: kind.clone(),
                    reason,
                })?;
                Ok(Some(PublishTarget {
                    id: DocumentId::from(id),
                    kind,
                }))
            }
        }
    }

    fn resolve_site(&self, backend: &Backend) -> SiteMeta {
        let derived = match backend {
            Backend::GitHub(target) => target.repository.pages_base_path(),
            Backend::Local { .. } => String::new(),
        };
        let base_path = present(&self.base_path)
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or(derived);
        SiteMeta {
            title: present(&self.site_title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
            base_path,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn remote_options() -> ConfigOptions {
        ConfigOptions {
            sanity_project_id: Some("proj".to_string()),
            sanity_dataset: Some("production".to_string()),
            github_token: Some("ghp_x".to_string()),
            github_repository: Some("octo/longtermpicksusa".to_string()),
            ..ConfigOptions::default()
        }
    }

    #[rstest]
    #[case("octo/longtermpicksusa", "/longtermpicksusa")]
    #[case("octo/octo.github.io", "")]
    #[case("octo/", "")]
    fn base_path_from_repository(#[case] repo: &str, #[case] expected: &str) {
        let repo = Repository::parse(repo).expect("parse");
        assert_eq!(repo.pages_base_path(), expected);
    }

    #[rstest]
    #[case("no-slash")]
    #[case("/name")]
    #[case("a/b/c")]
    fn repository_rejects_malformed(#[case] value: &str) {
        assert!(matches!(
            Repository::parse(value),
            Err(ConfigError::Invalid { name: "GITHUB_REPOSITORY", .. })
        ));
    }

    #[test]
    fn remote_resolution_derives_base_path_and_branch() {
        let config = remote_options().resolve().expect("resolve");
        assert_eq!(config.site.base_path, "/longtermpicksusa");
        assert_eq!(config.site.title, DEFAULT_SITE_TITLE);
        assert!(config.target.is_none());
        match config.backend {
            Backend::GitHub(target) => assert_eq!(target.branch, DEFAULT_BRANCH),
            other => panic!("expected GitHub backend, got {other:?}"),
        }
    }

    #[test]
    fn output_dir_switches_to_local_without_github_settings() {
        let options = ConfigOptions {
            sanity_project_id: Some("proj".to_string()),
            sanity_dataset: Some("production".to_string()),
            output_dir: Some(PathBuf::from("/tmp/site")),
            ..ConfigOptions::default()
        };
        let config = options.resolve().expect("resolve");
        assert_eq!(
            config.backend,
            Backend::Local {
                root: PathBuf::from("/tmp/site")
            }
        );
        assert_eq!(config.site.base_path, "");
    }

    #[test]
    fn empty_values_count_as_missing() {
        let options = ConfigOptions {
            sanity_project_id: Some(String::new()),
            ..remote_options()
        };
        assert_eq!(
            options.resolve().unwrap_err(),
            ConfigError::Missing {
                name: "SANITY_PROJECT_ID"
            }
        );
    }

    #[test]
    fn remote_requires_token() {
        let options = ConfigOptions {
            github_token: None,
            ..remote_options()
        };
        assert_eq!(
            options.resolve().unwrap_err(),
            ConfigError::Missing {
                name: "GITHUB_TOKEN"
            }
        );
    }

    #[test]
    fn document_id_and_type_travel_together() {
        let only_id = ConfigOptions {
            document_id: Some("abc".to_string()),
            ..remote_options()
        };
        assert_eq!(
            only_id.resolve().unwrap_err(),
            ConfigError::Missing {
                name: "DOCUMENT_TYPE"
            }
        );

        let both = ConfigOptions {
            document_id: Some("abc".to_string()),
            document_type: Some("stockRecommendation".to_string()),
            ..remote_options()
        };
        let target = both.resolve().expect("resolve").target.expect("target");
        assert_eq!(target.kind, ContentKind::Recommendation);
        assert_eq!(target.id, DocumentId::from("abc"));
    }

    #[test]
    fn invalid_document_type_is_rejected() {
        let options = ConfigOptions {
            document_id: Some("abc".to_string()),
            document_type: Some("podcast".to_string()),
            ..remote_options()
        };
        assert!(matches!(
            options.resolve().unwrap_err(),
            ConfigError::Invalid {
                name: "DOCUMENT_TYPE",
                ..
            }
        ));
    }

    #[test]
    fn explicit_base_path_wins() {
        let options = ConfigOptions {
            base_path: Some("/preview/".to_string()),
            ..remote_options()
        };
        assert_eq!(options.resolve().expect("resolve").site.base_path, "/preview");
    }
}
