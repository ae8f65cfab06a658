pub mod publish;
pub mod status;

use std::path::PathBuf;

use clap::Args;

use pressroom_core::ConfigOptions;

/// Storage settings shared by `publish` and `status`.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Write to a local directory instead of GitHub.
    #[arg(long, env = "OUTPUT_DIR", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// GitHub token with contents write access.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Target repository as `owner/name`.
    #[arg(long, env = "GITHUB_REPOSITORY", value_name = "OWNER/NAME")]
    pub github_repository: Option<String>,

    /// Branch that hosts the site.
    #[arg(long, env = "PUBLISH_BRANCH")]
    pub branch: Option<String>,
}

impl StoreArgs {
    pub fn options(&self) -> ConfigOptions {
        ConfigOptions {
            output_dir: self.output_dir.clone(),
            github_token: self.github_token.clone(),
            github_repository: self.github_repository.clone(),
            branch: self.branch.clone(),
            ..ConfigOptions::default()
        }
    }
}
