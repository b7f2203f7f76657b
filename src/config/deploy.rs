//! `[deploy]` section configuration.
//!
//! Selects the hosting provider and carries provider-specific settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[deploy]` section in canopy.toml - publish configuration.
///
/// # Example
/// ```toml
/// [deploy]
/// provider = "github"
///
/// [deploy.github]
/// username = "alice"
/// repository = "alice/alice.github.io"
/// branch = "main"
/// token_path = "~/.canopy-token"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Hosting provider name, resolved through the provider registry
    /// ("github", or "manual" for hand-operated deployment).
    #[serde(default = "defaults::deploy::provider")]
    #[educe(Default = defaults::deploy::provider())]
    pub provider: String,

    /// GitHub Pages publish settings.
    #[serde(default)]
    pub github: GithubDeployConfig,
}

/// `[deploy.github]` section - GitHub Pages publishing.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct GithubDeployConfig {
    /// Account username; also the basic-auth user for the contents API.
    #[serde(default)]
    pub username: String,

    /// Explicit `owner/name` repository override. When unset the
    /// account's default naming (`<username>.github.io`) is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Target branch for publishing.
    #[serde(default = "defaults::deploy::github::branch")]
    #[educe(Default = defaults::deploy::github::branch())]
    pub branch: String,

    /// Path to the file holding the personal access token.
    ///
    /// # Security
    /// - Store outside the content tree (e.g. `~/.canopy-token`)
    /// - Never commit tokens to version control!
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,

    /// REST API base URL (overridable for self-hosted installs).
    #[serde(default = "defaults::deploy::github::api_base")]
    #[educe(Default = defaults::deploy::github::api_base())]
    pub api_base: String,

    /// Host used to build the clone/push URL.
    #[serde(default = "defaults::deploy::github::git_host")]
    #[educe(Default = defaults::deploy::github::git_host())]
    pub git_host: String,

    /// Fixed delay between contents-API requests, in milliseconds.
    #[serde(default = "defaults::deploy::github::request_delay_ms")]
    #[educe(Default = defaults::deploy::github::request_delay_ms())]
    pub request_delay_ms: u64,

    /// Default commit message for publish commits.
    #[serde(default = "defaults::deploy::github::commit_message")]
    #[educe(Default = defaults::deploy::github::commit_message())]
    pub commit_message: String,
}

#[cfg(test)]
mod tests {
    use super::super::AppConfig;
    use std::path::PathBuf;

    #[test]
    fn test_deploy_config() {
        let config = r#"
            [deploy]
            provider = "github"

            [deploy.github]
            username = "alice"
            repository = "alice/site"
            branch = "gh-pages"
            token_path = "~/.canopy-token"
            request_delay_ms = 250
        "#;
        let config: AppConfig = toml::from_str(config).unwrap();

        assert_eq!(config.deploy.provider, "github");
        assert_eq!(config.deploy.github.username, "alice");
        assert_eq!(config.deploy.github.repository.as_deref(), Some("alice/site"));
        assert_eq!(config.deploy.github.branch, "gh-pages");
        assert_eq!(
            config.deploy.github.token_path,
            Some(PathBuf::from("~/.canopy-token"))
        );
        assert_eq!(config.deploy.github.request_delay_ms, 250);
    }

    #[test]
    fn test_deploy_config_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.deploy.provider, "github");
        assert_eq!(config.deploy.github.branch, "main");
        assert!(config.deploy.github.repository.is_none());
        assert!(config.deploy.github.token_path.is_none());
        assert_eq!(config.deploy.github.api_base, "https://api.github.com");
        assert_eq!(config.deploy.github.git_host, "github.com");
        assert_eq!(config.deploy.github.request_delay_ms, 500);
    }

    #[test]
    fn test_deploy_config_unknown_field_rejection() {
        let config = r#"
            [deploy]
            unknown = "field"
        "#;
        let result: Result<AppConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_deploy_config_manual_provider() {
        let config = r#"
            [deploy]
            provider = "manual"
        "#;
        let config: AppConfig = toml::from_str(config).unwrap();
        assert_eq!(config.deploy.provider, "manual");
    }
}
