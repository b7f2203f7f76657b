//! Workspace configuration management for `canopy.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `[store]`   | Content database and themes directory           |
//! | `[buffer]`  | Staging directory for rendered output           |
//! | `[deploy]`  | Hosting provider selection and settings         |
//!
//! # Example
//!
//! ```toml
//! [store]
//! database = "content/site.json"
//! themes = "themes"
//!
//! [buffer]
//! path = "buffer"
//!
//! [deploy]
//! provider = "github"
//!
//! [deploy.github]
//! username = "alice"
//! token_path = "~/.canopy-token"
//! ```

pub mod defaults;
mod deploy;
mod error;

pub use deploy::{DeployConfig, GithubDeployConfig};
pub use error::ConfigError;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Sections
// ============================================================================

/// `[store]` section - where content and themes live.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Content database file (sites + items, JSON).
    #[serde(default = "defaults::store::database")]
    #[educe(Default = defaults::store::database())]
    pub database: PathBuf,

    /// Themes directory; each theme is `<themes>/<name>/theme.toml`.
    #[serde(default = "defaults::store::themes")]
    #[educe(Default = defaults::store::themes())]
    pub themes: PathBuf,
}

/// `[buffer]` section - the staging directory.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BufferConfig {
    /// Staging directory holding rendered output prior to publish.
    /// Exclusive-use: cleared before every build.
    #[serde(default = "defaults::buffer::path")]
    #[educe(Default = defaults::buffer::path())]
    pub path: PathBuf,
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing canopy.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Project root directory (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Content store locations
    #[serde(default)]
    pub store: StoreConfig,

    /// Staging settings
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Publish settings
    #[serde(default)]
    pub deploy: DeployConfig,
}

impl AppConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Fold CLI arguments in and normalize every path against the root.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("./"));
        let root = Self::normalize_path(&root);

        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.store.database = Self::normalize_path(&root.join(&self.store.database));
        self.store.themes = Self::normalize_path(&root.join(&self.store.themes));
        self.buffer.path = Self::normalize_path(&root.join(&self.buffer.path));

        // Token path gets tilde expansion; relative paths anchor at root.
        if let Some(token_path) = &self.deploy.github.token_path {
            let expanded = shellexpand::tilde(&token_path.to_string_lossy()).into_owned();
            let path = PathBuf::from(expanded);
            self.deploy.github.token_path = Some(if path.is_relative() {
                Self::normalize_path(&root.join(path))
            } else {
                Self::normalize_path(&path)
            });
        }

        self.root = root;
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self, command: &Commands) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if !self.store.database.exists() {
            bail!(ConfigError::Validation(format!(
                "[store.database] `{}` not found; run `canopy init` first",
                self.store.database.display()
            )));
        }

        if command.needs_remote() {
            Self::check_command_installed("git")?;

            let github = &self.deploy.github;
            if self.deploy.provider == "github" {
                if github.username.is_empty() {
                    bail!(ConfigError::Validation(
                        "[deploy.github.username] is required to publish".into()
                    ));
                }
                match &github.token_path {
                    None => bail!(ConfigError::Validation(
                        "[deploy.github.token_path] is required to publish".into()
                    )),
                    Some(path) if !path.is_file() => {
                        bail!(ConfigError::Validation(format!(
                            "[deploy.github.token_path] `{}` not found",
                            path.display()
                        )));
                    }
                    _ => {}
                }
                if !github.api_base.starts_with("http") {
                    bail!(ConfigError::Validation(
                        "[deploy.github.api_base] must start with http:// or https://".into()
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(cmd: &str) -> Result<()> {
        which::which(cmd)
            .with_context(|| format!("`{cmd}` not found. Please install it first."))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_defaults() {
        let config = AppConfig::from_str("").unwrap();
        assert_eq!(config.store.database, PathBuf::from("content/site.json"));
        assert_eq!(config.store.themes, PathBuf::from("themes"));
        assert_eq!(config.buffer.path, PathBuf::from("buffer"));
        assert_eq!(config.deploy.provider, "github");
    }

    #[test]
    fn test_from_str_sections() {
        let config = AppConfig::from_str(
            r#"
            [store]
            database = "db/content.json"
            themes = "skins"

            [buffer]
            path = "out"

            [deploy]
            provider = "manual"
        "#,
        )
        .unwrap();

        assert_eq!(config.store.database, PathBuf::from("db/content.json"));
        assert_eq!(config.store.themes, PathBuf::from("skins"));
        assert_eq!(config.buffer.path, PathBuf::from("out"));
        assert_eq!(config.deploy.provider, "manual");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = AppConfig::from_str("[store\ndatabase = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let result = AppConfig::from_str("[unknown_section]\nfield = \"value\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_update_with_cli_normalizes_paths() {
        use clap::Parser;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();

        let cli = Cli::parse_from([
            "canopy",
            "--root",
            root.to_str().unwrap(),
            "build",
            "demo",
        ]);
        let mut config = AppConfig::from_str("").unwrap();
        config.update_with_cli(&cli);

        assert_eq!(config.root, root);
        assert!(config.store.database.is_absolute());
        assert!(config.buffer.path.starts_with(&root));
        assert_eq!(config.config_path, root.join("canopy.toml"));
    }

    #[test]
    fn test_update_with_cli_expands_token_tilde() {
        use clap::Parser;

        let cli = Cli::parse_from(["canopy", "build", "demo"]);
        let mut config = AppConfig::from_str(
            r#"
            [deploy.github]
            token_path = "~/.canopy-token"
        "#,
        )
        .unwrap();
        config.update_with_cli(&cli);

        let token_path = config.deploy.github.token_path.unwrap();
        assert!(!token_path.to_string_lossy().contains('~'));
        assert!(token_path.is_absolute());
    }
}
