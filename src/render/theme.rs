//! Theme manifests.
//!
//! A theme is a directory under the configured themes root carrying a
//! `theme.toml` manifest:
//!
//! ```toml
//! name = "default"
//! parser = "html"
//! templates = ["index", "post", "page"]
//! ```
//!
//! The manifest names the parser identifier the theme's templates are
//! written for; the pipeline uses it to pick a renderer.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Parsed `theme.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeManifest {
    pub name: String,

    /// Parser identifier selecting the renderer for this theme.
    pub parser: String,

    /// Template names the theme provides. Empty means "any".
    #[serde(default)]
    pub templates: Vec<String>,
}

impl ThemeManifest {
    /// Whether the theme provides `template`.
    pub fn has_template(&self, template: &str) -> bool {
        self.templates.is_empty() || self.templates.iter().any(|t| t == template)
    }
}

/// Load the manifest for `theme` from `themes_dir`.
///
/// # Errors
/// [`Error::MissingResource`] when the manifest file is absent,
/// [`Error::Validation`] when it cannot be parsed.
pub fn load_manifest(themes_dir: &Path, theme: &str) -> Result<ThemeManifest, Error> {
    let path = themes_dir.join(theme).join("theme.toml");
    if !path.exists() {
        return Err(Error::MissingResource(format!(
            "theme manifest `{}` not found",
            path.display()
        )));
    }
    let raw = fs::read_to_string(&path)?;
    toml::from_str(&raw)
        .map_err(|err| Error::Validation(format!("theme manifest `{}`: {err}", path.display())))
}
