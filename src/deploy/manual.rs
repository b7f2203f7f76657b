//! Manual (no-op) hosting provider.
//!
//! Stands in when no hosting backend is configured: every capability
//! returns the typed "not configured" signal so the caller can redirect
//! the user to manual deployment of the staging directory, or to hosting
//! configuration.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::data::types::Site;
use crate::error::Error;
use crate::executor::CancelToken;

use super::{DeployOptions, HostingProvider, OnUpdate, PublishContext, SyncReport};

/// Provider selected by `provider = "manual"`.
pub struct ManualProvider;

/// Registry factory; always constructs.
pub fn from_config(_config: &AppConfig) -> Result<Box<dyn HostingProvider>, Error> {
    Ok(Box::new(ManualProvider))
}

fn not_configured() -> Error {
    Error::NotConfigured(
        "no hosting backend selected; build locally and copy the staging directory to your host"
            .into(),
    )
}

impl HostingProvider for ManualProvider {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn repository_url(&self) -> Result<String, Error> {
        Err(not_configured())
    }

    fn setup(
        &self,
        _ctx: &mut PublishContext<'_>,
        _reuse_existing: bool,
        _on_update: OnUpdate<'_>,
    ) -> Result<Site, Error> {
        Err(not_configured())
    }

    fn deploy(
        &self,
        _ctx: &mut PublishContext<'_>,
        _opts: &DeployOptions,
        _on_update: OnUpdate<'_>,
    ) -> Result<(), Error> {
        Err(not_configured())
    }

    fn wipe(&self, _ctx: &mut PublishContext<'_>, _on_update: OnUpdate<'_>) -> Result<(), Error> {
        Err(not_configured())
    }

    fn upload_files(
        &self,
        _paths: &[PathBuf],
        _base: &Path,
        _cancel: &CancelToken,
        _on_update: OnUpdate<'_>,
    ) -> Result<SyncReport, Error> {
        Err(not_configured())
    }

    fn delete_files(
        &self,
        _paths: &[PathBuf],
        _base: &Path,
        _cancel: &CancelToken,
        _on_update: OnUpdate<'_>,
    ) -> Result<SyncReport, Error> {
        Err(not_configured())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_capability_signals_not_configured() {
        let provider = ManualProvider;
        assert_eq!(provider.name(), "manual");
        assert!(matches!(
            provider.repository_url().unwrap_err(),
            Error::NotConfigured(_)
        ));

        let cancel = CancelToken::new();
        let err = provider
            .upload_files(&[], Path::new("/tmp"), &cancel, &|_| {})
            .unwrap_err();
        assert!(matches!(err, Error::NotConfigured(_)));
    }
}
