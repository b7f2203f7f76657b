//! Hosting provider abstraction.
//!
//! Publishing is polymorphic over the capability set `{setup, deploy,
//! wipe, upload_files, delete_files, repository_url}`. Providers are
//! resolved through a [`ProviderRegistry`] keyed by hosting-type name so
//! new providers register without touching dispatch logic.
//!
//! # Publish cycle
//!
//! ```text
//! idle → staging → (clone|init) → render → commit → push → done
//! ```
//!
//! `wipe` runs a separate cycle (`clone → clear-remote-tree → commit →
//! push`); any step failure transitions to `failed` with the staging
//! area cleaned up on a best-effort basis.
//!
//! The staging directory is an exclusive-use resource: a global publish
//! mutex serializes `clear → render → sync` across concurrent callers.

pub mod github;
mod manual;

pub use github::GithubProvider;
pub use manual::ManualProvider;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::data::store::ContentStore;
use crate::data::types::Site;
use crate::error::Error;
use crate::executor::CancelToken;

// ============================================================================
// Publish Serialization
// ============================================================================

/// At most one build/publish may be in flight system-wide.
static PUBLISH_LOCK: Mutex<()> = Mutex::new(());

/// Acquire the global publish mutex, blocking concurrent callers.
pub fn publish_lock() -> MutexGuard<'static, ()> {
    PUBLISH_LOCK.lock()
}

// ============================================================================
// Progress Interface
// ============================================================================

/// One step of a publish cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Idle,
    Staging,
    Clone,
    Init,
    Render,
    ClearRemote,
    Commit,
    Push,
    Done,
    Failed,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Staging => "staging",
            Self::Clone => "clone",
            Self::Init => "init",
            Self::Render => "render",
            Self::ClearRemote => "clear-remote",
            Self::Commit => "commit",
            Self::Push => "push",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// User-facing progress notification.
#[derive(Debug, Clone)]
pub enum UpdateEvent {
    /// The cycle entered a new stage.
    Stage(PublishStage),
    /// Free-form status text.
    Message(String),
    /// Percentage of a rate-limited file sync.
    Percent(u8),
}

/// Progress callback; the only UI-facing contract the pipeline exposes.
pub type OnUpdate<'a> = &'a dyn Fn(UpdateEvent);

// ============================================================================
// Provider Contract
// ============================================================================

/// Knobs for one publish cycle.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Publish only this item plus its ancestor chain.
    pub target_item: Option<String>,

    /// Clear the remote tree even for a targeted publish.
    pub clear_remote: bool,

    /// Write sitemap.xml / robots.txt into the staged output.
    pub sitemap: bool,

    /// Commit message.
    pub message: String,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            target_item: None,
            clear_remote: false,
            sitemap: true,
            message: "canopy publish".to_string(),
        }
    }
}

/// Outcome of a content-API file sync.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Files created or updated remotely.
    pub written: usize,

    /// Files skipped because the remote copy was byte-identical (or,
    /// for deletes, already absent).
    pub skipped: usize,

    /// Files deleted remotely.
    pub deleted: usize,

    /// Per-file failure descriptions; empty on a clean run.
    pub failures: Vec<String>,
}

/// Everything a provider needs from its caller.
pub struct PublishContext<'a> {
    pub config: &'a AppConfig,
    pub store: &'a mut dyn ContentStore,
    pub site_id: &'a str,
    pub cancel: CancelToken,
}

/// A pluggable hosting backend.
pub trait HostingProvider {
    /// Registry key of this provider.
    fn name(&self) -> &'static str;

    /// Browsable URL of the remote repository.
    fn repository_url(&self) -> Result<String, Error>;

    /// Idempotent first-time provisioning: create the remote repository
    /// (reuse requires confirmation), run an initial publish to
    /// establish the default branch, enable hosting, persist the hosted
    /// URL onto the site record, then publish in full.
    ///
    /// On failure the caller is responsible for rolling back any site
    /// configuration it persisted before calling.
    fn setup(
        &self,
        ctx: &mut PublishContext<'_>,
        reuse_existing: bool,
        on_update: OnUpdate<'_>,
    ) -> Result<Site, Error>;

    /// One full publish cycle: stage, clone, render, commit, push.
    fn deploy(
        &self,
        ctx: &mut PublishContext<'_>,
        opts: &DeployOptions,
        on_update: OnUpdate<'_>,
    ) -> Result<(), Error>;

    /// Clear the remote site tree, preserving repository history.
    fn wipe(&self, ctx: &mut PublishContext<'_>, on_update: OnUpdate<'_>) -> Result<(), Error>;

    /// Targeted single-file writes through the contents API. Unchanged
    /// content never produces a network write.
    fn upload_files(
        &self,
        paths: &[PathBuf],
        base: &Path,
        cancel: &CancelToken,
        on_update: OnUpdate<'_>,
    ) -> Result<SyncReport, Error>;

    /// Targeted single-file deletes through the contents API.
    fn delete_files(
        &self,
        paths: &[PathBuf],
        base: &Path,
        cancel: &CancelToken,
        on_update: OnUpdate<'_>,
    ) -> Result<SyncReport, Error>;
}

// ============================================================================
// Registry
// ============================================================================

/// Constructor for one provider kind.
pub type ProviderFactory = fn(&AppConfig) -> Result<Box<dyn HostingProvider>, Error>;

/// Hosting-type name → provider factory.
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry with the built-in providers (`github`, `manual`).
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("github", github::from_config);
        registry.register("manual", manual::from_config);
        registry
    }

    /// Register (or replace) a provider factory.
    pub fn register(&mut self, name: &str, factory: ProviderFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Instantiate the provider registered under `name`.
    ///
    /// # Errors
    /// [`Error::Validation`] for an unknown name; whatever the factory
    /// reports (typically [`Error::NotConfigured`]) otherwise.
    pub fn create(
        &self,
        name: &str,
        config: &AppConfig,
    ) -> Result<Box<dyn HostingProvider>, Error> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::Validation(format!("unknown hosting provider `{name}`")))?;
        factory(config)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

// ============================================================================
// Tests
// ============================================================================
