//! Canopy - a content tree compiler and publisher.

mod aggregate;
mod buffer;
mod build;
mod cli;
mod config;
mod data;
mod deploy;
mod error;
mod executor;
mod generator;
mod init;
mod logger;
mod render;
mod structure;
mod utils;

use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use build::BuildOptions;
use cli::{Cli, Commands};
use config::AppConfig;
use data::store::JsonStore;
use deploy::{
    DeployOptions, HostingProvider, ProviderRegistry, PublishContext, PublishStage, UpdateEvent,
};
use executor::CancelToken;
use logger::StatusLine;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { name } = &cli.command {
        let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
        return init::new_workspace(&root, name.as_deref());
    }

    let config = load_config(&cli)?;
    let mut store =
        JsonStore::open(&config.store.database).context("Failed to open content database")?;
    let cancel = CancelToken::new();

    match &cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::Build {
            site,
            item,
            sitemap,
        } => {
            let opts = BuildOptions {
                target: item.clone(),
                sitemap: *sitemap,
            };
            let report = build::build_site(&config, &store, site, &opts, &cancel)?;
            log!("build"; "staging ready at {} ({} files)", config.buffer.path.display(), report.files.len());
            Ok(())
        }

        Commands::Deploy {
            site,
            item,
            clear_remote,
            no_sitemap,
            message,
        } => {
            let provider = create_provider(&config)?;
            let opts = DeployOptions {
                target_item: item.clone(),
                clear_remote: *clear_remote,
                sitemap: !no_sitemap,
                message: message
                    .clone()
                    .unwrap_or_else(|| config.deploy.github.commit_message.clone()),
            };
            let status = RefCell::new(StatusLine::new());
            let mut ctx = PublishContext {
                config: &config,
                store: &mut store,
                site_id: site,
                cancel,
            };
            provider
                .deploy(&mut ctx, &opts, &|event| report_progress(&status, event))
                .map_err(|err| {
                    let hint = if err.is_remote() {
                        "the remote host rejected the publish"
                    } else {
                        "publish failed before reaching the remote"
                    };
                    anyhow::Error::new(err).context(hint)
                })?;
            log!("publish"; "published {site}");
            Ok(())
        }

        Commands::Setup {
            site,
            reuse_existing,
        } => {
            let provider = create_provider(&config)?;
            let status = RefCell::new(StatusLine::new());
            let mut ctx = PublishContext {
                config: &config,
                store: &mut store,
                site_id: site,
                cancel,
            };
            let site_record =
                provider.setup(&mut ctx, *reuse_existing, &|event| {
                    report_progress(&status, event)
                })?;
            log!("setup"; "repository: {}", provider.repository_url()?);
            log!("setup"; "site is live at {}", site_record.url);
            Ok(())
        }

        Commands::Wipe { site, yes } => {
            if !yes {
                bail!("wiping removes every file from the remote site; pass --yes to confirm");
            }
            let provider = create_provider(&config)?;
            let status = RefCell::new(StatusLine::new());
            let mut ctx = PublishContext {
                config: &config,
                store: &mut store,
                site_id: site,
                cancel,
            };
            provider.wipe(&mut ctx, &|event| report_progress(&status, event))?;
            log!("wipe"; "remote site cleared");
            Ok(())
        }

        Commands::Upload { paths } => {
            let provider = create_provider(&config)?;
            let files = expand_staged_paths(&config, paths)?;
            let status = RefCell::new(StatusLine::new());
            let report = provider.upload_files(&files, &config.buffer.path, &cancel, &|event| {
                report_progress(&status, event)
            })?;
            log!("upload"; "{} written, {} unchanged", report.written, report.skipped);
            fail_on_sync_errors(report.failures)
        }

        Commands::Remove { paths } => {
            let provider = create_provider(&config)?;
            let files: Vec<PathBuf> = paths.iter().map(|p| config.buffer.path.join(p)).collect();
            let status = RefCell::new(StatusLine::new());
            let report = provider.delete_files(&files, &config.buffer.path, &cancel, &|event| {
                report_progress(&status, event)
            })?;
            log!("remove"; "{} deleted, {} already absent", report.deleted, report.skipped);
            fail_on_sync_errors(report.failures)
        }
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));
    let config_path = root.join(&cli.config);

    if !config_path.exists() {
        bail!("Config file not found. Run `canopy init` first.");
    }

    let mut config = AppConfig::from_path(&config_path)?;
    config.update_with_cli(cli);
    config.validate(&cli.command)?;
    Ok(config)
}

/// Instantiate the configured hosting provider, phrasing the
/// not-configured signal as a user-facing redirect.
fn create_provider(config: &AppConfig) -> Result<Box<dyn HostingProvider>> {
    let registry = ProviderRegistry::with_builtin();
    match registry.create(&config.deploy.provider, config) {
        Ok(provider) => Ok(provider),
        Err(error::Error::NotConfigured(reason)) => {
            log!("error"; "hosting is not configured: {reason}");
            log!("error"; "fill in [deploy] in canopy.toml, or run `canopy build` and deploy the staging directory manually");
            bail!("hosting not configured")
        }
        Err(err) => Err(err.into()),
    }
}

/// Render publish progress onto a single status line.
fn report_progress(status: &RefCell<StatusLine>, event: UpdateEvent) {
    let mut status = status.borrow_mut();
    match event {
        UpdateEvent::Stage(PublishStage::Done) => status.done("done"),
        UpdateEvent::Stage(PublishStage::Failed) => status.fail("publish failed", ""),
        UpdateEvent::Stage(stage) => status.update(&stage.to_string()),
        UpdateEvent::Message(message) => status.update(&message),
        UpdateEvent::Percent(pct) => status.percent(pct),
    }
}

/// Staged files for upload: directories expand to their files, and
/// every path must live under the buffer.
fn expand_staged_paths(config: &AppConfig, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let absolute = if path.is_absolute() {
            path.clone()
        } else {
            config.buffer.path.join(path)
        };
        if absolute.is_dir() {
            files.extend(utils::fs::collect_files(&absolute));
        } else if absolute.is_file() {
            files.push(absolute);
        } else {
            bail!("`{}` is not in the staging directory", path.display());
        }
    }
    Ok(files)
}

/// Present per-file sync failures as one consolidated error.
fn fail_on_sync_errors(failures: Vec<String>) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    log!("error"; "{} files failed:\n{}", failures.len(), failures.join("\n"));
    bail!("{} file operations failed", failures.len())
}
