//! Build orchestration.
//!
//! One build resolves a site's content tree into buffer items, runs each
//! through the render collaborator and mirrors the produced files into
//! the staging directory:
//!
//! ```text
//! build_site()
//!     │
//!     ├── acquire publish lock ── staging is exclusive-use
//!     ├── clear staging (keep version-control metadata)
//!     └── render_into()
//!             ├── ContentStore: site + items
//!             ├── theme manifest → parser
//!             ├── BufferItemBuilder → ordered buffer items
//!             ├── RendererRegistry → files on disk
//!             └── sitemap.xml / robots.txt (optional)
//! ```

use std::path::{Path, PathBuf};

use crate::buffer;
use crate::config::AppConfig;
use crate::data::store::ContentStore;
use crate::data::types::ItemId;
use crate::deploy::publish_lock;
use crate::error::Error;
use crate::executor::CancelToken;
use crate::generator::sitemap;
use crate::log;
use crate::render::{RendererRegistry, theme};
use crate::structure;
use crate::utils::fs as staging_fs;

/// Knobs for one local build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Render only this item and its ancestor chain.
    pub target: Option<String>,

    /// Also write sitemap.xml and robots.txt.
    pub sitemap: bool,
}

/// What one build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Buffer items that went through a renderer.
    pub rendered: usize,

    /// Files written into the staging directory.
    pub files: Vec<PathBuf>,

    /// Structure node ids that resolved to no content item.
    pub skipped: Vec<ItemId>,
}

/// Build a site into the configured staging directory.
///
/// Holds the global publish lock for the whole `clear → render` span;
/// the staging directory is not safe for concurrent builds.
pub fn build_site(
    config: &AppConfig,
    store: &dyn ContentStore,
    site_id: &str,
    opts: &BuildOptions,
    cancel: &CancelToken,
) -> Result<BuildReport, Error> {
    let _guard = publish_lock();
    staging_fs::clear_dir_except_git(&config.buffer.path)?;
    render_into(
        config,
        store,
        site_id,
        opts.target.as_deref(),
        opts.sitemap,
        &config.buffer.path,
        cancel,
    )
}

/// Render a site's buffer items into `out_dir`.
///
/// Callers own locking and staging cleanup (the deploy cycle clears
/// differently around its clone step).
pub(crate) fn render_into(
    config: &AppConfig,
    store: &dyn ContentStore,
    site_id: &str,
    target: Option<&str>,
    generate_sitemap: bool,
    out_dir: &Path,
    cancel: &CancelToken,
) -> Result<BuildReport, Error> {
    let site = store.get_site(site_id)?;
    let items = store.get_items(site_id)?;
    let manifest = theme::load_manifest(&config.store.themes, &site.theme)?;
    log!("build"; "theme `{}` via parser `{}`", manifest.name, manifest.parser);

    let list = buffer::build(&site, &items, &manifest)?;
    for id in &list.skipped {
        log!("warn"; "structure node `{id}` has no matching item, skipped");
    }

    // A targeted build covers the item plus its ancestor chain.
    let selected: Vec<&crate::data::types::BufferItem> = match target {
        Some(target) => {
            if structure::find(target, &site.structure).is_none() {
                return Err(Error::MissingResource(format!(
                    "item `{target}` is not part of the site structure"
                )));
            }
            let mut keep = structure::ancestor_ids(target, &site.structure);
            keep.push(target.to_string());
            list.items
                .iter()
                .filter(|b| keep.contains(&b.item.id))
                .collect()
        }
        None => list.items.iter().collect(),
    };

    let registry = RendererRegistry::with_builtin();
    let mut report = BuildReport {
        skipped: list.skipped.clone(),
        ..Default::default()
    };

    for item in &selected {
        cancel.ensure_active()?;
        for file in registry.render(item)? {
            let path = join_slash_path(out_dir, &file.path);
            staging_fs::write_file(&path, &file.content)?;
            report.files.push(path);
        }
        report.rendered += 1;
    }

    if generate_sitemap {
        if site.url.is_empty() {
            log!("warn"; "site has no public URL yet, skipping sitemap");
        } else {
            // The sitemap always lists the whole site, not just a
            // targeted subset.
            report.files.push(sitemap::write_sitemap(&site, &list.items, out_dir)?);
            report.files.push(sitemap::write_robots(&site, out_dir)?);
        }
    }

    log!("build"; "rendered {} items, {} files", report.rendered, report.files.len());
    Ok(report)
}

/// Join a `/`-separated render path under `base`, component-wise.
fn join_slash_path(base: &Path, slash_path: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for segment in slash_path.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::{ContentStore as _, JsonStore};
    use crate::data::types::{ContentItem, Site, StructureNode};
    use std::fs;

    /// A workspace with a demo site (home → blog → post1), items, theme
    /// and config, rooted in a temp dir.
    fn workspace() -> (tempfile::TempDir, AppConfig, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let theme_dir = root.join("themes/default");
        fs::create_dir_all(&theme_dir).unwrap();
        fs::write(
            theme_dir.join("theme.toml"),
            "name = \"default\"\nparser = \"html\"\n",
        )
        .unwrap();

        let mut store = JsonStore::create(&root.join("content/site.json")).unwrap();
        store
            .create_site(Site {
                id: "demo".into(),
                title: "Demo".into(),
                url: "https://example.com".into(),
                theme: "default".into(),
                head_html: String::new(),
                footer_html: String::new(),
                sidebar_html: String::new(),
                vars: Default::default(),
                structure: vec![StructureNode {
                    key: "home".into(),
                    children: vec![StructureNode {
                        key: "blog".into(),
                        children: vec![StructureNode::leaf("post1")],
                        title: None,
                    }],
                    title: None,
                }],
                menus: Default::default(),
            })
            .unwrap();
        for (id, slug) in [("home", "home"), ("blog", "blog"), ("post1", "hello")] {
            store
                .create_item(ContentItem {
                    id: id.into(),
                    site_id: "demo".into(),
                    slug: slug.into(),
                    title: id.to_uppercase(),
                    content: format!("<p>{id}</p>"),
                    template: "page".into(),
                    head_html: String::new(),
                    footer_html: String::new(),
                    sidebar_html: String::new(),
                    vars: Default::default(),
                    exclusive_vars: Vec::new(),
                    created_at: 86_400,
                    updated_at: 86_400,
                })
                .unwrap();
        }

        let mut config = AppConfig::from_str("").unwrap();
        config.root = root.clone();
        config.store.database = root.join("content/site.json");
        config.store.themes = root.join("themes");
        config.buffer.path = root.join("buffer");

        (dir, config, store)
    }

    #[test]
    fn test_full_build_mirrors_paths() {
        let (_dir, config, store) = workspace();
        let report = build_site(
            &config,
            &store,
            "demo",
            &BuildOptions::default(),
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(report.rendered, 3);
        assert!(config.buffer.path.join("index.html").exists());
        assert!(config.buffer.path.join("blog/index.html").exists());
        assert!(config.buffer.path.join("blog/hello/index.html").exists());
    }

    #[test]
    fn test_build_clears_stale_output_but_keeps_git() {
        let (_dir, config, store) = workspace();
        staging_fs::write_file(&config.buffer.path.join("stale.html"), b"old").unwrap();
        staging_fs::write_file(&config.buffer.path.join(".git/HEAD"), b"ref").unwrap();

        build_site(
            &config,
            &store,
            "demo",
            &BuildOptions::default(),
            &CancelToken::new(),
        )
        .unwrap();

        assert!(!config.buffer.path.join("stale.html").exists());
        assert!(config.buffer.path.join(".git/HEAD").exists());
    }

    #[test]
    fn test_targeted_build_renders_item_and_ancestors() {
        let (_dir, config, store) = workspace();
        let report = build_site(
            &config,
            &store,
            "demo",
            &BuildOptions {
                target: Some("post1".into()),
                sitemap: false,
            },
            &CancelToken::new(),
        )
        .unwrap();

        // post1 plus its ancestors home and blog.
        assert_eq!(report.rendered, 3);

        let report = build_site(
            &config,
            &store,
            "demo",
            &BuildOptions {
                target: Some("blog".into()),
                sitemap: false,
            },
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(report.rendered, 2);
        assert!(!config.buffer.path.join("blog/hello/index.html").exists());
    }

    #[test]
    fn test_targeted_build_unknown_item() {
        let (_dir, config, store) = workspace();
        let err = build_site(
            &config,
            &store,
            "demo",
            &BuildOptions {
                target: Some("ghost".into()),
                sitemap: false,
            },
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingResource(_)));
    }

    #[test]
    fn test_sitemap_and_robots_generated() {
        let (_dir, config, store) = workspace();
        build_site(
            &config,
            &store,
            "demo",
            &BuildOptions {
                target: None,
                sitemap: true,
            },
            &CancelToken::new(),
        )
        .unwrap();

        let xml = fs::read_to_string(config.buffer.path.join("sitemap.xml")).unwrap();
        assert!(xml.contains("<loc>https://example.com/blog/hello/</loc>"));
        assert!(config.buffer.path.join("robots.txt").exists());
    }

    #[test]
    fn test_cancelled_build_stops() {
        let (_dir, config, store) = workspace();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = build_site(
            &config,
            &store,
            "demo",
            &BuildOptions::default(),
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_missing_theme_fails_build() {
        let (_dir, mut config, store) = workspace();
        config.store.themes = config.root.join("no-such-dir");

        let err = build_site(
            &config,
            &store,
            "demo",
            &BuildOptions::default(),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingResource(_)));
    }
}
