//! Workspace scaffolding.
//!
//! `canopy init` lays down a working starting point: the config file, a
//! content database with a small demo site (home → blog → first post)
//! and the default theme manifest.

use std::path::Path;

use anyhow::{Result, bail};

use crate::data::store::{ContentStore, JsonStore};
use crate::data::types::{ContentItem, MenuItem, Site, StructureNode};
use crate::log;
use crate::structure;
use crate::utils::fs::write_file;

const CONFIG_TEMPLATE: &str = r#"[store]
database = "content/site.json"
themes = "themes"

[buffer]
path = "buffer"

[deploy]
provider = "github"

[deploy.github]
username = ""
branch = "main"
token_path = "~/.canopy-token"
"#;

const THEME_TEMPLATE: &str = r#"name = "default"
parser = "html"
templates = ["page", "post"]
"#;

/// Create a new workspace under `root` (or `root/<name>`).
pub fn new_workspace(root: &Path, name: Option<&Path>) -> Result<()> {
    let target = match name {
        Some(name) => root.join(name),
        None => root.to_path_buf(),
    };
    let config_path = target.join("canopy.toml");
    if config_path.exists() {
        bail!("Config file already exists. Remove it manually or init in a different path.");
    }

    write_file(&config_path, CONFIG_TEMPLATE.as_bytes())?;
    write_file(
        &target.join("themes/default/theme.toml"),
        THEME_TEMPLATE.as_bytes(),
    )?;
    write_file(
        &target.join("themes/default/assets/style.css"),
        b"body { max-width: 42rem; margin: 0 auto; }\n",
    )?;

    let mut store = JsonStore::create(&target.join("content/site.json"))?;
    store.create_site(demo_site()?)?;
    for item in demo_items() {
        store.create_item(item)?;
    }

    log!("init"; "workspace ready at {}", target.display());
    log!("init"; "next: fill in [deploy.github] and run `canopy setup demo`");
    Ok(())
}

fn demo_site() -> Result<Site> {
    // Grow the demo tree through the resolver ops the editing surface
    // would use.
    let mut tree = vec![StructureNode::leaf("home")];
    tree = structure::insert_child(&tree, StructureNode::leaf("blog"), "home")?;
    tree = structure::insert_child(&tree, StructureNode::leaf("first-post"), "blog")?;

    let mut site = Site {
        id: "demo".into(),
        title: "Demo Site".into(),
        url: String::new(),
        theme: "default".into(),
        head_html: "<meta name=\"generator\" content=\"canopy\">".into(),
        footer_html: "<p>Built with canopy</p>".into(),
        sidebar_html: String::new(),
        vars: Default::default(),
        structure: tree,
        menus: Default::default(),
    };
    site.vars.insert("lang".into(), "en".into());
    site.menus.insert(
        "main".into(),
        vec![
            MenuItem {
                label: "Home".into(),
                item: "home".into(),
            },
            MenuItem {
                label: "Blog".into(),
                item: "blog".into(),
            },
        ],
    );
    Ok(site)
}

fn demo_items() -> Vec<ContentItem> {
    let item = |id: &str, slug: &str, title: &str, content: &str| ContentItem {
        id: id.into(),
        site_id: "demo".into(),
        slug: slug.into(),
        title: title.into(),
        content: content.into(),
        template: "page".into(),
        head_html: String::new(),
        footer_html: String::new(),
        sidebar_html: String::new(),
        vars: Default::default(),
        exclusive_vars: Vec::new(),
        created_at: 0,
        updated_at: 0,
    };

    vec![
        item("home", "home", "Home", "<h1>Welcome</h1>"),
        item("blog", "blog", "Blog", "<h1>Posts</h1>"),
        item(
            "first-post",
            "hello-world",
            "Hello World",
            "<h1>Hello World</h1><p>A first post.</p>",
        ),
    ]
}
