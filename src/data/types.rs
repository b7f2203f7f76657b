//! Core record types: sites, content items, structure trees and the
//! derived render-ready buffer items.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Identifier of a content item, unique within its site.
pub type ItemId = String;

// ============================================================================
// Persistent Records
// ============================================================================

/// One node of a site's structure tree.
///
/// The tree arranges content-item ids into the navigation/routing
/// hierarchy; it carries no content itself. A node's `key` must resolve
/// to a [`ContentItem`] of the same site and must be unique within the
/// tree. Nodes are only ever rearranged through the pure operations in
/// [`crate::structure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    /// Content item this node points at.
    pub key: ItemId,

    /// Ordered child nodes.
    #[serde(default)]
    pub children: Vec<StructureNode>,

    /// Optional navigation title override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl StructureNode {
    /// Leaf node with no children.
    pub fn leaf(key: impl Into<ItemId>) -> Self {
        Self {
            key: key.into(),
            children: Vec::new(),
            title: None,
        }
    }
}

/// A single page or post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,

    /// Owning site.
    pub site_id: String,

    /// URL path segment for this item.
    pub slug: String,

    pub title: String,

    /// Raw body handed to the render collaborator.
    #[serde(default)]
    pub content: String,

    /// Template name within the site's theme.
    pub template: String,

    /// Per-item `<head>` fragment, concatenated after inherited ones.
    #[serde(default)]
    pub head_html: String,

    #[serde(default)]
    pub footer_html: String,

    #[serde(default)]
    pub sidebar_html: String,

    /// Free-form variables handed to templates.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// Names of `vars` on this item that must not propagate to
    /// descendant items during aggregation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusive_vars: Vec<String>,

    /// Creation time, seconds since the Unix epoch.
    #[serde(default)]
    pub created_at: u64,

    /// Last-modified time, seconds since the Unix epoch.
    #[serde(default)]
    pub updated_at: u64,
}

/// A named navigation menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,

    /// Content item the entry links to.
    pub item: ItemId,
}

/// A site: metadata, site-wide fragments and the structure tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,

    pub title: String,

    /// Public base URL. Filled in by `setup` once hosting is enabled;
    /// empty until then.
    #[serde(default)]
    pub url: String,

    /// Theme name; resolves to `themes/<theme>/theme.toml`.
    pub theme: String,

    /// Site-wide `<head>` fragment, first in every aggregation.
    #[serde(default)]
    pub head_html: String,

    #[serde(default)]
    pub footer_html: String,

    #[serde(default)]
    pub sidebar_html: String,

    /// Site-level variables, lowest precedence.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// Structure tree. A single root node is expected; its item is the
    /// designated root post.
    #[serde(default)]
    pub structure: Vec<StructureNode>,

    /// Named navigation menus.
    #[serde(default)]
    pub menus: BTreeMap<String, Vec<MenuItem>>,
}

impl Site {
    /// Id of the designated root post (the single root node's item).
    pub fn root_post_id(&self) -> Option<&str> {
        self.structure.first().map(|node| node.key.as_str())
    }
}

// ============================================================================
// Derived Records
// ============================================================================

/// The fully resolved, render-ready representation of one content item.
///
/// Rebuilt from scratch on every build cycle and never persisted. The
/// `head_html`/`footer_html`/`sidebar_html`/`vars` fields already carry
/// the inherited values; renderers read them as-is.
#[derive(Debug, Clone)]
pub struct BufferItem {
    /// Root-relative output path, `/`-free for the root post itself
    /// (e.g. `""`, `"blog"`, `"blog/hello"`).
    pub path: String,

    /// `"{theme}.{template}"`.
    pub template_id: String,

    /// Parser identifier from the theme manifest; selects the renderer.
    pub parser: String,

    /// The underlying content item.
    pub item: ContentItem,

    /// The owning site.
    pub site: Arc<Site>,

    /// Relative prefix from this item's directory back to the site
    /// root: one `../` per path segment (`""` for the root post).
    pub root_path: String,

    /// Aggregated `<head>` fragment: site, then inherited, then own.
    pub head_html: String,

    pub footer_html: String,

    pub sidebar_html: String,

    /// Aggregated variables: site-level, then inherited, then own.
    pub vars: BTreeMap<String, String>,
}
