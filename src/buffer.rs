//! Buffer item construction.
//!
//! Combines a site, its content items and the resolved structure into an
//! ordered list of render-ready buffer items. This is where metadata
//! inheritance happens: variables and HTML fragments flow site → ancestor
//! chain → item, with item-level values winning.
//!
//! # Paths
//!
//! Structure paths are id chains; buffer paths are slug chains with the
//! designated root post's slug stripped from the front:
//!
//! ```text
//! /home                 →  ""            root_path ""
//! /home/blog            →  "blog"        root_path "../"
//! /home/blog/hello      →  "blog/hello"  root_path "../../"
//! ```
//!
//! A structure node whose id resolves to no content item is skipped (the
//! build carries on); the skip is reported, not silently dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aggregate::{self, Mergeable};
use crate::data::types::{BufferItem, ContentItem, ItemId, Site};
use crate::error::Error;
use crate::render::ThemeManifest;
use crate::structure;

/// Result of one build pass over a site's structure.
#[derive(Debug)]
pub struct BufferList {
    /// Render-ready items in structure traversal order.
    pub items: Vec<BufferItem>,

    /// Ids of structure nodes that resolved to no content item.
    pub skipped: Vec<ItemId>,
}

/// Resolve a site's structure into buffer items.
///
/// Output order matches the depth-first traversal of the structure tree
/// and is deterministic for a given tree.
///
/// # Errors
///
/// [`Error::Validation`] for a malformed structure (duplicate keys, or
/// anything but exactly one root node); [`Error::MissingResource`] when
/// an item names a template its theme does not provide.
pub fn build(
    site: &Site,
    items: &[ContentItem],
    manifest: &ThemeManifest,
) -> Result<BufferList, Error> {
    structure::validate(&site.structure)?;
    let root_post_id = match site.root_post_id() {
        Some(id) if site.structure.len() == 1 => id.to_string(),
        _ => {
            return Err(Error::Validation(format!(
                "expected exactly one root node, found {}",
                site.structure.len()
            )));
        }
    };

    let lookup: BTreeMap<&str, &ContentItem> = items
        .iter()
        .filter(|item| item.site_id == site.id)
        .map(|item| (item.id.as_str(), item))
        .collect();

    let site = Arc::new(site.clone());
    let mut list = BufferList {
        items: Vec::new(),
        skipped: Vec::new(),
    };

    for path in structure::compute_paths(&site.structure) {
        let ids: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // Bulk-resolve the id chain; one unresolved id skips this
        // branch's buffer item only, never the whole build.
        let Some(chain) = resolve_chain(&ids, &lookup) else {
            let missing = ids
                .iter()
                .copied()
                .find(|id| !lookup.contains_key(id))
                .unwrap_or_default()
                .to_string();
            if !list.skipped.contains(&missing) {
                list.skipped.push(missing);
            }
            continue;
        };
        let item = chain[chain.len() - 1];

        if !manifest.has_template(&item.template) {
            return Err(Error::MissingResource(format!(
                "theme `{}` has no template `{}` (item `{}`)",
                site.theme, item.template, item.id
            )));
        }

        // Slug path with the root post's slug stripped from the front.
        let rel_slugs: Vec<&str> = chain[1..].iter().map(|i| i.slug.as_str()).collect();
        let out_path = rel_slugs.join("/");
        let root_path = "../".repeat(rel_slugs.len());

        let contributors: Vec<ItemId> = structure::ancestor_ids(&item.id, &site.structure)
            .into_iter()
            .filter(|id| *id != root_post_id)
            .collect();

        list.items.push(BufferItem {
            path: out_path,
            template_id: format!("{}.{}", site.theme, item.template),
            parser: manifest.parser.clone(),
            item: item.clone(),
            site: Arc::clone(&site),
            root_path,
            head_html: aggregate_fragment(
                &site.head_html,
                &contributors,
                &lookup,
                |i| i.head_html.as_str(),
                &item.head_html,
            ),
            footer_html: aggregate_fragment(
                &site.footer_html,
                &contributors,
                &lookup,
                |i| i.footer_html.as_str(),
                &item.footer_html,
            ),
            sidebar_html: aggregate_fragment(
                &site.sidebar_html,
                &contributors,
                &lookup,
                |i| i.sidebar_html.as_str(),
                &item.sidebar_html,
            ),
            vars: aggregate_vars(&site.vars, &contributors, &lookup, &item.vars),
        });
    }

    Ok(list)
}

/// Resolve every id of a structure path to its item; `None` if any id
/// has no matching item.
fn resolve_chain<'a>(
    ids: &[&str],
    lookup: &BTreeMap<&str, &'a ContentItem>,
) -> Option<Vec<&'a ContentItem>> {
    ids.iter().map(|&id| lookup.get(id).copied()).collect()
}

/// Site value, then the ancestor-chain contribution, then the item's
/// own value, concatenated.
fn aggregate_fragment<'a, F>(
    site_value: &str,
    contributors: &[ItemId],
    lookup: &BTreeMap<&str, &'a ContentItem>,
    select: F,
    own_value: &str,
) -> String
where
    F: Fn(&'a ContentItem) -> &'a str,
{
    let inherited = aggregate::aggregate(contributors, lookup, |item| {
        aggregate::fragment(select(item))
    })
    .map(Mergeable::into_text)
    .unwrap_or_default();

    format!("{site_value}{inherited}{own_value}")
}

/// Site vars, overridden by inherited vars, overridden by the item's
/// own vars. Exclusive-variable stripping applies to inherited
/// contributions only; an item always sees its own vars.
fn aggregate_vars(
    site_vars: &BTreeMap<String, String>,
    contributors: &[ItemId],
    lookup: &BTreeMap<&str, &ContentItem>,
    own_vars: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut vars = site_vars.clone();
    if let Some(inherited) = aggregate::aggregate(contributors, lookup, aggregate::inheritable_vars)
    {
        vars.extend(inherited.into_map());
    }
    vars.extend(own_vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    vars
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::StructureNode;

    fn manifest() -> ThemeManifest {
        ThemeManifest {
            name: "default".into(),
            parser: "html".into(),
            templates: vec!["index".into(), "post".into()],
        }
    }

    fn item(id: &str, slug: &str) -> ContentItem {
        ContentItem {
            id: id.into(),
            site_id: "s1".into(),
            slug: slug.into(),
            title: id.to_uppercase(),
            content: String::new(),
            template: "post".into(),
            head_html: String::new(),
            footer_html: String::new(),
            sidebar_html: String::new(),
            vars: BTreeMap::new(),
            exclusive_vars: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// home → blog → post1, with `home` the designated root post.
    fn sample_site() -> Site {
        Site {
            id: "s1".into(),
            title: "Site".into(),
            url: "https://example.com".into(),
            theme: "default".into(),
            head_html: String::new(),
            footer_html: String::new(),
            sidebar_html: String::new(),
            vars: BTreeMap::new(),
            structure: vec![StructureNode {
                key: "home".into(),
                children: vec![StructureNode {
                    key: "blog".into(),
                    children: vec![StructureNode::leaf("post1")],
                    title: None,
                }],
                title: None,
            }],
            menus: BTreeMap::new(),
        }
    }

    fn sample_items() -> Vec<ContentItem> {
        vec![
            item("home", "home"),
            item("blog", "journal"),
            item("post1", "hello"),
        ]
    }

    #[test]
    fn test_paths_strip_root_slug_and_map_slugs() {
        let list = build(&sample_site(), &sample_items(), &manifest()).unwrap();
        let paths: Vec<&str> = list.items.iter().map(|b| b.path.as_str()).collect();

        // Root post renders at the site root; descendants use slugs,
        // not ids ("journal", not "blog").
        assert_eq!(paths, vec!["", "journal", "journal/hello"]);
    }

    #[test]
    fn test_root_path_one_per_segment() {
        let list = build(&sample_site(), &sample_items(), &manifest()).unwrap();
        let roots: Vec<&str> = list.items.iter().map(|b| b.root_path.as_str()).collect();
        assert_eq!(roots, vec!["", "../", "../../"]);
    }

    #[test]
    fn test_output_order_is_traversal_order() {
        let list = build(&sample_site(), &sample_items(), &manifest()).unwrap();
        let ids: Vec<&str> = list.items.iter().map(|b| b.item.id.as_str()).collect();
        assert_eq!(ids, vec!["home", "blog", "post1"]);
    }

    #[test]
    fn test_template_id_and_parser() {
        let list = build(&sample_site(), &sample_items(), &manifest()).unwrap();
        assert_eq!(list.items[0].template_id, "default.post");
        assert_eq!(list.items[0].parser, "html");
    }

    #[test]
    fn test_head_html_site_then_ancestor_then_item() {
        let mut site = sample_site();
        site.head_html = "<Z/>".into();
        let mut items = sample_items();
        items[1].head_html = "<Y/>".into(); // blog
        items[2].head_html = "<X/>".into(); // post1

        let list = build(&site, &items, &manifest()).unwrap();
        let post1 = list.items.iter().find(|b| b.item.id == "post1").unwrap();

        // blog is the contributing ancestor; home (the root post) never
        // double-contributes on top of the site-level value.
        assert_eq!(post1.head_html, "<Z/><Y/><X/>");
    }

    #[test]
    fn test_root_post_fragment_not_inherited() {
        let mut items = sample_items();
        items[0].head_html = "<HOME/>".into();

        let list = build(&sample_site(), &items, &manifest()).unwrap();
        let post1 = list.items.iter().find(|b| b.item.id == "post1").unwrap();
        assert!(!post1.head_html.contains("<HOME/>"));

        // The root post still renders its own fragment.
        let home = list.items.iter().find(|b| b.item.id == "home").unwrap();
        assert_eq!(home.head_html, "<HOME/>");
    }

    #[test]
    fn test_vars_precedence_item_over_inherited_over_site() {
        let mut site = sample_site();
        site.vars.insert("color".into(), "site".into());
        site.vars.insert("font".into(), "site".into());
        site.vars.insert("lang".into(), "site".into());

        let mut items = sample_items();
        items[1].vars.insert("color".into(), "blog".into()); // inherited
        items[1].vars.insert("font".into(), "blog".into());
        items[2].vars.insert("color".into(), "post".into()); // own

        let list = build(&site, &items, &manifest()).unwrap();
        let post1 = list.items.iter().find(|b| b.item.id == "post1").unwrap();

        assert_eq!(post1.vars.get("color"), Some(&"post".to_string()));
        assert_eq!(post1.vars.get("font"), Some(&"blog".to_string()));
        assert_eq!(post1.vars.get("lang"), Some(&"site".to_string()));
    }

    #[test]
    fn test_exclusive_vars_do_not_reach_descendants() {
        let mut items = sample_items();
        items[1].vars.insert("color".into(), "red".into()); // blog
        items[1].exclusive_vars = vec!["color".into()];

        let list = build(&sample_site(), &items, &manifest()).unwrap();

        let post1 = list.items.iter().find(|b| b.item.id == "post1").unwrap();
        assert!(!post1.vars.contains_key("color"));

        // The declaring item keeps its own variable.
        let blog = list.items.iter().find(|b| b.item.id == "blog").unwrap();
        assert_eq!(blog.vars.get("color"), Some(&"red".to_string()));
    }

    #[test]
    fn test_missing_item_skips_branch_not_build() {
        let mut items = sample_items();
        items.retain(|i| i.id != "blog");

        let list = build(&sample_site(), &items, &manifest()).unwrap();

        // blog and post1 (whose chain contains blog) are skipped;
        // home still builds.
        let ids: Vec<&str> = list.items.iter().map(|b| b.item.id.as_str()).collect();
        assert_eq!(ids, vec!["home"]);
        assert_eq!(list.skipped, vec!["blog".to_string()]);
    }

    #[test]
    fn test_item_of_other_site_does_not_resolve() {
        let mut items = sample_items();
        items[2].site_id = "other".into();

        let list = build(&sample_site(), &items, &manifest()).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.skipped, vec!["post1".to_string()]);
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let mut site = sample_site();
        site.structure.push(StructureNode::leaf("about"));

        let err = build(&site, &sample_items(), &manifest()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_unknown_template_is_missing_resource() {
        let mut items = sample_items();
        items[2].template = "gallery".into();

        let err = build(&sample_site(), &items, &manifest()).unwrap_err();
        assert!(matches!(err, Error::MissingResource(_)));
    }
}
