//! Render collaborator boundary.
//!
//! Rendering is an external concern: a renderer takes a fully resolved
//! [`BufferItem`] and produces zero or more named output files. The
//! pipeline dispatches to renderers by the parser identifier a theme
//! manifest declares; an unknown parser yields an empty file list, not
//! an error.

mod html;
pub mod theme;

pub use html::HtmlRenderer;
pub use theme::ThemeManifest;

use crate::data::types::BufferItem;
use crate::error::Error;
use std::collections::BTreeMap;

// ============================================================================
// Renderer Contract
// ============================================================================

/// One file produced by a renderer, relative to the staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Display name (used in logs).
    pub name: String,

    /// Staging-relative output path, `/`-separated.
    pub path: String,

    pub content: Vec<u8>,
}

/// A pluggable render function for one parser identifier.
pub trait Renderer {
    /// Materialize output files for one buffer item.
    fn render(&self, item: &BufferItem) -> Result<Vec<RenderedFile>, Error>;
}

// ============================================================================
// Registry
// ============================================================================

/// Parser-identifier → renderer dispatch table.
pub struct RendererRegistry {
    renderers: BTreeMap<String, Box<dyn Renderer>>,
}

impl RendererRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            renderers: BTreeMap::new(),
        }
    }

    /// Registry with the built-in `html` renderer.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("html", Box::new(HtmlRenderer));
        registry
    }

    /// Register (or replace) the renderer for a parser identifier.
    pub fn register(&mut self, parser: &str, renderer: Box<dyn Renderer>) {
        self.renderers.insert(parser.to_string(), renderer);
    }

    /// Render one buffer item through its parser's renderer.
    ///
    /// Unknown parsers produce an empty file list.
    pub fn render(&self, item: &BufferItem) -> Result<Vec<RenderedFile>, Error> {
        match self.renderers.get(&item.parser) {
            Some(renderer) => renderer.render(item),
            None => Ok(Vec::new()),
        }
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{ContentItem, Site};
    use std::sync::Arc;

    fn buffer_item(parser: &str) -> BufferItem {
        let site = Site {
            id: "s1".into(),
            title: "Site".into(),
            url: String::new(),
            theme: "default".into(),
            head_html: String::new(),
            footer_html: String::new(),
            sidebar_html: String::new(),
            vars: Default::default(),
            structure: Vec::new(),
            menus: Default::default(),
        };
        let item = ContentItem {
            id: "p1".into(),
            site_id: "s1".into(),
            slug: "p1".into(),
            title: "Post".into(),
            content: "<p>hi</p>".into(),
            template: "post".into(),
            head_html: String::new(),
            footer_html: String::new(),
            sidebar_html: String::new(),
            vars: Default::default(),
            exclusive_vars: Vec::new(),
            created_at: 0,
            updated_at: 0,
        };
        BufferItem {
            path: "blog/p1".into(),
            template_id: "default.post".into(),
            parser: parser.into(),
            item,
            site: Arc::new(site),
            root_path: "../../".into(),
            head_html: String::new(),
            footer_html: String::new(),
            sidebar_html: String::new(),
            vars: Default::default(),
        }
    }

    #[test]
    fn test_unknown_parser_yields_empty_list() {
        let registry = RendererRegistry::with_builtin();
        let files = registry.render(&buffer_item("no-such-parser")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_builtin_html_dispatch() {
        let registry = RendererRegistry::with_builtin();
        let files = registry.render(&buffer_item("html")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "blog/p1/index.html");
    }

    struct CountingRenderer;
    impl Renderer for CountingRenderer {
        fn render(&self, _item: &BufferItem) -> Result<Vec<RenderedFile>, Error> {
            Ok(vec![
                RenderedFile {
                    name: "a".into(),
                    path: "a.txt".into(),
                    content: b"a".to_vec(),
                },
                RenderedFile {
                    name: "b".into(),
                    path: "b.txt".into(),
                    content: b"b".to_vec(),
                },
            ])
        }
    }

    #[test]
    fn test_registered_renderer_wins() {
        let mut registry = RendererRegistry::with_builtin();
        registry.register("html", Box::new(CountingRenderer));
        let files = registry.render(&buffer_item("html")).unwrap();
        assert_eq!(files.len(), 2);
    }
}
