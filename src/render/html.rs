//! Built-in `html` renderer.
//!
//! A deliberately small reference renderer so the pipeline runs end to
//! end without an external template engine: it wraps an item's content
//! in a minimal HTML shell, splicing in the aggregated head, sidebar and
//! footer fragments. Richer themes register their own [`Renderer`] under
//! a different parser identifier.

use crate::data::types::BufferItem;
use crate::error::Error;

use super::{RenderedFile, Renderer};

/// Minimal pass-through HTML renderer (parser identifier `html`).
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, item: &BufferItem) -> Result<Vec<RenderedFile>, Error> {
        let path = if item.path.is_empty() {
            "index.html".to_string()
        } else {
            format!("{}/index.html", item.path)
        };

        Ok(vec![RenderedFile {
            name: "index.html".into(),
            path,
            content: render_page(item).into_bytes(),
        }])
    }
}

/// Assemble the page shell around the item's content.
///
/// Asset references go through `root_path` so the emitted page addresses
/// site-root-relative resources from any depth.
fn render_page(item: &BufferItem) -> String {
    let mut page = String::with_capacity(1024);

    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    page.push_str(&format!(
        "<meta charset=\"utf-8\">\n<title>{} - {}</title>\n",
        escape_html(&item.item.title),
        escape_html(&item.site.title),
    ));
    page.push_str(&format!(
        "<link rel=\"stylesheet\" href=\"{}assets/style.css\">\n",
        item.root_path
    ));
    page.push_str(&item.head_html);
    page.push_str("\n</head>\n<body>\n");

    if !item.sidebar_html.is_empty() {
        page.push_str("<aside>\n");
        page.push_str(&item.sidebar_html);
        page.push_str("\n</aside>\n");
    }

    page.push_str("<main>\n");
    page.push_str(&item.item.content);
    page.push_str("\n</main>\n");

    if !item.footer_html.is_empty() {
        page.push_str("<footer>\n");
        page.push_str(&item.footer_html);
        page.push_str("\n</footer>\n");
    }

    page.push_str("</body>\n</html>\n");
    page
}

/// Escape text interpolated into HTML attributes/titles.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{ContentItem, Site};
    use std::sync::Arc;

    fn buffer_item(path: &str, root_path: &str) -> BufferItem {
        let site = Site {
            id: "s1".into(),
            title: "My Site".into(),
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
            title: "A <Post>".into(),
            content: "<p>body</p>".into(),
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
            path: path.into(),
            template_id: "default.post".into(),
            parser: "html".into(),
            item,
            site: Arc::new(site),
            root_path: root_path.into(),
            head_html: "<meta name=\"x\">".into(),
            footer_html: "<span>foot</span>".into(),
            sidebar_html: String::new(),
            vars: Default::default(),
        }
    }

    #[test]
    fn test_root_post_renders_at_index() {
        let files = HtmlRenderer.render(&buffer_item("", "")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "index.html");
    }

    #[test]
    fn test_nested_item_path_and_root_path() {
        let files = HtmlRenderer
            .render(&buffer_item("blog/p1", "../../"))
            .unwrap();
        assert_eq!(files[0].path, "blog/p1/index.html");

        let page = String::from_utf8(files[0].content.clone()).unwrap();
        assert!(page.contains("href=\"../../assets/style.css\""));
    }

    #[test]
    fn test_fragments_spliced_in_order() {
        let files = HtmlRenderer.render(&buffer_item("blog/p1", "../../")).unwrap();
        let page = String::from_utf8(files[0].content.clone()).unwrap();

        let head = page.find("<meta name=\"x\">").unwrap();
        let body = page.find("<p>body</p>").unwrap();
        let foot = page.find("<span>foot</span>").unwrap();
        assert!(head < body && body < foot);

        // No sidebar fragment, no aside element.
        assert!(!page.contains("<aside>"));
    }

    #[test]
    fn test_title_escaped() {
        let files = HtmlRenderer.render(&buffer_item("", "")).unwrap();
        let page = String::from_utf8(files[0].content.clone()).unwrap();
        assert!(page.contains("A &lt;Post&gt; - My Site"));
    }
}
