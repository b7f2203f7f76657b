//! Sitemap and robots generation.
//!
//! Writes a `sitemap.xml` listing every buffer item's final URL for
//! search engine indexing, plus a `robots.txt` pointing at it.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/blog/hello/</loc>
//!     <lastmod>2026-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use std::path::{Path, PathBuf};

use crate::data::types::{BufferItem, Site};
use crate::error::Error;
use crate::log;
use crate::utils::fs::write_file;

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// ============================================================================
// Public API
// ============================================================================

/// Write `sitemap.xml` into `out_dir` from the build's buffer items.
///
/// # Errors
/// [`Error::Validation`] if the site has no public URL yet.
pub fn write_sitemap(
    site: &Site,
    items: &[BufferItem],
    out_dir: &Path,
) -> Result<PathBuf, Error> {
    if site.url.is_empty() {
        return Err(Error::Validation(
            "site has no public URL; run setup or set one before generating a sitemap".into(),
        ));
    }

    let sitemap = Sitemap::from_items(site, items);
    let path = out_dir.join("sitemap.xml");
    write_file(&path, sitemap.into_xml().as_bytes())?;
    log!("sitemap"; "sitemap.xml ({} urls)", items.len());
    Ok(path)
}

/// Write a `robots.txt` pointing crawlers at the sitemap.
pub fn write_robots(site: &Site, out_dir: &Path) -> Result<PathBuf, Error> {
    let base = site.url.trim_end_matches('/');
    let robots = format!("User-agent: *\nAllow: /\n\nSitemap: {base}/sitemap.xml\n");
    let path = out_dir.join("robots.txt");
    write_file(&path, robots.as_bytes())?;
    Ok(path)
}

// ============================================================================
// Sitemap Implementation
// ============================================================================

/// Sitemap data structure
struct Sitemap {
    urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap
struct UrlEntry {
    /// Full URL location
    loc: String,
    /// Last modification date (YYYY-MM-DD), omitted when unknown
    lastmod: Option<String>,
}

impl Sitemap {
    fn from_items(site: &Site, items: &[BufferItem]) -> Self {
        let base = site.url.trim_end_matches('/');
        let urls = items
            .iter()
            .map(|item| UrlEntry {
                loc: if item.path.is_empty() {
                    format!("{base}/")
                } else {
                    format!("{base}/{}/", item.path)
                },
                lastmod: (item.item.updated_at > 0).then(|| format_ymd(item.item.updated_at)),
            })
            .collect();
        Self { urls }
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            if let Some(lastmod) = entry.lastmod {
                xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Format epoch seconds as `YYYY-MM-DD` (UTC).
///
/// Days-to-civil conversion per the standard Gregorian era arithmetic.
fn format_ymd(epoch_secs: u64) -> String {
    #[allow(clippy::cast_possible_wrap)]
    let days = (epoch_secs / 86_400) as i64;

    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };

    format!("{year:04}-{month:02}-{day:02}")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::ContentItem;
    use std::sync::Arc;

    fn site(url: &str) -> Site {
        Site {
            id: "s1".into(),
            title: "Site".into(),
            url: url.into(),
            theme: "default".into(),
            head_html: String::new(),
            footer_html: String::new(),
            sidebar_html: String::new(),
            vars: Default::default(),
            structure: Vec::new(),
            menus: Default::default(),
        }
    }

    fn buffer_item(path: &str, updated_at: u64, site: &Site) -> BufferItem {
        BufferItem {
            path: path.into(),
            template_id: "default.post".into(),
            parser: "html".into(),
            item: ContentItem {
                id: path.to_string(),
                site_id: "s1".into(),
                slug: path.into(),
                title: path.into(),
                content: String::new(),
                template: "post".into(),
                head_html: String::new(),
                footer_html: String::new(),
                sidebar_html: String::new(),
                vars: Default::default(),
                exclusive_vars: Vec::new(),
                created_at: 0,
                updated_at,
            },
            site: Arc::new(site.clone()),
            root_path: String::new(),
            head_html: String::new(),
            footer_html: String::new(),
            sidebar_html: String::new(),
            vars: Default::default(),
        }
    }

    #[test]
    fn test_format_ymd() {
        assert_eq!(format_ymd(0), "1970-01-01");
        assert_eq!(format_ymd(86_400), "1970-01-02");
        // 2024-02-29 00:00:00 UTC (leap day)
        assert_eq!(format_ymd(1_709_164_800), "2024-02-29");
        // 2026-01-01 00:00:00 UTC
        assert_eq!(format_ymd(1_767_225_600), "2026-01-01");
    }

    #[test]
    fn test_sitemap_urls_and_lastmod() {
        let site = site("https://example.com/");
        let items = vec![
            buffer_item("", 86_400, &site),
            buffer_item("blog/hello", 0, &site),
        ];

        let sitemap = Sitemap::from_items(&site, &items);
        let xml = sitemap.into_xml();

        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/blog/hello/</loc>"));
        assert!(xml.contains("<lastmod>1970-01-02</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), 2);
        // Zero timestamp omits lastmod.
        assert_eq!(xml.matches("<lastmod>").count(), 1);
    }

    #[test]
    fn test_sitemap_requires_site_url() {
        let site = site("");
        let err = write_sitemap(&site, &[], Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_write_robots() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_robots(&site("https://example.com"), dir.path()).unwrap();

        let robots = std::fs::read_to_string(path).unwrap();
        assert!(robots.contains("User-agent: *"));
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<x>"), "&lt;x&gt;");
    }
}
