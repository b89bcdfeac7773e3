//! Sitemap / sitemap-index parser (SPEC_FULL.md §4.J), streaming via
//! `quick-xml` so a 10 000-entry sitemap never builds an intermediate DOM.

use std::future::Future;
use std::pin::Pin;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use url::Url;

use articaut_types::ports::HttpTransport;
use articaut_types::ports::RequestOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: Url,
    pub lastmod: Option<String>,
    pub priority: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedSitemap {
    UrlSet(Vec<SitemapEntry>),
    Index(Vec<String>),
}

fn is_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub fn parse_sitemap(xml: &str, max_entries: usize) -> ParsedSitemap {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut is_index = false;
    let mut in_entry = false;
    let mut current_tag = String::new();
    let mut loc: Option<String> = None;
    let mut lastmod: Option<String> = None;
    let mut priority: Option<f64> = None;

    let mut url_entries = Vec::new();
    let mut index_locs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "sitemapindex" => is_index = true,
                    "url" | "sitemap" => {
                        in_entry = true;
                        loc = None;
                        lastmod = None;
                        priority = None;
                    }
                    _ => current_tag = name,
                }
            }
            Ok(Event::Text(e)) => {
                if !in_entry {
                    continue;
                }
                let Ok(text) = e.unescape() else { continue };
                match current_tag.as_str() {
                    "loc" => loc = Some(text.trim().to_string()),
                    "lastmod" => lastmod = Some(text.trim().to_string()),
                    "priority" => priority = text.trim().parse().ok(),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "url" || name == "sitemap" {
                    in_entry = false;
                    if let Some(loc_str) = loc.take() {
                        if is_index {
                            if is_http_scheme(&loc_str) && index_locs.len() < max_entries {
                                index_locs.push(loc_str);
                            }
                        } else if let Ok(parsed) = Url::parse(&loc_str) {
                            if (parsed.scheme() == "http" || parsed.scheme() == "https") && url_entries.len() < max_entries {
                                url_entries.push(SitemapEntry { loc: parsed, lastmod: lastmod.take(), priority });
                            }
                        }
                    }
                }
                current_tag.clear();
            }
            Err(_) => break,
            _ => {}
        }
    }

    if is_index {
        ParsedSitemap::Index(index_locs)
    } else {
        ParsedSitemap::UrlSet(url_entries)
    }
}

const MAX_ENTRIES_PER_SITEMAP: usize = 10_000;
const MAX_NESTED_SITEMAP_DEPTH: u32 = 3;

/// Treat each seed as a sitemap; recurse into nested sitemap-index entries
/// depth-first, rejecting any nested sitemap whose origin differs from its
/// parent's — this is the only thing standing between an attacker-controlled
/// sitemap index and an SSRF/amplification primitive.
pub async fn fetch_sitemap_entries(seed_urls: &[String], transport: &dyn HttpTransport) -> Vec<SitemapEntry> {
    let mut entries = Vec::new();
    for seed in seed_urls {
        fetch_recursive(seed.clone(), seed.clone(), 0, transport, &mut entries).await;
    }
    entries
}

/// Boxed because an `async fn` calling itself has no statically known size.
fn fetch_recursive<'a>(
    url: String,
    parent_url: String,
    depth: u32,
    transport: &'a dyn HttpTransport,
    out: &'a mut Vec<SitemapEntry>,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
        if depth > MAX_NESTED_SITEMAP_DEPTH {
            return;
        }
        if depth > 0 {
            let (Ok(parent), Ok(child)) = (Url::parse(&parent_url), Url::parse(&url)) else { return };
            if parent.origin() != child.origin() {
                tracing::warn!(child_url = %url, parent_url, "rejecting cross-origin nested sitemap");
                return;
            }
        }

        let Ok(response) = transport.get(&url, &RequestOptions::default()).await else { return };
        let body = response.body_str().into_owned();

        match parse_sitemap(&body, MAX_ENTRIES_PER_SITEMAP) {
            ParsedSitemap::UrlSet(found) => out.extend(found),
            ParsedSitemap::Index(nested) => {
                for nested_url in nested {
                    fetch_recursive(nested_url, url.clone(), depth + 1, transport, out).await;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urlset_with_lastmod_and_priority() {
        let xml = r#"<?xml version="1.0"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/a</loc><lastmod>2024-01-01</lastmod><priority>0.8</priority></url>
  <url><loc>https://example.com/b</loc></url>
</urlset>"#;
        let ParsedSitemap::UrlSet(entries) = parse_sitemap(xml, 10_000) else { panic!("expected urlset") };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-01-01"));
        assert_eq!(entries[0].priority, Some(0.8));
        assert_eq!(entries[1].lastmod, None);
    }

    #[test]
    fn parses_sitemap_index() {
        let xml = r#"<sitemapindex>
  <sitemap><loc>https://example.com/sitemap-a.xml</loc></sitemap>
  <sitemap><loc>https://example.com/sitemap-b.xml</loc></sitemap>
</sitemapindex>"#;
        let ParsedSitemap::Index(locs) = parse_sitemap(xml, 10_000) else { panic!("expected index") };
        assert_eq!(locs, vec!["https://example.com/sitemap-a.xml", "https://example.com/sitemap-b.xml"]);
    }

    #[test]
    fn rejects_non_http_loc_entries() {
        let xml = r#"<urlset><url><loc>ftp://example.com/a</loc></url></urlset>"#;
        let ParsedSitemap::UrlSet(entries) = parse_sitemap(xml, 10_000) else { panic!("expected urlset") };
        assert!(entries.is_empty());
    }

    #[test]
    fn caps_entries_at_max_entries() {
        let mut xml = String::from("<urlset>");
        for i in 0..5 {
            xml.push_str(&format!("<url><loc>https://example.com/{i}</loc></url>"));
        }
        xml.push_str("</urlset>");
        let ParsedSitemap::UrlSet(entries) = parse_sitemap(&xml, 3) else { panic!("expected urlset") };
        assert_eq!(entries.len(), 3);
    }
}
