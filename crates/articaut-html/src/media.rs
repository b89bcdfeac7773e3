//! Media extraction (SPEC_FULL.md §4.E/§4.G step 11): pulls images, linked
//! documents, video and audio elements out of the cleaned content HTML,
//! resolving every URL against the page URL before deduping.

use articaut_types::media::MediaElement;
use scraper::{Html, Selector};
use url::Url;

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"];

fn resolve(base: &Url, maybe_relative: &str) -> Option<String> {
    base.join(maybe_relative).ok().map(|u| u.to_string())
}

fn extension_of(path: &str) -> Option<String> {
    path.rsplit('.').next().filter(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())).map(str::to_ascii_lowercase)
}

pub fn extract(content_html: &str, base_url: &Url) -> Vec<MediaElement> {
    let doc = Html::parse_fragment(content_html);
    let mut elements = Vec::new();

    if let Ok(sel) = Selector::parse("img[src]") {
        for el in doc.select(&sel) {
            if let Some(src) = el.value().attr("src").and_then(|s| resolve(base_url, s)) {
                elements.push(MediaElement::Image { src, alt: el.value().attr("alt").map(str::to_string) });
            }
        }
    }

    if let Ok(sel) = Selector::parse("video source[src], video[src]") {
        for el in doc.select(&sel) {
            if let Some(src) = el.value().attr("src").and_then(|s| resolve(base_url, s)) {
                elements.push(MediaElement::Video { src, provider: None });
            }
        }
    }

    if let Ok(sel) = Selector::parse("audio source[src], audio[src]") {
        for el in doc.select(&sel) {
            if let Some(src) = el.value().attr("src").and_then(|s| resolve(base_url, s)) {
                elements.push(MediaElement::Audio { src });
            }
        }
    }

    if let Ok(sel) = Selector::parse("a[href]") {
        for el in doc.select(&sel) {
            let Some(href) = el.value().attr("href") else { continue };
            let Some(extension) = extension_of(href) else { continue };
            if let Some(resolved) = resolve(base_url, href) {
                let text = el.text().collect::<String>().trim().to_string();
                elements.push(MediaElement::Document {
                    href: resolved,
                    text: if text.is_empty() { None } else { Some(text) },
                    extension,
                });
            }
        }
    }

    MediaElement::dedupe(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_image_src_against_base_url() {
        let html = r#"<img src="/img/a.png" alt="pic">"#;
        let base = Url::parse("https://example.com/articles/1").unwrap();
        let media = extract(html, &base);
        assert_eq!(media.len(), 1);
        match &media[0] {
            MediaElement::Image { src, alt } => {
                assert_eq!(src, "https://example.com/img/a.png");
                assert_eq!(alt.as_deref(), Some("pic"));
            }
            _ => panic!("expected image"),
        }
    }

    #[test]
    fn extracts_and_dedupes_document_links() {
        let html = r#"<a href="/report.pdf">Report</a><a href="/report.pdf">Again</a><a href="/page">Not a doc</a>"#;
        let base = Url::parse("https://example.com/").unwrap();
        let media = extract(html, &base);
        assert_eq!(media.len(), 1);
        match &media[0] {
            MediaElement::Document { extension, .. } => assert_eq!(extension, "pdf"),
            _ => panic!("expected document"),
        }
    }
}
