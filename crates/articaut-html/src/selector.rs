//! Selector cascade (SPEC_FULL.md §4.E.3): try a fixed ordered list of
//! container selectors, strip noise from the first match that clears the
//! content threshold.

use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::MIN_CONTENT_LENGTH;
use scraper::Html;
use url::Url;

use crate::dom::{first, remove_matching, text_of_fragment, NOISE_SELECTORS};

const CONTAINER_SELECTORS: &[(&str, &str)] = &[
    ("article", "article"),
    ("main-article", "main article"),
    ("role-main-article", "[role=main] article"),
    ("article-body", ".article-body"),
    ("post-content", ".post-content"),
    ("entry-content", ".entry-content"),
    ("story-body", ".story-body"),
    ("main", "main"),
    ("role-main", "[role=main]"),
];

pub fn extract(doc: &Html, _url: &Url) -> Option<Extraction> {
    for (tag, css) in CONTAINER_SELECTORS {
        let Some(el) = first(doc, css) else { continue };
        let raw_html = el.html();
        let cleaned_html = remove_matching(&raw_html, NOISE_SELECTORS);
        let text_content = text_of_fragment(&cleaned_html);
        if text_content.chars().count() < MIN_CONTENT_LENGTH {
            continue;
        }
        let mut extraction = Extraction::new(MethodTag::Selector, text_content);
        extraction.method_tag_suffix = Some(tag.to_string());
        extraction.content_html = Some(cleaned_html);
        return Some(extraction);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_matching_container_and_strips_noise() {
        let body = "word ".repeat(60);
        let html = format!(
            "<html><body><article><nav>skip this</nav><p>{body}</p></article></body></html>"
        );
        let doc = Html::parse_document(&html);
        let url = Url::parse("https://example.com").unwrap();
        let result = extract(&doc, &url).unwrap();
        assert_eq!(result.method_tag_suffix.as_deref(), Some("article"));
        assert!(!result.content_html.unwrap().contains("skip this"));
    }

    #[test]
    fn falls_through_to_later_selector_when_earlier_is_too_short() {
        let body = "word ".repeat(60);
        let html = format!(
            "<html><body><article>tiny</article><main>{body}</main></body></html>"
        );
        let doc = Html::parse_document(&html);
        let url = Url::parse("https://example.com").unwrap();
        let result = extract(&doc, &url).unwrap();
        assert_eq!(result.method_tag_suffix.as_deref(), Some("main"));
    }

    #[test]
    fn returns_none_when_no_container_has_enough_text() {
        let html = "<html><body><article>tiny</article></body></html>";
        let doc = Html::parse_document(html);
        let url = Url::parse("https://example.com").unwrap();
        assert!(extract(&doc, &url).is_none());
    }
}
