//! Content cleanup (SPEC_FULL.md §4.F), run on the winning strategy's HTML
//! unless its method tag is in the raw-HTML-trusted set
//! ([`MethodTag::skips_cleanup`]).

use scraper::Html;
use std::collections::HashMap;

use crate::dom::{remove_matching, remove_where, text_of_fragment};

const CAPTION_SELECTORS: &[&str] = &["figcaption", "[itemprop=caption]"];

const BOILERPLATE_PATTERNS: &[&str] = &[
    "advertisement",
    "subscribe to continue",
    "sign up for our newsletter",
    "to continue reading",
    "this content is for subscribers only",
    "register to keep reading",
    "click here to subscribe",
    "related articles",
    "share this article",
];

const DEDUP_MIN_LEN: usize = 80;
const BOILERPLATE_MAX_LEN: usize = 200;

pub struct Cleaned {
    pub html: String,
    pub text: String,
}

fn is_boilerplate(text: &str) -> bool {
    if text.chars().count() > BOILERPLATE_MAX_LEN {
        return false;
    }
    let lower = text.to_ascii_lowercase();
    BOILERPLATE_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Drop every `<p>`/`<span>` duplicate whose trimmed, whitespace-collapsed
/// text is at least `DEDUP_MIN_LEN` chars, keeping the later occurrence —
/// preview blocks precede the article body on most publishers.
fn dedup_paragraphs(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    let sel = scraper::Selector::parse("p, span").unwrap();
    let mut occurrences: HashMap<String, Vec<String>> = HashMap::new();
    for el in doc.select(&sel) {
        let text = crate::dom::collapsed_text(&el);
        if text.chars().count() < DEDUP_MIN_LEN {
            continue;
        }
        occurrences.entry(text).or_default().push(el.html());
    }

    let mut to_remove = Vec::new();
    for htmls in occurrences.into_values() {
        if htmls.len() > 1 {
            to_remove.extend(htmls[..htmls.len() - 1].iter().cloned());
        }
    }
    to_remove.sort_by_key(|h| std::cmp::Reverse(h.len()));

    let mut out = html.to_string();
    for chunk in to_remove {
        if let Some(pos) = out.find(&chunk) {
            out.replace_range(pos..pos + chunk.len(), "");
        }
    }
    out
}

pub fn clean(html: &str) -> Cleaned {
    let no_captions = remove_matching(html, CAPTION_SELECTORS);
    let no_boilerplate = remove_where(&no_captions, "p, span", is_boilerplate);
    let deduped = dedup_paragraphs(&no_boilerplate);
    let text = text_of_fragment(&deduped);
    Cleaned { html: deduped, text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_figcaption_and_itemprop_caption() {
        let html = r#"<div><figure><img src=x><figcaption>a photo</figcaption></figure><p itemprop="caption">cap text</p></div>"#;
        let cleaned = clean(html);
        assert!(!cleaned.html.contains("a photo"));
        assert!(!cleaned.html.contains("cap text"));
    }

    #[test]
    fn removes_short_boilerplate_paragraphs() {
        let html = "<div><p>Subscribe to continue reading this premium article.</p><p>Real article text that should stay intact here.</p></div>";
        let cleaned = clean(html);
        assert!(!cleaned.text.to_ascii_lowercase().contains("subscribe"));
        assert!(cleaned.text.contains("Real article text"));
    }

    #[test]
    fn keeps_only_one_copy_of_duplicate_paragraph() {
        let long_text = "this exact paragraph appears twice in the document body and should only remain once after dedup";
        let html = format!("<div><p>{long_text}</p><p>intro preview</p><p>{long_text}</p></div>");
        let cleaned = clean(&html);
        assert_eq!(cleaned.html.matches(long_text).count(), 1);
    }

    #[test]
    fn long_paragraphs_are_not_treated_as_boilerplate() {
        let text = "advertisement ".repeat(40);
        let html = format!("<p>{text}</p>");
        let cleaned = clean(&html);
        assert!(cleaned.text.to_ascii_lowercase().contains("advertisement"));
    }
}
