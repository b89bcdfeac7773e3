//! Shared DOM helpers (SPEC_FULL.md §9: parse once, operate on `&Html`).
//!
//! `scraper`'s tree is read-only from the outside without reaching into
//! `ego_tree` directly, so removal-style operations here work at the string
//! level: select the exact outer HTML of elements to drop, then splice them
//! out of the serialized document. This keeps every strategy a pure
//! function over `&Html` without needing tree-mutation plumbing.

use scraper::{ElementRef, Html, Selector};

/// Parse a CSS selector list, skipping any that fail to compile rather than
/// aborting the whole pass — noise-selector lists accumulate over time and
/// an unsupported pseudo-class in one entry shouldn't sink the rest.
pub fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter().filter_map(|s| Selector::parse(s).ok()).collect()
}

pub fn select_all<'a>(html: &'a Html, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
    html.select(selector)
}

pub fn first<'a>(html: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(css).ok()?;
    html.select(&sel).next()
}

/// Text content of an element, collapsing internal whitespace runs.
pub fn collapsed_text(el: &ElementRef) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove every element matching any of `selectors` from `html_fragment`,
/// splicing their exact serialized outer HTML out of the string.
pub fn remove_matching(html_fragment: &str, selector_list: &[&str]) -> String {
    let mut out = html_fragment.to_string();
    let doc = Html::parse_fragment(&out);
    let mut removals: Vec<String> = Vec::new();
    for sel in selectors(selector_list) {
        for el in doc.select(&sel) {
            removals.push(el.html());
        }
    }
    // Longest first so a removed child doesn't leave an orphaned fragment
    // of a parent that was also selected.
    removals.sort_by_key(|b| std::cmp::Reverse(b.len()));
    for chunk in removals {
        if let Some(pos) = out.find(&chunk) {
            out.replace_range(pos..pos + chunk.len(), "");
        }
    }
    out
}

/// Parse plain text out of an HTML fragment/document string.
pub fn text_of_fragment(html_fragment: &str) -> String {
    let doc = Html::parse_fragment(html_fragment);
    collapse_whitespace(&doc.root_element().text().collect::<Vec<_>>().join(" "))
}

/// Remove every element matching `css` for which `predicate(trimmed_text)`
/// is true, using the same splice-by-serialized-html approach as
/// [`remove_matching`].
pub fn remove_where(html_fragment: &str, css: &str, predicate: impl Fn(&str) -> bool) -> String {
    let mut out = html_fragment.to_string();
    let doc = Html::parse_fragment(&out);
    let Ok(sel) = Selector::parse(css) else { return out };
    let mut removals: Vec<String> = Vec::new();
    for el in doc.select(&sel) {
        let text = collapsed_text(&el);
        if predicate(text.trim()) {
            removals.push(el.html());
        }
    }
    removals.sort_by_key(|b| std::cmp::Reverse(b.len()));
    for chunk in removals {
        if let Some(pos) = out.find(&chunk) {
            out.replace_range(pos..pos + chunk.len(), "");
        }
    }
    out
}

pub const NOISE_SELECTORS: &[&str] = &[
    "script", "style", "nav", "aside", "footer", "header", "form", "iframe", "noscript", "svg",
    ".ads", ".advertisement", ".social-share", ".related-articles", ".comments", ".newsletter-signup",
    "[aria-hidden=true]",
];
