//! CSS selector overlay (SPEC_FULL.md §4.E.8): caller-supplied `remove`
//! and `target` selectors applied to the raw HTML before anything is
//! parsed for real. `target` matching zero elements is a non-fatal
//! warning — the caller gets the unmodified document back.

use scraper::{Html, Selector};
use tracing::warn;

use crate::dom::remove_matching;

#[derive(Debug, Clone, Default)]
pub struct SelectorOverlay {
    pub remove: Vec<String>,
    pub target: Vec<String>,
}

impl SelectorOverlay {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.target.is_empty()
    }
}

pub fn apply(html: &str, overlay: &SelectorOverlay) -> String {
    if overlay.is_empty() {
        return html.to_string();
    }

    let removed = if overlay.remove.is_empty() {
        html.to_string()
    } else {
        let refs: Vec<&str> = overlay.remove.iter().map(String::as_str).collect();
        remove_matching(html, &refs)
    };

    if overlay.target.is_empty() {
        return removed;
    }

    let doc = Html::parse_document(&removed);
    let mut matched_html = String::new();
    let mut matched_any = false;
    for css in &overlay.target {
        let Ok(sel) = Selector::parse(css) else { continue };
        for el in doc.select(&sel) {
            matched_any = true;
            matched_html.push_str(&el.html());
        }
    }

    if !matched_any {
        warn!(?overlay.target, "selector overlay target matched nothing, proceeding unmodified");
        return removed;
    }

    format!("<html><head></head><body>{matched_html}</body></html>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_matching_elements_before_target() {
        let html = "<html><body><nav>nav</nav><article>keep</article></body></html>";
        let overlay = SelectorOverlay { remove: vec!["nav".into()], target: vec![] };
        let result = apply(html, &overlay);
        assert!(!result.contains("nav"));
        assert!(result.contains("keep"));
    }

    #[test]
    fn target_replaces_body_children_in_document_order() {
        let html = "<html><body><div class=a>first</div><div class=b>second</div></body></html>";
        let overlay = SelectorOverlay { remove: vec![], target: vec![".a".into(), ".b".into()] };
        let result = apply(html, &overlay);
        assert!(result.find("first").unwrap() < result.find("second").unwrap());
    }

    #[test]
    fn target_matching_nothing_is_non_fatal() {
        let html = "<html><body><p>content</p></body></html>";
        let overlay = SelectorOverlay { remove: vec![], target: vec![".missing".into()] };
        let result = apply(html, &overlay);
        assert!(result.contains("content"));
    }
}
