//! Nuxt payload extractor (SPEC_FULL.md §4.E.7): structurally analogous to
//! the Next.js data extractor — find the embedded JSON payload, walk it
//! for an article-shaped subtree. Nuxt 3's `__NUXT_DATA__` script is valid
//! JSON (a devalue-encoded array); Nuxt 2's `window.__NUXT__` assignment is
//! a JS expression, not JSON, and is out of scope here (documented in
//! DESIGN.md) — only the JSON-script-tag payload shape is supported.

use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::MIN_CONTENT_LENGTH;
use scraper::Html;
use serde_json::Value;
use url::Url;

const CONTENT_KEYS: &[&str] = &["content", "article", "post", "body", "text"];

fn find_article_text(value: &Value, depth: usize) -> Option<String> {
    if depth > 6 {
        return None;
    }
    match value {
        Value::Object(map) => {
            for key in CONTENT_KEYS {
                if let Some(Value::String(s)) = map.get(*key) {
                    if s.chars().count() >= MIN_CONTENT_LENGTH {
                        return Some(s.clone());
                    }
                }
            }
            for v in map.values() {
                if let Some(found) = find_article_text(v, depth + 1) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|v| find_article_text(v, depth + 1)),
        _ => None,
    }
}

pub fn extract(doc: &Html, _url: &Url) -> Option<Extraction> {
    let script = crate::dom::first(doc, "script#__NUXT_DATA__")?;
    let raw: String = script.text().collect();
    let root: Value = serde_json::from_str(raw.trim()).ok()?;
    let text_content = find_article_text(&root, 0)?;
    if text_content.chars().count() < MIN_CONTENT_LENGTH {
        return None;
    }
    Some(Extraction::new(MethodTag::NuxtPayload, text_content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_nested_payload_for_article_field() {
        let body = "word ".repeat(30);
        let json = format!(r#"{{"data":[{{"article":{{"content":"{body}"}}}}]}}"#);
        let html = format!(
            r#"<html><head><script id="__NUXT_DATA__" type="application/json">{json}</script></head><body></body></html>"#
        );
        let doc = Html::parse_document(&html);
        let url = Url::parse("https://example.com").unwrap();
        let result = extract(&doc, &url).unwrap();
        assert_eq!(result.method_tag, MethodTag::NuxtPayload);
    }

    #[test]
    fn returns_none_without_nuxt_data_script() {
        let doc = Html::parse_document("<html><body></body></html>");
        let url = Url::parse("https://example.com").unwrap();
        assert!(extract(&doc, &url).is_none());
    }
}
