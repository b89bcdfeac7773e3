//! React Router hydration extractor (SPEC_FULL.md §4.E.7): same shape as
//! the Nuxt payload pass, for apps that hydrate via
//! `window.__staticRouterHydrationData = JSON.parse("...")`.

use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::MIN_CONTENT_LENGTH;
use regex::Regex;
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

fn hydration_data_re() -> Regex {
    Regex::new(r#"__staticRouterHydrationData\s*=\s*JSON\.parse\((".*?")\)"#).unwrap()
}

pub fn extract(doc: &Html, _url: &Url) -> Option<Extraction> {
    let sel = scraper::Selector::parse("script:not([src])").unwrap();
    let re = hydration_data_re();
    for script in doc.select(&sel) {
        let raw: String = script.text().collect();
        let Some(cap) = re.captures(&raw) else { continue };
        let Ok(json_str) = serde_json::from_str::<String>(&cap[1]) else { continue };
        let Ok(root) = serde_json::from_str::<Value>(&json_str) else { continue };
        if let Some(text_content) = find_article_text(&root, 0) {
            if text_content.chars().count() >= MIN_CONTENT_LENGTH {
                return Some(Extraction::new(MethodTag::ReactRouterHydration, text_content));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_double_encoded_hydration_payload() {
        let body = "word ".repeat(30);
        let inner = format!(r#"{{"loaderData":{{"root":{{"article":{{"content":"{body}"}}}}}}}}"#);
        let inner_escaped = serde_json::to_string(&inner).unwrap();
        let html = format!(
            r#"<html><body><script>window.__staticRouterHydrationData = JSON.parse({inner_escaped})</script></body></html>"#
        );
        let doc = Html::parse_document(&html);
        let url = Url::parse("https://example.com").unwrap();
        let result = extract(&doc, &url).unwrap();
        assert_eq!(result.method_tag, MethodTag::ReactRouterHydration);
    }

    #[test]
    fn returns_none_without_hydration_script() {
        let doc = Html::parse_document("<html><body></body></html>");
        let url = Url::parse("https://example.com").unwrap();
        assert!(extract(&doc, &url).is_none());
    }
}
