//! JSON-LD extractor (SPEC_FULL.md §4.E.2): flattens every
//! `<script type="application/ld+json">` payload, including `@graph`
//! arrays, and pulls article content or access metadata out of the first
//! matching item.

use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::MIN_CONTENT_LENGTH;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

const ARTICLE_TYPES: &[&str] =
    &["Article", "NewsArticle", "BlogPosting", "WebPage", "ReportageNewsArticle"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessMetadata {
    pub is_accessible_for_free: Option<bool>,
    pub word_count: Option<u64>,
    pub byline: Option<String>,
    pub published_time: Option<String>,
}

fn script_payloads(doc: &Html) -> Vec<Value> {
    let Ok(sel) = Selector::parse(r#"script[type="application/ld+json"]"#) else { return Vec::new() };
    let mut out = Vec::new();
    for el in doc.select(&sel) {
        let raw: String = el.text().collect();
        if let Ok(value) = serde_json::from_str::<Value>(raw.trim()) {
            flatten_into(value, &mut out);
        }
    }
    out
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Value::Object(ref map) => {
            if let Some(graph) = map.get("@graph").cloned() {
                flatten_into(graph, out);
            }
            out.push(value);
        }
        _ => {}
    }
}

fn type_matches(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(t)) => ARTICLE_TYPES.contains(&t.as_str()),
        Some(Value::Array(types)) => {
            types.iter().any(|t| t.as_str().map(|s| ARTICLE_TYPES.contains(&s)).unwrap_or(false))
        }
        _ => false,
    }
}

fn str_field(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn byline_of(item: &Value) -> Option<String> {
    match item.get("author") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(a)) => a.get("name").and_then(|v| v.as_str()).map(str::to_string),
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(|a| a.get("name").and_then(|v| v.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
            .into(),
        _ => None,
    }
}

pub fn extract(doc: &Html, _url: &Url) -> Option<Extraction> {
    for item in script_payloads(doc) {
        if !type_matches(&item) {
            continue;
        }
        let text_content = str_field(&item, "articleBody")
            .or_else(|| str_field(&item, "text"))
            .or_else(|| str_field(&item, "description"))?;
        if text_content.chars().count() < MIN_CONTENT_LENGTH {
            continue;
        }
        let mut extraction = Extraction::new(MethodTag::JsonLd, text_content);
        extraction.title = str_field(&item, "headline").or_else(|| str_field(&item, "name"));
        extraction.byline = byline_of(&item);
        extraction.published_time = str_field(&item, "datePublished");
        extraction.site_name =
            item.get("publisher").and_then(|p| p.get("name")).and_then(|v| v.as_str()).map(str::to_string);
        return Some(extraction);
    }
    None
}

/// Metadata-only pass (no content-length gate): used to backfill whatever
/// strategy ultimately wins.
pub fn extract_metadata(doc: &Html) -> AccessMetadata {
    for item in script_payloads(doc) {
        if !type_matches(&item) {
            continue;
        }
        return AccessMetadata {
            is_accessible_for_free: item.get("isAccessibleForFree").and_then(|v| v.as_bool()),
            word_count: item.get("wordCount").and_then(|v| v.as_u64()),
            byline: byline_of(&item),
            published_time: str_field(&item, "datePublished"),
        };
    }
    AccessMetadata::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(ld: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><head><script type="application/ld+json">{ld}</script></head><body></body></html>"#
        ))
    }

    #[test]
    fn extracts_article_body_from_news_article() {
        let body = "word ".repeat(30);
        let ld = format!(
            r#"{{"@type":"NewsArticle","headline":"Title","articleBody":"{body}","author":{{"name":"Jane"}}}}"#
        );
        let doc = doc_with(&ld);
        let url = Url::parse("https://example.com").unwrap();
        let result = extract(&doc, &url).unwrap();
        assert_eq!(result.title.as_deref(), Some("Title"));
        assert_eq!(result.byline.as_deref(), Some("Jane"));
    }

    #[test]
    fn flattens_graph_array() {
        let body = "word ".repeat(30);
        let ld = format!(r#"{{"@graph":[{{"@type":"WebPage"}},{{"@type":"Article","articleBody":"{body}"}}]}}"#);
        let doc = doc_with(&ld);
        let url = Url::parse("https://example.com").unwrap();
        assert!(extract(&doc, &url).is_some());
    }

    #[test]
    fn metadata_pass_ignores_content_length() {
        let ld = r#"{"@type":"Article","isAccessibleForFree":false,"wordCount":42}"#;
        let doc = doc_with(ld);
        let meta = extract_metadata(&doc);
        assert_eq!(meta.is_accessible_for_free, Some(false));
        assert_eq!(meta.word_count, Some(42));
    }

    #[test]
    fn rejects_unlisted_type() {
        let ld = r#"{"@type":"Organization","articleBody":"whatever"}"#;
        let doc = doc_with(ld);
        let url = Url::parse("https://example.com").unwrap();
        assert!(extract(&doc, &url).is_none());
    }
}
