//! Next.js RSC stream extractor (SPEC_FULL.md §4.E.6): harvests
//! `self.__next_f.push([1, "..."])` payload chunks, scans the concatenated
//! stream for RSC text-row markers, and keeps the runs that read like
//! natural-language prose rather than embedded JS/JSON.

use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::MIN_CONTENT_LENGTH;
use regex::Regex;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

const MIN_SEGMENT_LEN: usize = 100;

fn push_call_re() -> Regex {
    Regex::new(r#"self\.__next_f\.push\(\[(\d+),(".*?")\]\)"#).unwrap()
}

fn row_text_marker_re() -> Regex {
    Regex::new(r"[0-9a-f]+:T[0-9a-f]+,").unwrap()
}

fn next_row_prefix_re() -> Regex {
    Regex::new(r#"\n[0-9a-f]+:[A-Z\["\$]"#).unwrap()
}

fn harvest_chunks(doc: &Html) -> String {
    let sel = scraper::Selector::parse("script:not([src])").unwrap();
    let push_re = push_call_re();
    let mut stream = String::new();
    for script in doc.select(&sel) {
        let raw: String = script.text().collect();
        for cap in push_re.captures_iter(&raw) {
            if &cap[1] != "1" {
                continue;
            }
            if let Ok(unescaped) = serde_json::from_str::<String>(&cap[2]) {
                stream.push_str(&unescaped);
            }
        }
    }
    stream
}

fn is_natural_language(segment: &str) -> bool {
    let len = segment.chars().count();
    if len == 0 {
        return false;
    }
    let lt_per_100 = segment.matches('<').count() as f64 * 100.0 / len as f64;
    let js_symbols = segment.matches(|c| matches!(c, '{' | '}' | ';' | '=' | '>')).count();
    let js_per_100 = js_symbols as f64 * 100.0 / len as f64;
    let space_density = segment.chars().filter(|c| c.is_whitespace()).count() as f64 / len as f64;
    lt_per_100 < 5.0 && js_per_100 < 15.0 && space_density > 0.10
}

fn extract_segments(stream: &str) -> Vec<String> {
    let marker_re = row_text_marker_re();
    let boundary_re = next_row_prefix_re();
    let mut seen = HashSet::new();
    let mut segments = Vec::new();

    for marker in marker_re.find_iter(stream) {
        let start = marker.end();
        let rest = &stream[start..];
        let end = boundary_re.find(rest).map(|m| start + m.start()).unwrap_or(stream.len());
        let segment = stream[start..end].trim().to_string();
        if segment.chars().count() >= MIN_SEGMENT_LEN && is_natural_language(&segment) && seen.insert(segment.clone()) {
            segments.push(segment);
        }
    }
    segments
}

pub fn extract(doc: &Html, _url: &Url) -> Option<Extraction> {
    let stream = harvest_chunks(doc);
    if stream.is_empty() {
        return None;
    }
    let segments = extract_segments(&stream);
    let text_content = segments.join("\n\n");
    if text_content.chars().count() < MIN_CONTENT_LENGTH {
        return None;
    }
    Some(Extraction::new(MethodTag::NextRsc, text_content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_escape(s: &str) -> String {
        serde_json::to_string(s).unwrap()
    }

    #[test]
    fn harvests_and_filters_natural_language_segments() {
        let prose = "the quick brown fox jumps over the lazy dog near the riverbank ".repeat(3);
        let chunk = format!("1a:T200,{prose}\n1b:[\"code\",{{}}]");
        let escaped = json_escape(&chunk);
        let html = format!(
            r#"<html><body><script>self.__next_f.push([1,{escaped}])</script></body></html>"#
        );
        let doc = Html::parse_document(&html);
        let url = Url::parse("https://example.com").unwrap();
        let result = extract(&doc, &url).unwrap();
        assert!(result.text_content.contains("quick brown fox"));
    }

    #[test]
    fn ignores_non_type_1_pushes() {
        let escaped = json_escape("1a:T5,hello");
        let html = format!(r#"<script>self.__next_f.push([0,{escaped}])</script>"#);
        let doc = Html::parse_document(&format!("<html><body>{html}</body></html>"));
        let url = Url::parse("https://example.com").unwrap();
        assert!(extract(&doc, &url).is_none());
    }

    #[test]
    fn returns_none_when_no_push_calls_present() {
        let doc = Html::parse_document("<html><body><p>nothing here</p></body></html>");
        let url = Url::parse("https://example.com").unwrap();
        assert!(extract(&doc, &url).is_none());
    }
}
