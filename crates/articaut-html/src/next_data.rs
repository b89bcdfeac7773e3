//! Next.js `__NEXT_DATA__` extractor (SPEC_FULL.md §4.E.5): three-tier
//! content resolution (site-configured path, auto-probe, default walker)
//! plus block-type flattening for the structured-block body shape.

use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::MIN_CONTENT_LENGTH;
use scraper::Html;
use serde_json::Value;
use url::Url;

use crate::dom::text_of_fragment;

const SKIPPED_BLOCK_TYPES: &[&str] = &["inline-newsletter", "ad", "related-content", "inline-recirc"];
const AUTO_PROBE_ROOTS: &[&str] = &["content", "article", "post", "data"];
const AUTO_PROBE_LEAVES: &[&str] = &["body", "content"];

pub fn parse(doc: &Html) -> Option<Value> {
    let script = crate::dom::first(doc, "script#__NEXT_DATA__")?;
    let raw: String = script.text().collect();
    serde_json::from_str(raw.trim()).ok()
}

fn walk_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = current.get(segment)?;
    }
    Some(current)
}

fn page_props(root: &Value) -> Option<&Value> {
    root.get("props")?.get("pageProps")
}

fn auto_probe(root: &Value) -> Option<&Value> {
    let page_props = page_props(root)?;
    for rootkey in AUTO_PROBE_ROOTS {
        let Some(node) = page_props.get(rootkey) else { continue };
        for leaf in AUTO_PROBE_LEAVES {
            if let Some(found) = node.get(leaf) {
                return Some(found);
            }
        }
    }
    None
}

fn default_walker(root: &Value) -> Option<&Value> {
    walk_path(page_props(root)?, "story.body.content")
}

fn resolve_content<'a>(root: &'a Value, configured_path: Option<&str>) -> Option<&'a Value> {
    if let Some(path) = configured_path {
        if let Some(found) = walk_path(root, path) {
            return Some(found);
        }
    }
    auto_probe(root).or_else(|| default_walker(root))
}

fn flatten_blocks(blocks: &[Value], out: &mut String) {
    for block in blocks {
        let block_type = block.get("type").and_then(|v| v.as_str()).unwrap_or("").to_ascii_lowercase();
        if SKIPPED_BLOCK_TYPES.contains(&block_type.as_str()) {
            continue;
        }
        match block_type.as_str() {
            "paragraph" | "heading" | "subheading" => {
                if let Some(text) = block.get("content").and_then(|v| v.as_str()) {
                    out.push_str(text);
                    out.push_str("\n\n");
                }
            }
            "unordered_list" | "ordered_list" => {
                if let Some(items) = block.get("items").and_then(|v| v.as_array()) {
                    for item in items {
                        if let Some(text) = item.as_str() {
                            out.push_str("- ");
                            out.push_str(text);
                            out.push('\n');
                        }
                    }
                    out.push('\n');
                }
            }
            _ => {}
        }
        if let Some(components) = block.get("components").and_then(|v| v.as_array()) {
            flatten_blocks(components, out);
        }
    }
}

pub fn extract_with_path(doc: &Html, _url: &Url, configured_path: Option<&str>) -> Option<Extraction> {
    let root = parse(doc)?;
    let content = resolve_content(&root, configured_path)?;

    let (method_tag, text_content, content_html) = match content {
        Value::String(s) if s.contains('<') && s.contains('>') => {
            let text = text_of_fragment(s);
            (MethodTag::NextDataHtml, text, Some(s.clone()))
        }
        Value::String(s) => (MethodTag::NextData, s.clone(), None),
        Value::Array(blocks) => {
            let mut text = String::new();
            flatten_blocks(blocks, &mut text);
            (MethodTag::NextData, text.trim().to_string(), None)
        }
        _ => return None,
    };

    if text_content.chars().count() < MIN_CONTENT_LENGTH {
        return None;
    }

    let mut extraction = Extraction::new(method_tag, text_content);
    extraction.content_html = content_html;
    let page_props = page_props(&root);
    extraction.title = page_props
        .and_then(|p| p.get("title").or_else(|| p.get("headline")))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    Some(extraction)
}

pub fn extract(doc: &Html, url: &Url) -> Option<Extraction> {
    extract_with_path(doc, url, None)
}
