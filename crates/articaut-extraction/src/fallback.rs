//! Fetch-level fallback chain (SPEC_FULL.md §4.H): site-specific JSON APIs
//! tried ahead of (or instead of) the DOM orchestrator, gated by the
//! content validator's verdict. This is the module that owns the
//! "site-specific API" concept, so WP AJAX detection and the Prism ANS
//! flattener live here rather than in `articaut-html`.

use std::collections::HashMap;

use articaut_html::dom;
use articaut_types::error::FetchError;
use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::ports::{HttpTransport, RequestOptions};
use articaut_types::{GOOD_CONTENT_LENGTH, MIN_CONTENT_LENGTH};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use crate::orchestrator::{self, OrchestratorConfig};

/// What the content validator decided about the raw HTML, collapsed to the
/// three branches the fallback chain's pseudocode switches on.
#[derive(Debug, Clone)]
pub enum ValidatorVerdict {
    Valid,
    InsufficientContent,
    Failed(FetchError),
}

const NEXT_DATA_ROUTE_WIDEN_CEILING: usize = 2000;

pub async fn resolve(
    transport: &dyn HttpTransport,
    html: &str,
    url: &Url,
    config: &OrchestratorConfig,
    verdict: ValidatorVerdict,
) -> Result<Extraction, FetchError> {
    match verdict {
        ValidatorVerdict::Failed(err) => Err(err),
        ValidatorVerdict::Valid => resolve_valid(transport, html, url, config).await,
        ValidatorVerdict::InsufficientContent => resolve_insufficient(transport, html, url, config).await,
    }
}

async fn resolve_valid(
    transport: &dyn HttpTransport,
    html: &str,
    url: &Url,
    config: &OrchestratorConfig,
) -> Result<Extraction, FetchError> {
    if config.is_mobile_api_site {
        if let Some(id) = mobile_article_id(html) {
            if let Some(e) = try_mobile_api(transport, config, &id).await {
                if e.len() >= MIN_CONTENT_LENGTH {
                    return Ok(e);
                }
            }
        }
    }

    if let Some(wp_href) = wp_rest_link(html, url) {
        if let Some(wp) = try_wp_rest(transport, &wp_href).await {
            if let Some(dom_candidate) = orchestrator::extract(html, url, None, config) {
                if dom_candidate.len() > 2 * wp.len() && dom_candidate.len() >= GOOD_CONTENT_LENGTH {
                    let mut enriched = dom_candidate;
                    enriched.compose_metadata_from(&wp);
                    return Ok(enriched);
                }
            }
            return Ok(wp);
        }
    }

    if let Some(prism) = prism_config(html) {
        if same_site(&prism.api_domain, url) {
            if let Some(p) = try_prism(transport, &prism, url, config).await {
                return Ok(p);
            }
        }
    }

    let mut result = orchestrator::extract(html, url, None, config)
        .ok_or_else(|| FetchError::ExtractionFailed { url: url.to_string(), hint: "no strategy produced content".into() })?;

    if result.len() < NEXT_DATA_ROUTE_WIDEN_CEILING && html.contains("__NEXT_DATA__") {
        if let Some(widened) = try_next_data_route(transport, html, url).await {
            if widened.len() > result.len() {
                result = widened;
            }
        }
    }

    Ok(result)
}

async fn resolve_insufficient(
    transport: &dyn HttpTransport,
    html: &str,
    url: &Url,
    config: &OrchestratorConfig,
) -> Result<Extraction, FetchError> {
    if config.is_mobile_api_site {
        if let Some(id) = mobile_article_id(html) {
            if let Some(e) = try_mobile_api(transport, config, &id).await {
                if e.len() >= MIN_CONTENT_LENGTH {
                    return Ok(e);
                }
            }
        }
    }

    if config.prefer_next_data {
        if let Some(e) = articaut_html::next_data::extract_with_path(&Html::parse_document(html), url, config.next_data_content_path.as_deref()) {
            if e.len() >= MIN_CONTENT_LENGTH {
                return Ok(e);
            }
        }
    }

    if let Some(wp_href) = wp_rest_link(html, url) {
        if let Some(wp) = try_wp_rest(transport, &wp_href).await {
            if wp.len() >= GOOD_CONTENT_LENGTH {
                return Ok(wp);
            }
        }
    }

    if let Some(prism) = prism_config(html) {
        if same_site(&prism.api_domain, url) {
            if let Some(p) = try_prism(transport, &prism, url, config).await {
                return Ok(p);
            }
        }
    }

    if let Some(ajax) = wp_ajax_target(html, url) {
        if let Some(e) = try_wp_ajax(transport, &ajax).await {
            if e.len() >= GOOD_CONTENT_LENGTH {
                return Ok(e);
            }
        }
    }

    Err(FetchError::ExtractionFailed { url: url.to_string(), hint: "validator reported insufficient content and every site-api fallback was exhausted".into() })
}

// ---- Mobile API -----------------------------------------------------------

fn mobile_article_id(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let el = dom::first(&doc, r#"meta[name="article.id"]"#)?;
    el.value().attr("content").map(str::to_string)
}

async fn try_mobile_api(transport: &dyn HttpTransport, config: &OrchestratorConfig, id: &str) -> Option<Extraction> {
    let template = config.mobile_api_url_template.as_deref()?;
    let api_url = template.replace("{id}", id);
    let response = transport.get(&api_url, &RequestOptions::default()).await.ok()?;
    let json: Value = serde_json::from_slice(&response.body).ok()?;
    let text_content = json.get("content").and_then(|v| v.as_str())?.to_string();
    if text_content.len() < MIN_CONTENT_LENGTH {
        return None;
    }
    let mut extraction = Extraction::new(MethodTag::MobileApi, text_content);
    extraction.title = json.get("title").and_then(|v| v.as_str()).map(str::to_string);
    Some(extraction)
}

// ---- WP REST ---------------------------------------------------------------

fn wp_rest_link(html: &str, page_url: &Url) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(r#"link[rel="alternate"][type="application/json"]"#).ok()?;
    for el in doc.select(&sel) {
        let Some(href) = el.value().attr("href") else { continue };
        if !href.contains("wp-json") {
            continue;
        }
        let Ok(resolved) = page_url.join(href) else { continue };
        if resolved.origin() == page_url.origin() {
            return Some(resolved.to_string());
        }
    }
    None
}

fn wp_post_to_extraction(post: &Value) -> Option<Extraction> {
    let content_html = post.get("content")?.get("rendered")?.as_str()?.to_string();
    let text_content = dom::text_of_fragment(&content_html);
    if text_content.len() < MIN_CONTENT_LENGTH {
        return None;
    }
    let mut extraction = Extraction::new(MethodTag::WpRestApi, text_content);
    extraction.content_html = Some(content_html);
    extraction.title = post.get("title").and_then(|t| t.get("rendered")).and_then(|v| v.as_str()).map(str::to_string);
    Some(extraction)
}

async fn try_wp_rest(transport: &dyn HttpTransport, href: &str) -> Option<Extraction> {
    let response = transport.get(href, &RequestOptions::default()).await.ok()?;
    let json: Value = serde_json::from_slice(&response.body).ok()?;
    match json {
        Value::Array(items) => items.first().and_then(wp_post_to_extraction),
        obj @ Value::Object(_) => wp_post_to_extraction(&obj),
        _ => None,
    }
}

// ---- Prism -------------------------------------------------------------

struct PrismConfig {
    api_domain: String,
    content_source: String,
}

fn prism_config(html: &str) -> Option<PrismConfig> {
    let doc = Html::parse_document(html);
    let root = articaut_html::next_data::parse(&doc)?;
    let runtime_config = root.get("runtimeConfig")?;
    let api_domain = runtime_config.get("CLIENT_SIDE_API_DOMAIN")?.as_str()?.to_string();
    let content_source = runtime_config.get("CONTENT_SOURCE")?.as_str()?.to_string();
    Some(PrismConfig { api_domain, content_source })
}

/// True when `candidate_host` shares the page's last two domain labels, or
/// is an exact match for an IP literal or single-label host — prevents the
/// Prism API-domain lookup from being steered at an arbitrary SSRF target.
fn same_site(candidate: &str, page_url: &Url) -> bool {
    let Some(page_host) = page_url.host_str() else { return false };
    let candidate_host = candidate
        .strip_prefix("https://")
        .or_else(|| candidate.strip_prefix("http://"))
        .unwrap_or(candidate)
        .split('/')
        .next()
        .unwrap_or(candidate);

    if candidate_host.parse::<std::net::IpAddr>().is_ok() || page_host.parse::<std::net::IpAddr>().is_ok() {
        return candidate_host == page_host;
    }

    fn labels_of(h: &str) -> Vec<&str> {
        h.split('.').collect()
    }
    let a = labels_of(candidate_host);
    let b = labels_of(page_host);
    if a.len() < 2 || b.len() < 2 {
        return candidate_host == page_host;
    }
    a[a.len() - 2..] == b[b.len() - 2..]
}

fn clamp_heading_level(level: u64) -> u64 {
    level.clamp(1, 6)
}

fn ans_content_elements_to_html(elements: &[Value]) -> String {
    let mut out = String::new();
    for el in elements {
        let el_type = el.get("type").and_then(|v| v.as_str()).unwrap_or("");
        match el_type {
            "text" => {
                if let Some(content) = el.get("content").and_then(|v| v.as_str()) {
                    out.push_str("<p>");
                    out.push_str(content);
                    out.push_str("</p>");
                }
            }
            "raw_html" => {
                if let Some(content) = el.get("content").and_then(|v| v.as_str()) {
                    out.push_str(content);
                }
            }
            "header" => {
                let level = clamp_heading_level(el.get("level").and_then(|v| v.as_u64()).unwrap_or(2));
                if let Some(text) = el.get("content").and_then(|v| v.as_str()) {
                    out.push_str(&format!("<h{level}>{text}</h{level}>"));
                }
            }
            "list" => {
                let ordered = el.get("list_type").and_then(|v| v.as_str()) == Some("ordered");
                let tag = if ordered { "ol" } else { "ul" };
                out.push_str(&format!("<{tag}>"));
                if let Some(items) = el.get("items").and_then(|v| v.as_array()) {
                    for item in items {
                        if let Some(text) = item.get("content").and_then(|v| v.as_str()) {
                            out.push_str(&format!("<li>{text}</li>"));
                        }
                    }
                }
                out.push_str(&format!("</{tag}>"));
            }
            _ => {}
        }
    }
    out
}

async fn try_prism(transport: &dyn HttpTransport, prism: &PrismConfig, page_url: &Url, config: &OrchestratorConfig) -> Option<Extraction> {
    let site = config.site_slug.clone().unwrap_or_else(|| page_url.host_str().unwrap_or_default().to_string());
    let canonical = serde_json::json!({ "canonical_url": page_url.path() });
    let query = urlencoding::encode(&canonical.to_string()).into_owned();
    let api_url = format!("{}/api/{}?_website={}&query={}", prism.api_domain.trim_end_matches('/'), prism.content_source, site, query);

    let response = transport.get(&api_url, &RequestOptions::default()).await.ok()?;
    let json: Value = serde_json::from_slice(&response.body).ok()?;
    let elements = json.get("content_elements")?.as_array()?;
    let raw_html = ans_content_elements_to_html(elements);
    let sanitized = dom::remove_matching(&raw_html, &["script", "style", "iframe"]);
    let text_content = dom::text_of_fragment(&sanitized);
    if text_content.len() < MIN_CONTENT_LENGTH {
        return None;
    }
    let mut extraction = Extraction::new(MethodTag::PrismContentApi, text_content);
    extraction.content_html = Some(sanitized);
    extraction.title = json.get("headlines").and_then(|h| h.get("basic")).and_then(|v| v.as_str()).map(str::to_string);
    Some(extraction)
}

// ---- WP AJAX ---------------------------------------------------------------

struct WpAjaxTarget {
    ajax_url: String,
    action: String,
    article_id: String,
}

fn wp_ajax_target(html: &str, page_url: &Url) -> Option<WpAjaxTarget> {
    let ajax_re = Regex::new(r#"ajaxurl\s*[:=]\s*["']([^"']+)["']"#).unwrap();
    let action_re = Regex::new(r#"action\s*:\s*["']([^"']+)["']"#).unwrap();
    let id_re = Regex::new(r#"(?:postId|articleId|post_id|article_id)\s*[:=]\s*["']?([0-9a-fA-F-]{8,}|[0-9]{2,})["']?"#).unwrap();

    let ajax_url_raw = ajax_re.captures(html)?.get(1)?.as_str().to_string();
    let action = action_re.captures(html)?.get(1)?.as_str().to_string();
    let article_id = id_re.captures(html)?.get(1)?.as_str().to_string();

    let resolved = page_url.join(&ajax_url_raw).ok()?;
    if resolved.origin() != page_url.origin() {
        return None;
    }
    Some(WpAjaxTarget { ajax_url: resolved.to_string(), action, article_id })
}

fn html_text_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.starts_with('<') {
        return Some(trimmed.to_string());
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        match value {
            Value::String(s) => return Some(s),
            Value::Object(map) => {
                for key in ["data", "content", "html"] {
                    if let Some(Value::String(s)) = map.get(key) {
                        return Some(s.clone());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

async fn try_wp_ajax(transport: &dyn HttpTransport, target: &WpAjaxTarget) -> Option<Extraction> {
    let mut form = HashMap::new();
    form.insert("action".to_string(), target.action.clone());
    form.insert("data[id]".to_string(), target.article_id.clone());

    let response = transport.post_form(&target.ajax_url, &form, &RequestOptions::default()).await.ok()?;
    let body = response.body_str();
    let html = html_text_from_body(&body)?;
    let text_content = dom::text_of_fragment(&html);
    if text_content.len() < MIN_CONTENT_LENGTH {
        return None;
    }
    let mut extraction = Extraction::new(MethodTag::WpAjaxContent, text_content);
    extraction.content_html = Some(html);
    Some(extraction)
}

// ---- Next-data-route widening ----------------------------------------------

async fn try_next_data_route(transport: &dyn HttpTransport, html: &str, url: &Url) -> Option<Extraction> {
    let build_id = {
        let doc = Html::parse_document(html);
        let root = articaut_html::next_data::parse(&doc)?;
        root.get("buildId")?.as_str()?.to_string()
    };

    let path = url.path().trim_start_matches('/');
    let route_path = if path.is_empty() { "index".to_string() } else { path.trim_end_matches('/').to_string() };
    let route_url = url.join(&format!("/_next/data/{build_id}/{route_path}.json")).ok()?;

    let response = transport.get(route_url.as_str(), &RequestOptions::default()).await.ok()?;
    let json: Value = serde_json::from_slice(&response.body).ok()?;
    let page_props = json.get("pageProps")?;
    let text = find_text_in_page_props(page_props)?;
    if text.len() < MIN_CONTENT_LENGTH {
        return None;
    }
    let extraction = Extraction::new(MethodTag::NextDataRoute, text);
    Some(extraction.tap_title(page_props))
}

fn find_text_in_page_props(page_props: &Value) -> Option<String> {
    for root_key in ["content", "article", "post", "data"] {
        if let Some(node) = page_props.get(root_key) {
            for leaf in ["body", "content"] {
                if let Some(Value::String(s)) = node.get(leaf) {
                    return Some(s.clone());
                }
            }
        }
    }
    None
}

trait TapTitle {
    fn tap_title(self, page_props: &Value) -> Extraction;
}

impl TapTitle for Extraction {
    fn tap_title(mut self, page_props: &Value) -> Extraction {
        self.title = page_props.get("title").and_then(|v| v.as_str()).map(str::to_string);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_site_accepts_shared_apex_domain() {
        let page = Url::parse("https://www.example.com/a").unwrap();
        assert!(same_site("https://api.example.com", &page));
        assert!(!same_site("https://api.other.com", &page));
    }

    #[test]
    fn same_site_requires_exact_match_for_ip_literals() {
        let page = Url::parse("http://203.0.113.5/a").unwrap();
        assert!(same_site("203.0.113.5", &page));
        assert!(!same_site("203.0.113.6", &page));
    }

    #[test]
    fn wp_ajax_target_requires_same_origin_ajax_url() {
        let html = r#"var ajaxurl = "https://evil.example/ajax"; action: "load_more"; postId: "12345";"#;
        let page = Url::parse("https://example.com/a").unwrap();
        assert!(wp_ajax_target(html, &page).is_none());
    }

    #[test]
    fn wp_ajax_target_parses_same_origin_fields() {
        let html = r#"var ajaxurl = "/wp-admin/admin-ajax.php"; action: "load_more"; postId: "98765";"#;
        let page = Url::parse("https://example.com/a").unwrap();
        let target = wp_ajax_target(html, &page).unwrap();
        assert_eq!(target.action, "load_more");
        assert_eq!(target.article_id, "98765");
    }

    #[test]
    fn html_text_from_body_accepts_raw_html() {
        assert_eq!(html_text_from_body("<p>hi</p>").as_deref(), Some("<p>hi</p>"));
    }

    #[test]
    fn html_text_from_body_accepts_json_wrapped_html() {
        let body = r#"{"data": "<p>hi</p>"}"#;
        assert_eq!(html_text_from_body(body).as_deref(), Some("<p>hi</p>"));
    }

    #[test]
    fn html_text_from_body_accepts_bare_json_string() {
        let body = r#""<p>hi</p>""#;
        assert_eq!(html_text_from_body(body).as_deref(), Some("<p>hi</p>"));
    }
}
