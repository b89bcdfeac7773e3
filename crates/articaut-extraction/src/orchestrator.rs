//! Extraction orchestrator (SPEC_FULL.md §4.G): selector overlay, single
//! parse, config fast paths, the full strategy set, comparators, tiered
//! selection, metadata composition and finalize. The fetch-level site-API
//! fallback chain that wraps this (mobile API, WP REST, Prism, next-data
//! route widening) lives in [`crate::fallback`].

use articaut_html::overlay::SelectorOverlay;
use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::{GOOD_CONTENT_LENGTH, MIN_CONTENT_LENGTH};
use scraper::Html;
use url::Url;

/// Per-site overrides consumed from `articaut-config::SiteProfile` by the
/// facade, kept as plain fields here to avoid a dependency on the config
/// crate (this crate depends only on `articaut-types` and `articaut-html`).
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub prefer_next_data: bool,
    pub prefer_json_ld: bool,
    pub next_data_content_path: Option<String>,
    /// `true` when the site publishes a companion mobile JSON API, and a
    /// URL template with an `{id}` placeholder for it. Consulted only by
    /// the fetch-level fallback chain (§4.H), not the orchestrator itself.
    pub is_mobile_api_site: bool,
    pub mobile_api_url_template: Option<String>,
    /// Site slug used as the Prism `_website` query parameter. Falls back
    /// to the page's host when unset.
    pub site_slug: Option<String>,
}

const PRIORITY_ORDER: &[MethodTag] = &[
    MethodTag::Readability,
    MethodTag::NextRsc,
    MethodTag::NuxtPayload,
    MethodTag::ReactRouterHydration,
    MethodTag::NextData,
    MethodTag::JsonLd,
    MethodTag::Selector,
    MethodTag::TextDensity,
];

fn normalized_tag(e: &Extraction) -> MethodTag {
    match e.method_tag {
        MethodTag::NextDataHtml => MethodTag::NextData,
        other => other,
    }
}

fn run_all_strategies(doc: &Html, url: &Url, config: &OrchestratorConfig) -> Vec<Extraction> {
    let mut candidates = Vec::new();
    if let Some(e) = articaut_html::readability::extract(doc, url) {
        candidates.push(e);
    }
    if let Some(e) = articaut_html::next_rsc::extract(doc, url) {
        candidates.push(e);
    }
    if let Some(e) = articaut_html::nuxt::extract(doc, url) {
        candidates.push(e);
    }
    if let Some(e) = articaut_html::react_router::extract(doc, url) {
        candidates.push(e);
    }
    if let Some(e) = articaut_html::next_data::extract_with_path(doc, url, config.next_data_content_path.as_deref()) {
        candidates.push(e);
    }
    if let Some(e) = articaut_html::json_ld::extract(doc, url) {
        candidates.push(e);
    }
    if let Some(e) = articaut_html::selector::extract(doc, url) {
        candidates.push(e);
    }
    if let Some(e) = articaut_html::text_density::extract(doc, url) {
        candidates.push(e);
    }
    candidates
}

/// Suppress Readability when a richer structured source clearly dominates
/// it in length (§4.G step 6).
fn apply_comparators(mut candidates: Vec<Extraction>) -> Vec<Extraction> {
    let readability_len = candidates.iter().find(|e| e.method_tag == MethodTag::Readability).map(Extraction::len);
    let Some(readability_len) = readability_len else { return candidates };

    let dominates = |candidates: &[Extraction], tag: MethodTag| -> bool {
        candidates
            .iter()
            .find(|e| e.method_tag == tag)
            .map(|e| e.len() > 2 * readability_len && e.len() >= GOOD_CONTENT_LENGTH)
            .unwrap_or(false)
    };

    if dominates(&candidates, MethodTag::TextDensity) || dominates(&candidates, MethodTag::NextRsc) {
        candidates.retain(|e| e.method_tag != MethodTag::Readability);
    }
    candidates
}

fn select_winner(candidates: Vec<Extraction>) -> Option<Extraction> {
    // Tier 1: GOOD_CONTENT_LENGTH, selector:* excluded, longest wins.
    let good_tier_winner = candidates
        .iter()
        .filter(|e| e.method_tag != MethodTag::Selector && e.len() >= GOOD_CONTENT_LENGTH)
        .max_by_key(|e| e.len())
        .map(|e| e.method_string());
    if let Some(winner_method) = good_tier_winner {
        return candidates.into_iter().find(|e| e.method_string() == winner_method);
    }

    // Tier 2: fixed priority order, first to clear MIN_CONTENT_LENGTH.
    for tag in PRIORITY_ORDER {
        if let Some(pos) = candidates.iter().position(|e| normalized_tag(e) == *tag && e.len() >= MIN_CONTENT_LENGTH) {
            return Some(candidates.into_iter().nth(pos).unwrap());
        }
    }

    // Tier 3: partial result, first non-empty candidate.
    candidates.into_iter().find(|e| !e.is_empty())
}

fn compose_metadata(winner: &mut Extraction, metadata_pass: &articaut_html::json_ld::AccessMetadata, others: &[Extraction]) {
    if winner.byline.is_none() {
        winner.byline = metadata_pass.byline.clone();
    }
    if winner.published_time.is_none() {
        winner.published_time = metadata_pass.published_time.clone();
    }
    for other in others {
        winner.compose_metadata_from(other);
    }
}

fn finalize(mut winner: Extraction, url: &Url, metadata: &articaut_html::json_ld::AccessMetadata) -> Extraction {
    let content_html = winner.content_html.clone();

    if !winner.method_tag.skips_cleanup() {
        if let Some(html) = &content_html {
            let cleaned = articaut_html::cleanup::clean(html);
            winner.content_html = Some(cleaned.html.clone());
            winner.text_content = cleaned.text;
        }
    }

    winner.markdown = match &winner.content_html {
        Some(html) => Some(articaut_html::markdown::to_markdown(html)),
        None => Some(winner.text_content.clone()),
    };

    winner.media = match &winner.content_html {
        Some(html) => articaut_html::media::extract(html, url),
        None => Vec::new(),
    };

    if winner.is_accessible_for_free.is_none() {
        winner.is_accessible_for_free = metadata.is_accessible_for_free;
    }
    if winner.declared_word_count.is_none() {
        winner.declared_word_count = metadata.word_count;
    }

    winner
}

/// Run the full orchestrator pipeline over a raw HTML document.
pub fn extract(raw_html: &str, url: &Url, overlay: Option<&SelectorOverlay>, config: &OrchestratorConfig) -> Option<Extraction> {
    let overlaid_html = match overlay {
        Some(overlay) => articaut_html::overlay::apply(raw_html, overlay),
        None => raw_html.to_string(),
    };
    let doc = Html::parse_document(&overlaid_html);
    let metadata = articaut_html::json_ld::extract_metadata(&doc);

    if config.prefer_next_data {
        if let Some(e) = articaut_html::next_data::extract_with_path(&doc, url, config.next_data_content_path.as_deref()) {
            if e.len() >= GOOD_CONTENT_LENGTH {
                return Some(finalize(e, url, &metadata));
            }
        }
    }
    if config.prefer_json_ld {
        if let Some(e) = articaut_html::json_ld::extract(&doc, url) {
            if e.len() >= GOOD_CONTENT_LENGTH {
                return Some(finalize(e, url, &metadata));
            }
        }
    }

    let candidates = apply_comparators(run_all_strategies(&doc, url, config));
    let others: Vec<Extraction> = candidates.clone();
    let mut winner = select_winner(candidates)?;
    compose_metadata(&mut winner, &metadata, &others);
    Some(finalize(winner, url, &metadata))
}
