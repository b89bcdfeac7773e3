//! Readability extractor (SPEC_FULL.md §4.E.1): a density-scoring pass over
//! candidate containers, run at a strict then a relaxed acceptance
//! threshold. There is no `readability`-family crate in the dependency
//! stack (see DESIGN.md), so this ports the scoring idea — text weight
//! minus link density, paragraph-count bonus — rather than a full
//! DOM-normalizing clone-and-mutate pipeline.

use articaut_types::extraction::{Extraction, MethodTag};
use articaut_types::MIN_CONTENT_LENGTH;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dom::collapsed_text;

const STRICT_THRESHOLD: usize = 500;
const RELAXED_THRESHOLD: usize = MIN_CONTENT_LENGTH;

const CANDIDATE_SELECTORS: &[&str] =
    &["article", "main", "[role=main]", "section", "div", "body"];

fn link_text_len(el: &ElementRef) -> usize {
    let sel = Selector::parse("a").unwrap();
    el.select(&sel).map(|a| a.text().collect::<String>().chars().count()).sum()
}

fn score(el: &ElementRef) -> f64 {
    let text = collapsed_text(el);
    let text_len = text.chars().count() as f64;
    if text_len == 0.0 {
        return 0.0;
    }
    let p_sel = Selector::parse("p").unwrap();
    let p_count = el.select(&p_sel).count() as f64;
    let comma_count = text.matches(',').count() as f64;
    let link_density = (link_text_len(el) as f64 / text_len).min(1.0);
    let base = text_len.sqrt() + comma_count + p_count * 3.0;
    base * (1.0 - link_density).max(0.15)
}

fn best_candidate<'a>(doc: &'a Html) -> Option<ElementRef<'a>> {
    let mut best: Option<(ElementRef<'a>, f64)> = None;
    for css in CANDIDATE_SELECTORS {
        let Ok(sel) = Selector::parse(css) else { continue };
        for el in doc.select(&sel) {
            let s = score(&el);
            if best.as_ref().map(|(_, b)| s > *b).unwrap_or(true) {
                best = Some((el, s));
            }
        }
    }
    best.map(|(el, _)| el)
}

pub fn extract(doc: &Html, _url: &Url) -> Option<Extraction> {
    let candidate = best_candidate(doc)?;
    let text_content = collapsed_text(&candidate);
    let len = text_content.chars().count();
    if len < RELAXED_THRESHOLD {
        return None;
    }

    let method_tag = if len >= STRICT_THRESHOLD { MethodTag::Readability } else { MethodTag::ReadabilityRelaxed };
    let content_html = candidate.html();
    let title = crate::dom::first(doc, "h1").map(|h| collapsed_text(&h));

    let mut extraction = Extraction::new(method_tag, text_content);
    extraction.content_html = Some(content_html);
    extraction.title = title;
    Some(extraction)
}
