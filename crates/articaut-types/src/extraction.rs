//! The `Extraction` record produced by a single strategy, plus the closed
//! set of method tags a strategy may report.

use serde::{Deserialize, Serialize};

use crate::media::MediaElement;

/// Stable identifier for the strategy that produced an `Extraction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodTag {
    Readability,
    ReadabilityRelaxed,
    NextRsc,
    NuxtPayload,
    ReactRouterHydration,
    NextData,
    NextDataHtml,
    NextDataRoute,
    JsonLd,
    Selector,
    TextDensity,
    WpRestApi,
    WpAjaxContent,
    PrismContentApi,
    MobileApi,
    PdfParse,
}

impl MethodTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodTag::Readability => "readability",
            MethodTag::ReadabilityRelaxed => "readability-relaxed",
            MethodTag::NextRsc => "next-rsc",
            MethodTag::NuxtPayload => "nuxt-payload",
            MethodTag::ReactRouterHydration => "react-router-hydration",
            MethodTag::NextData => "next-data",
            MethodTag::NextDataHtml => "next-data-html",
            MethodTag::NextDataRoute => "next-data-route",
            MethodTag::JsonLd => "json-ld",
            MethodTag::Selector => "selector",
            MethodTag::TextDensity => "text-density",
            MethodTag::WpRestApi => "wp-rest-api",
            MethodTag::WpAjaxContent => "wp-ajax-content",
            MethodTag::PrismContentApi => "prism-content-api",
            MethodTag::MobileApi => "mobile-api",
            MethodTag::PdfParse => "pdf-parse",
        }
    }

    /// Methods whose HTML is trusted as already-clean and skips the cleanup
    /// pass in the orchestrator's finalize step (§4.G step 11).
    pub fn skips_cleanup(&self) -> bool {
        matches!(
            self,
            MethodTag::NextData
                | MethodTag::NextRsc
                | MethodTag::JsonLd
                | MethodTag::NuxtPayload
                | MethodTag::ReactRouterHydration
                | MethodTag::WpAjaxContent
                | MethodTag::PrismContentApi
        )
    }
}

/// A single strategy's candidate output. `text_content.len() >=
/// MIN_CONTENT_LENGTH` is required for a strategy to return `Some`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub content_html: Option<String>,
    pub text_content: String,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    pub published_time: Option<String>,
    pub language: Option<String>,
    /// A selector-strategy method tag carries its selector as a suffix,
    /// e.g. `selector:article`; `method_tag_suffix` holds that suffix.
    pub method_tag: MethodTag,
    pub method_tag_suffix: Option<String>,
    pub markdown: Option<String>,
    pub media: Vec<MediaElement>,
    pub is_accessible_for_free: Option<bool>,
    pub declared_word_count: Option<u64>,
}

impl Extraction {
    pub fn new(method_tag: MethodTag, text_content: String) -> Self {
        Self {
            title: None,
            byline: None,
            content_html: None,
            text_content,
            excerpt: None,
            site_name: None,
            published_time: None,
            language: None,
            method_tag,
            method_tag_suffix: None,
            markdown: None,
            media: Vec::new(),
            is_accessible_for_free: None,
            declared_word_count: None,
        }
    }

    /// Full, stable method string, e.g. `selector:article` or `readability`.
    pub fn method_string(&self) -> String {
        match &self.method_tag_suffix {
            Some(suffix) => format!("{}:{}", self.method_tag.as_str(), suffix),
            None => self.method_tag.as_str().to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.text_content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text_content.is_empty()
    }

    pub fn meets_min(&self) -> bool {
        self.len() >= crate::MIN_CONTENT_LENGTH
    }

    pub fn meets_good(&self) -> bool {
        self.len() >= crate::GOOD_CONTENT_LENGTH
    }

    /// Fill any empty metadata field from another candidate, without
    /// touching fields that are already populated. Used by the orchestrator's
    /// metadata-composition step (§4.G step 10).
    pub fn compose_metadata_from(&mut self, other: &Extraction) {
        if self.byline.is_none() {
            self.byline = other.byline.clone();
        }
        if self.published_time.is_none() {
            self.published_time = other.published_time.clone();
        }
        if self.site_name.is_none() {
            self.site_name = other.site_name.clone();
        }
        if self.language.is_none() {
            self.language = other.language.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction(len: usize) -> Extraction {
        Extraction::new(MethodTag::Readability, "x".repeat(len))
    }

    #[test]
    fn meets_min_respects_threshold() {
        assert!(!extraction(99).meets_min());
        assert!(extraction(100).meets_min());
    }

    #[test]
    fn meets_good_respects_threshold() {
        assert!(!extraction(499).meets_good());
        assert!(extraction(500).meets_good());
    }

    #[test]
    fn method_string_includes_selector_suffix() {
        let mut e = extraction(100);
        e.method_tag = MethodTag::Selector;
        e.method_tag_suffix = Some("article".to_string());
        assert_eq!(e.method_string(), "selector:article");
    }

    #[test]
    fn compose_metadata_fills_only_empty_fields() {
        let mut winner = extraction(200);
        winner.byline = Some("Winner Byline".to_string());
        let mut other = extraction(100);
        other.byline = Some("Other Byline".to_string());
        other.site_name = Some("Other Site".to_string());

        winner.compose_metadata_from(&other);

        assert_eq!(winner.byline.as_deref(), Some("Winner Byline"));
        assert_eq!(winner.site_name.as_deref(), Some("Other Site"));
    }

    #[test]
    fn skips_cleanup_set_matches_trusted_raw_html_methods() {
        assert!(MethodTag::JsonLd.skips_cleanup());
        assert!(MethodTag::NextData.skips_cleanup());
        assert!(!MethodTag::Readability.skips_cleanup());
        assert!(!MethodTag::TextDensity.skips_cleanup());
    }
}
