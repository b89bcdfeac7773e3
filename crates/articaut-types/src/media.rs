//! Media elements discovered inside an extracted article body.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaElement {
    Image { src: String, alt: Option<String> },
    Document { href: String, text: Option<String>, extension: String },
    Video { src: String, provider: Option<String> },
    Audio { src: String },
}

impl MediaElement {
    /// The resolved absolute URL this element points at, used as the dedup key.
    pub fn url(&self) -> &str {
        match self {
            MediaElement::Image { src, .. } => src,
            MediaElement::Document { href, .. } => href,
            MediaElement::Video { src, .. } => src,
            MediaElement::Audio { src, .. } => src,
        }
    }

    /// Deduplicate a list of media elements by resolved absolute URL,
    /// keeping the first occurrence of each.
    pub fn dedupe(elements: Vec<MediaElement>) -> Vec<MediaElement> {
        let mut seen = std::collections::HashSet::new();
        elements
            .into_iter()
            .filter(|m| seen.insert(m.url().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_occurrence_per_url() {
        let elements = vec![
            MediaElement::Image { src: "https://x/a.png".into(), alt: Some("first".into()) },
            MediaElement::Image { src: "https://x/a.png".into(), alt: Some("second".into()) },
            MediaElement::Video { src: "https://x/b.mp4".into(), provider: None },
        ];
        let deduped = MediaElement::dedupe(elements);
        assert_eq!(deduped.len(), 2);
        match &deduped[0] {
            MediaElement::Image { alt, .. } => assert_eq!(alt.as_deref(), Some("first")),
            _ => panic!("expected image"),
        }
    }
}
