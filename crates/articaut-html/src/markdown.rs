//! Markdown projection (SPEC_FULL.md §4.F): GFM conversion of the winning
//! content HTML via `htmd`, the markdown crate this pack's corpus reaches
//! for (see DESIGN.md). Plain-text methods skip conversion entirely and
//! reuse `text_content` as-is.

use htmd::HtmlToMarkdown;
use tracing::warn;

pub fn to_markdown(content_html: &str) -> String {
    let converter = HtmlToMarkdown::new();
    match converter.convert(content_html) {
        Ok(markdown) => markdown,
        Err(err) => {
            warn!(%err, "markdown conversion failed, falling back to stripped text");
            crate::dom::text_of_fragment(content_html)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_basic_formatting() {
        let html = "<p>Hello <strong>world</strong></p>";
        let md = to_markdown(html);
        assert!(md.contains("Hello"));
        assert!(md.contains("world"));
    }
}
