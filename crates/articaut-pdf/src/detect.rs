//! PDF branch entry detection (SPEC_FULL.md §4.M): URL extension and
//! Content-Type sniffing, checked before the byte-level `%PDF-` signature
//! so a mislabeled response still gets one more chance via the magic bytes.

use url::Url;

pub fn is_pdf_url(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

pub fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type.map(|ct| ct.to_ascii_lowercase().contains("application/pdf")).unwrap_or(false)
}

pub fn has_pdf_signature(body: &[u8]) -> bool {
    body.starts_with(b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pdf_by_url_extension_case_insensitively() {
        let url = Url::parse("https://example.com/reports/Q3.PDF").unwrap();
        assert!(is_pdf_url(&url));
    }

    #[test]
    fn rejects_non_pdf_url() {
        let url = Url::parse("https://example.com/article").unwrap();
        assert!(!is_pdf_url(&url));
    }

    #[test]
    fn detects_pdf_by_content_type_with_charset_suffix() {
        assert!(is_pdf_content_type(Some("application/pdf; charset=binary")));
        assert!(!is_pdf_content_type(Some("text/html")));
        assert!(!is_pdf_content_type(None));
    }

    #[test]
    fn signature_check_requires_exact_prefix() {
        assert!(has_pdf_signature(b"%PDF-1.7\n..."));
        assert!(!has_pdf_signature(b"<html>"));
    }
}
