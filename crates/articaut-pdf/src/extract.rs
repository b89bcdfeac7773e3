//! PDF text and title extraction via `lopdf` (SPEC_FULL.md §4.M). Walks each
//! page's decoded content stream and pulls text out of the `Tj`/`TJ`/`'`
//! show-text operators — `lopdf` parses PDF structure but leaves content
//! stream interpretation to the caller.

use articaut_types::error::FetchError;
use articaut_types::extraction::{Extraction, MethodTag};
use lopdf::{Document, Object};
use url::Url;

fn load(bytes: &[u8], url: &Url) -> Result<Document, FetchError> {
    if bytes.len() < 10 || !bytes.starts_with(b"%PDF-") {
        return Err(FetchError::PdfFetchFailed { url: url.to_string(), message: "missing %PDF- signature".into() });
    }
    Document::load_mem(bytes).map_err(|e| FetchError::PdfFetchFailed { url: url.to_string(), message: e.to_string() })
}

fn decode_pdf_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.peek() {
            Some('n') => { chars.next(); result.push('\n'); }
            Some('r') => { chars.next(); result.push('\r'); }
            Some('t') => { chars.next(); result.push('\t'); }
            Some(&c @ ('(' | ')' | '\\')) => { chars.next(); result.push(c); }
            _ => result.push(ch),
        }
    }
    result
}

fn text_from_tj_array(line: &str) -> String {
    let mut result = String::new();
    let mut in_string = false;
    let mut current = String::new();
    for ch in line.chars() {
        match ch {
            '(' if !in_string => { in_string = true; current.clear(); }
            ')' if in_string => { in_string = false; result.push_str(&decode_pdf_string(&current)); result.push(' '); }
            c if in_string => current.push(c),
            _ => {}
        }
    }
    result
}

fn text_from_show_operator(line: &str) -> Option<String> {
    if line.contains("TJ") {
        return Some(text_from_tj_array(line));
    }
    if line.contains("Tj") || line.contains('\'') {
        let start = line.find('(')?;
        let end = line.rfind(')')?;
        if start < end {
            return Some(decode_pdf_string(&line[start + 1..end]));
        }
    }
    None
}

fn text_from_content_stream(content: &[u8]) -> String {
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current = String::new();

    for line in content.split(|&b| b == b'\n') {
        let line_str = String::from_utf8_lossy(line);
        if line_str.contains("BT") {
            in_text_block = true;
            continue;
        }
        if line_str.contains("ET") {
            in_text_block = false;
            if !current.is_empty() {
                text.push_str(current.trim_end());
                text.push('\n');
                current.clear();
            }
            continue;
        }
        if in_text_block {
            if let Some(extracted) = text_from_show_operator(&line_str) {
                current.push_str(&extracted);
            }
        }
    }
    text
}

fn extract_text(document: &Document) -> String {
    let mut pages: Vec<_> = document.get_pages().into_iter().collect();
    pages.sort_by_key(|(number, _)| *number);

    let mut text = String::new();
    for (_, page_id) in pages {
        let Ok(content) = document.get_page_content(page_id) else { continue };
        text.push_str(&text_from_content_stream(&content));
        text.push('\n');
    }
    text.trim().to_string()
}

fn info_dict_string(document: &Document, key: &[u8]) -> Option<String> {
    let info_ref = document.trailer.get(b"Info").ok()?;
    let Object::Reference(id) = info_ref else { return None };
    let Object::Dictionary(dict) = document.get_object(*id).ok()? else { return None };
    match dict.get(key).ok()? {
        Object::String(bytes, _) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

pub fn extract(bytes: &[u8], url: &Url) -> Result<Extraction, FetchError> {
    let document = load(bytes, url)?;
    let text_content = extract_text(&document);

    if text_content.len() < articaut_types::MIN_CONTENT_LENGTH {
        return Err(FetchError::PdfFetchFailed { url: url.to_string(), message: "extracted text below minimum content length".into() });
    }

    let mut extraction = Extraction::new(MethodTag::PdfParse, text_content);
    extraction.title = info_dict_string(&document, b"Title");
    extraction.byline = info_dict_string(&document, b"Author");
    Ok(extraction)
}
