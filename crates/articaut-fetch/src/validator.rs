//! Content validator (SPEC_FULL.md §4.D): a pure, `O(n)` sequence of checks
//! run against a fetched HTML body before it reaches the extraction
//! orchestrator. No I/O happens here, which keeps it trivially testable
//! with string fixtures.

use articaut_types::error::FetchError;

const MIN_BODY_SIZE: usize = 5 * 1024;
const MIN_WORD_COUNT: usize = 100;
const ACCESS_RESTRICTED_CEILING: usize = 200;

/// Challenge-page container markers checked verbatim against the raw body.
const CHALLENGE_MARKERS: &[(&str, &str)] = &[
    ("cf-turnstile", "cloudflare_turnstile"),
    ("cf-challenge-running", "cloudflare_challenge"),
    ("g-recaptcha", "recaptcha"),
    ("h-captcha", "hcaptcha"),
    ("Just a moment...", "cloudflare_challenge"),
    ("Checking your browser before accessing", "cloudflare_challenge"),
];

/// Subscription/paywall gate phrases, checked only in the 100-199 word band.
const ACCESS_RESTRICTED_MARKERS: &[&str] = &[
    "to continue reading",
    "subscribe to continue",
    "this content is for subscribers only",
    "you have reached your article limit",
    "register to keep reading",
    "sign in to read more",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContent {
    pub word_count: usize,
    pub is_accessible_for_free: bool,
}

/// Run the full check sequence in spec order, short-circuiting on the first
/// failure. `content_type` is the first non-empty header value, already
/// resolved by the caller from a possibly array-valued header.
pub fn validate(url: &str, status: u16, content_type: Option<&str>, body: &str) -> Result<ValidatedContent, FetchError> {
    if !(200..=299).contains(&status) {
        return Err(FetchError::HttpStatus { url: url.to_string(), status });
    }

    if let Some(ct) = content_type {
        if !(ct.starts_with("text/html") || ct.starts_with("application/xhtml+xml")) {
            return Err(FetchError::WrongContentType { url: url.to_string(), content_type: Some(ct.to_string()) });
        }
    }

    if body.len() < MIN_BODY_SIZE {
        return Err(FetchError::BodyTooSmall { url: url.to_string(), size: body.len() });
    }

    if let Some(challenge_type) = detect_challenge(body) {
        return Err(FetchError::ChallengeDetected { url: url.to_string(), challenge_type: challenge_type.to_string() });
    }

    let stripped = strip_markup(body);
    let word_count = count_words(&stripped);
    if word_count < MIN_WORD_COUNT {
        return Err(FetchError::InsufficientContent { url: url.to_string(), word_count });
    }

    let is_accessible_for_free = !(word_count < ACCESS_RESTRICTED_CEILING && has_access_restricted_marker(body));
    if !is_accessible_for_free {
        return Err(FetchError::AccessRestricted { url: url.to_string() });
    }

    Ok(ValidatedContent { word_count, is_accessible_for_free })
}

fn detect_challenge(body: &str) -> Option<&'static str> {
    CHALLENGE_MARKERS.iter().find(|(marker, _)| body.contains(marker)).map(|(_, kind)| *kind)
}

fn has_access_restricted_marker(body: &str) -> bool {
    let lower = body.to_ascii_lowercase();
    ACCESS_RESTRICTED_MARKERS.iter().any(|marker| lower.contains(&marker.to_ascii_lowercase()))
}

/// Strip scripts, styles, comments, tags and numeric entities with a single
/// forward scan over the character stream. Each branch advances the cursor
/// monotonically, so there is no regex-style backtracking regardless of how
/// deeply `<script>` tags are nested or malformed.
fn strip_markup(html: &str) -> String {
    let chars: Vec<char> = html.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(len);
    let mut i = 0usize;

    while i < len {
        match chars[i] {
            '<' => {
                if starts_with_ci(&chars, i, "<!--") {
                    i = skip_until(&chars, i + 4, "-->");
                } else if starts_with_ci(&chars, i, "<script") {
                    i = skip_element_body(&chars, i, "</script>");
                } else if starts_with_ci(&chars, i, "<style") {
                    i = skip_element_body(&chars, i, "</style>");
                } else {
                    i = skip_tag(&chars, i);
                    out.push(' ');
                }
            }
            '&' if starts_with_ci(&chars, i, "&#") => {
                i = skip_until(&chars, i, ";");
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn starts_with_ci(chars: &[char], at: usize, pattern: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    if at + pat.len() > chars.len() {
        return false;
    }
    chars[at..at + pat.len()].iter().zip(pat.iter()).all(|(a, b)| a.eq_ignore_ascii_case(b))
}

/// Advance past `terminator`, inclusive; if never found, jumps to the end.
fn skip_until(chars: &[char], from: usize, terminator: &str) -> usize {
    let term: Vec<char> = terminator.chars().collect();
    let mut i = from;
    while i < chars.len() {
        if starts_with_ci(chars, i, terminator) {
            return i + term.len();
        }
        i += 1;
    }
    chars.len()
}

/// Skip a single tag (`<...>`), respecting quoted attribute values so a
/// literal `>` inside `href="x>y"` does not end the tag early.
fn skip_tag(chars: &[char], from: usize) -> usize {
    let mut i = from + 1;
    let mut quote: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return i + 1,
            None => {}
        }
        i += 1;
    }
    chars.len()
}

/// Skip an opening tag plus everything up to and including `close_tag`
/// (e.g. `</script>`), used for elements whose body is not markup.
fn skip_element_body(chars: &[char], from: usize, close_tag: &str) -> usize {
    let after_open = skip_tag(chars, from);
    skip_until(chars, after_open, close_tag)
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'   // CJK Unified Ideographs
        | '\u{3040}'..='\u{309F}' // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{AC00}'..='\u{D7A3}' // Hangul syllables
    )
}

/// CJK-aware word count: each CJK character counts as one word on its own;
/// everything else is tokenised on Unicode whitespace.
fn count_words(text: &str) -> usize {
    let mut count = 0usize;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            if in_word {
                count += 1;
                in_word = false;
            }
            count += 1;
        } else if c.is_whitespace() {
            if in_word {
                count += 1;
                in_word = false;
            }
        } else {
            in_word = true;
        }
    }
    if in_word {
        count += 1;
    }
    count
}
