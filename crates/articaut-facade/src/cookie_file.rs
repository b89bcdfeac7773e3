//! Netscape-format cookie file parsing for the `cookie_file` fetch option.
//! Each record is filtered against the request domain/path/secure-ness at
//! the call site, not here — this module only parses the file.

use articaut_types::ports::Cookie;

use crate::error::{FacadeError, FacadeResult};

/// Parse a Netscape cookie-jar file (tab-separated: domain, include-subdomains
/// flag, path, secure flag, expiry unix timestamp, name, value).
pub fn parse(content: &str) -> FacadeResult<Vec<Cookie>> {
    let mut cookies = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 7 {
            return Err(FacadeError::CookieFile(format!("expected 7 tab-separated fields, got {}: {line:?}", parts.len())));
        }

        let domain = parts[0].to_string();
        let path = if parts[2].is_empty() { "/".to_string() } else { parts[2].to_string() };
        let secure = parts[3].eq_ignore_ascii_case("TRUE");
        let expires = match parts[4].parse::<i64>() {
            Ok(0) => None,
            Ok(ts) => Some(ts),
            Err(_) => return Err(FacadeError::CookieFile(format!("invalid expiry timestamp {:?}", parts[4]))),
        };
        let name = parts[5].to_string();
        let value = parts[6].to_string();

        cookies.push(Cookie { name, value, domain, path, expires, http_only: false, secure });
    }

    Ok(cookies)
}

/// Cookies whose domain matches `host` (exact or as a parent domain) and
/// whose path is a prefix of `request_path`, excluding `Secure` cookies
/// when the request is not over HTTPS.
pub fn applicable<'a, 'b, 'c>(
    cookies: &'a [Cookie],
    host: &'b str,
    request_path: &'c str,
    is_https: bool,
) -> impl Iterator<Item = &'a Cookie> + use<'a, 'b, 'c> {
    cookies.iter().filter(move |c| {
        let domain = c.domain.trim_start_matches('.');
        let domain_matches = host == domain || host.ends_with(&format!(".{domain}"));
        domain_matches && request_path.starts_with(&c.path) && (is_https || !c.secure)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_netscape_file() {
        let content = "# Netscape HTTP Cookie File\nexample.com\tFALSE\t/\tTRUE\t0\tsession\tabc123\n";
        let cookies = parse(content).unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "session");
        assert_eq!(cookies[0].value, "abc123");
        assert!(cookies[0].secure);
        assert_eq!(cookies[0].expires, None);
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let content = "\n# comment\n\nexample.com\tFALSE\t/\tFALSE\t0\ta\tb\n";
        assert_eq!(parse(content).unwrap().len(), 1);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let content = "example.com\tFALSE\t/\n";
        assert!(parse(content).is_err());
    }

    #[test]
    fn applicable_filters_by_domain_path_and_security() {
        let cookies = vec![
            Cookie { name: "a".into(), value: "1".into(), domain: ".example.com".into(), path: "/".into(), expires: None, http_only: false, secure: true },
            Cookie { name: "b".into(), value: "2".into(), domain: "other.com".into(), path: "/".into(), expires: None, http_only: false, secure: false },
        ];
        let matched: Vec<&str> = applicable(&cookies, "blog.example.com", "/post", true).map(|c| c.name.as_str()).collect();
        assert_eq!(matched, vec!["a"]);

        let over_http: Vec<&str> = applicable(&cookies, "blog.example.com", "/post", false).map(|c| c.name.as_str()).collect();
        assert!(over_http.is_empty());
    }
}
