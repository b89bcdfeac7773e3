//! URL and SSRF guard (SPEC_FULL.md §4.A).
//!
//! Parses a candidate URL, classifies IP-literal hosts directly, and
//! resolves hostnames through a [`DnsResolver`] before classifying every
//! returned address. Blocking is fail-closed: any private/link-local/
//! unspecified address, or a DNS failure on both families, rejects the URL.
//! Proxy URLs run through the same classification with a narrower scheme
//! allow-list.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use articaut_types::error::FetchError;
use articaut_types::ports::DnsResolver;
use tokio::time::timeout;
use tracing::warn;
use url::Url;

const DNS_TIMEOUT: Duration = Duration::from_secs(5);
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];
const ALLOWED_PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Reduce an IPv4-mapped IPv6 address (`::ffff:a.b.c.d`) to its embedded
/// IPv4 form; every other address passes through unchanged.
fn unmap(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

/// True if `ip` falls in a private, loopback, link-local or unspecified
/// range per SPEC_FULL.md §4.A's canonical list.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match unmap(ip) {
        IpAddr::V4(v4) => is_private_ipv4(v4),
        IpAddr::V6(v6) => is_private_ipv6(v6),
    }
}

fn is_private_ipv4(v4: Ipv4Addr) -> bool {
    // 0/8, 10/8, 127/8, 169.254/16, 172.16/12, 192.168/16
    v4.octets()[0] == 0
        || v4.is_private()
        || v4.is_loopback()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast()
}

fn is_private_ipv6(v6: Ipv6Addr) -> bool {
    // ::, ::1, fc00::/7, fd00::/8, fe80::/10
    v6.is_unspecified() || v6.is_loopback() || is_unique_local(v6) || is_link_local_v6(v6)
}

fn is_unique_local(v6: Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xfe00) == 0xfc00
}

fn is_link_local_v6(v6: Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xffc0) == 0xfe80
}

/// Validate a host/port pair by resolving both record families concurrently
/// and rejecting if any resolved address is private, or if both families
/// fail to resolve.
async fn resolve_and_check(resolver: &dyn DnsResolver, host: &str) -> Result<Vec<IpAddr>, FetchError> {
    let resolve = async {
        let (a, aaaa) = tokio::join!(resolver.resolve_a(host), resolver.resolve_aaaa(host));
        (a, aaaa)
    };

    let (a_result, aaaa_result) = timeout(DNS_TIMEOUT, resolve)
        .await
        .map_err(|_| FetchError::DnsResolution { host: host.to_string() })?;

    let mut addrs = Vec::new();
    match a_result {
        Ok(ips) => addrs.extend(ips),
        Err(_) => {}
    }
    match aaaa_result {
        Ok(ips) => addrs.extend(ips),
        Err(_) => {}
    }

    if addrs.is_empty() {
        return Err(FetchError::DnsResolution { host: host.to_string() });
    }

    for ip in &addrs {
        if is_private_ip(*ip) {
            warn!(host, ip = %ip, "ssrf guard blocked resolved private address");
            return Err(FetchError::SsrfBlocked {
                host: host.to_string(),
                detail: format!("resolves to private address {ip}"),
            });
        }
    }

    Ok(addrs)
}

/// Parse `url_str` and ensure it targets a public host, returning the
/// resolved addresses (empty for IP-literal hosts, since there is nothing
/// further to resolve).
pub async fn check_url(url_str: &str, resolver: &dyn DnsResolver) -> Result<Vec<IpAddr>, FetchError> {
    let url = Url::parse(url_str).map_err(|e| FetchError::Network {
        url: url_str.to_string(),
        message: format!("invalid url: {e}"),
    })?;
    check_parsed(&url, resolver, ALLOWED_SCHEMES).await
}

/// Same classification as [`check_url`], restricted to the proxy scheme
/// allow-list (`http`, `https`, `socks5`, `socks5h`).
pub async fn check_proxy_url(proxy_url: &str, resolver: &dyn DnsResolver) -> Result<(), FetchError> {
    let url = Url::parse(proxy_url).map_err(|_| FetchError::InvalidProxy { proxy: proxy_url.to_string() })?;
    check_parsed(&url, resolver, ALLOWED_PROXY_SCHEMES)
        .await
        .map(|_| ())
        .map_err(|_| FetchError::InvalidProxy { proxy: proxy_url.to_string() })
}

async fn check_parsed(url: &Url, resolver: &dyn DnsResolver, allowed_schemes: &[&str]) -> Result<Vec<IpAddr>, FetchError> {
    if !allowed_schemes.contains(&url.scheme()) {
        return Err(FetchError::SsrfBlocked {
            host: url.host_str().unwrap_or_default().to_string(),
            detail: format!("unsupported scheme `{}`", url.scheme()),
        });
    }

    let host = url.host_str().ok_or_else(|| FetchError::SsrfBlocked {
        host: String::new(),
        detail: "url has no host".to_string(),
    })?;

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(ip) {
            warn!(host, "ssrf guard blocked literal private ip");
            return Err(FetchError::SsrfBlocked { host: host.to_string(), detail: "literal private ip".to_string() });
        }
        return Ok(vec![ip]);
    }

    resolve_and_check(resolver, host).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_private_ranges_are_blocked() {
        for addr in ["0.0.0.1", "10.0.0.1", "127.0.0.1", "169.254.1.1", "172.16.0.1", "192.168.1.1"] {
            assert!(is_private_ip(addr.parse().unwrap()), "{addr} should be private");
        }
    }

    #[test]
    fn ipv4_public_addresses_pass() {
        for addr in ["8.8.8.8", "1.1.1.1", "203.0.113.1"] {
            assert!(!is_private_ip(addr.parse().unwrap()), "{addr} should be public");
        }
    }

    #[test]
    fn ipv6_private_ranges_are_blocked() {
        for addr in ["::", "::1", "fc00::1", "fd00::1", "fe80::1"] {
            assert!(is_private_ip(addr.parse().unwrap()), "{addr} should be private");
        }
    }

    #[test]
    fn ipv6_public_address_passes() {
        assert!(!is_private_ip("2606:4700:4700::1111".parse().unwrap()));
    }

    #[test]
    fn ipv4_mapped_ipv6_is_reduced_before_classification() {
        let mapped: IpAddr = "::ffff:10.0.0.1".parse().unwrap();
        assert!(is_private_ip(mapped));
        let mapped_public: IpAddr = "::ffff:8.8.8.8".parse().unwrap();
        assert!(!is_private_ip(mapped_public));
    }

    struct StaticResolver {
        a: Vec<IpAddr>,
        aaaa: Vec<IpAddr>,
    }

    #[async_trait::async_trait]
    impl DnsResolver for StaticResolver {
        async fn resolve_a(&self, _host: &str) -> Result<Vec<IpAddr>, FetchError> {
            Ok(self.a.clone())
        }
        async fn resolve_aaaa(&self, _host: &str) -> Result<Vec<IpAddr>, FetchError> {
            Ok(self.aaaa.clone())
        }
    }

    #[tokio::test]
    async fn check_url_blocks_when_any_resolved_address_is_private() {
        let resolver = StaticResolver { a: vec!["10.0.0.5".parse().unwrap()], aaaa: vec![] };
        let result = check_url("https://internal.example.com/", &resolver).await;
        assert!(matches!(result, Err(FetchError::SsrfBlocked { .. })));
    }

    #[tokio::test]
    async fn check_url_allows_all_public_addresses() {
        let resolver = StaticResolver { a: vec!["93.184.216.34".parse().unwrap()], aaaa: vec![] };
        let result = check_url("https://example.com/", &resolver).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn check_url_fails_closed_when_both_families_fail() {
        let resolver = StaticResolver { a: vec![], aaaa: vec![] };
        let result = check_url("https://nowhere.invalid/", &resolver).await;
        assert!(matches!(result, Err(FetchError::DnsResolution { .. })));
    }

    #[tokio::test]
    async fn check_url_blocks_literal_private_ip_without_resolving() {
        let resolver = StaticResolver { a: vec![], aaaa: vec![] };
        let result = check_url("http://127.0.0.1:8080/admin", &resolver).await;
        assert!(matches!(result, Err(FetchError::SsrfBlocked { .. })));
    }

    #[tokio::test]
    async fn check_url_rejects_unsupported_scheme() {
        let resolver = StaticResolver { a: vec![], aaaa: vec![] };
        let result = check_url("ftp://example.com/", &resolver).await;
        assert!(matches!(result, Err(FetchError::SsrfBlocked { .. })));
    }

    #[tokio::test]
    async fn check_proxy_url_allows_socks5() {
        let resolver = StaticResolver { a: vec!["93.184.216.34".parse().unwrap()], aaaa: vec![] };
        assert!(check_proxy_url("socks5://proxy.example.com:1080", &resolver).await.is_ok());
    }

    #[tokio::test]
    async fn check_proxy_url_rejects_private_proxy_host() {
        let resolver = StaticResolver { a: vec!["192.168.1.1".parse().unwrap()], aaaa: vec![] };
        let result = check_proxy_url("http://proxy.internal:8080", &resolver).await;
        assert!(matches!(result, Err(FetchError::InvalidProxy { .. })));
    }
}
