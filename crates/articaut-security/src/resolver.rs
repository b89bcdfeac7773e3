//! Default [`DnsResolver`] backed by the OS resolver via `tokio::net`.
//!
//! `lookup_host` returns both address families interleaved; A/AAAA are
//! split by address kind since Rust's stdlib resolver does not expose
//! per-record-type queries.

use std::net::IpAddr;

use articaut_types::error::FetchError;
use articaut_types::ports::DnsResolver;
use async_trait::async_trait;

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDnsResolver;

impl TokioDnsResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, FetchError> {
        let addr = format!("{host}:0");
        tokio::net::lookup_host(&addr)
            .await
            .map(|iter| iter.map(|sock| sock.ip()).collect())
            .map_err(|_| FetchError::DnsResolution { host: host.to_string() })
    }
}

#[async_trait]
impl DnsResolver for TokioDnsResolver {
    async fn resolve_a(&self, host: &str) -> Result<Vec<IpAddr>, FetchError> {
        let ips = self.lookup(host).await?;
        Ok(ips.into_iter().filter(|ip| ip.is_ipv4()).collect())
    }

    async fn resolve_aaaa(&self, host: &str) -> Result<Vec<IpAddr>, FetchError> {
        let ips = self.lookup(host).await?;
        Ok(ips.into_iter().filter(|ip| ip.is_ipv6()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_localhost_to_loopback() {
        let resolver = TokioDnsResolver;
        let a = resolver.resolve_a("localhost").await.unwrap();
        assert!(a.iter().all(|ip| ip.is_loopback()) || a.is_empty());
    }
}
