// # HTTP IP Checker
//
// This crate provides the public-address checker for the DDNS updater.
//
// ## Architecture
//
// One GET per check against a fixed "echo my IP" endpoint. The IPv4 and IPv6
// endpoints are different hosts, each reachable only over its own family, so
// the answer always belongs to the family that was asked for.
//
// The trimmed response body is taken as the address as-is. No syntax
// validation is done; an empty body is the only answer that is rejected.

use ddns_core::traits::{AddressFamily, IpChecker};
use ddns_core::{Error, Result};

use std::time::Duration;

/// Echo endpoint answering over IPv4
pub const DEFAULT_IPV4_ENDPOINT: &str = "https://checkip.amazonaws.com";

/// Echo endpoint answering over IPv6
pub const DEFAULT_IPV6_ENDPOINT: &str = "https://v6.ident.me";

/// Timeout for a single check
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public address checker
#[derive(Debug, Clone)]
pub struct HttpIpChecker {
    /// URL answering with the caller's IPv4 address
    ipv4_url: String,

    /// URL answering with the caller's IPv6 address
    ipv6_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpChecker {
    /// Create a checker using the default public endpoints
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_IPV4_ENDPOINT, DEFAULT_IPV6_ENDPOINT)
    }

    /// Create a checker using custom endpoints
    pub fn with_endpoints(ipv4_url: impl Into<String>, ipv6_url: impl Into<String>) -> Self {
        Self {
            ipv4_url: ipv4_url.into(),
            ipv6_url: ipv6_url.into(),
            client: reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    /// The endpoint used for `family`
    pub fn endpoint(&self, family: AddressFamily) -> &str {
        match family {
            AddressFamily::V4 => &self.ipv4_url,
            AddressFamily::V6 => &self.ipv6_url,
        }
    }

    /// Fetch the trimmed body of `url`
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {}: {}", url, e)))?;

        if !status.is_success() {
            return Err(Error::from_status(url, status.as_u16(), &body));
        }

        Ok(body.trim().to_string())
    }
}

impl Default for HttpIpChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IpChecker for HttpIpChecker {
    async fn check(&self, family: AddressFamily) -> Result<String> {
        let url = self.endpoint(family);
        tracing::debug!("Checking public {} via {}", family, url);

        let ip = self.fetch(url).await?;
        if ip.is_empty() {
            return Err(Error::ip_check(format!("{} returned an empty body", url)));
        }

        tracing::debug!("Public {} is {}", family, ip);
        Ok(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints() {
        let checker = HttpIpChecker::new();
        assert_eq!(checker.endpoint(AddressFamily::V4), "https://checkip.amazonaws.com");
        assert_eq!(checker.endpoint(AddressFamily::V6), "https://v6.ident.me");
    }

    #[test]
    fn custom_endpoints() {
        let checker = HttpIpChecker::with_endpoints("http://127.0.0.1:1/v4", "http://127.0.0.1:1/v6");
        assert_eq!(checker.endpoint(AddressFamily::V4), "http://127.0.0.1:1/v4");
        assert_eq!(checker.endpoint(AddressFamily::V6), "http://127.0.0.1:1/v6");
    }
}
