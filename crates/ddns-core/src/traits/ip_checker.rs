// # IP Checker Trait
//
// Defines the interface for discovering the caller's current public address.
//
// ## Implementations
//
// - HTTP echo endpoints: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{AddressFamily, IpChecker};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let checker = /* IpChecker implementation */;
//
//     let ipv4 = checker.check(AddressFamily::V4).await?;
//     println!("public IPv4: {}", ipv4);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::traits::record_client::RecordType;

/// Address family (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Label used in log lines ("IPv4" / "IPv6")
    pub fn label(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        }
    }

    /// The record type that carries addresses of this family
    pub fn record_type(&self) -> RecordType {
        match self {
            AddressFamily::V4 => RecordType::A,
            AddressFamily::V6 => RecordType::Aaaa,
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trait for public-address discovery
///
/// One call is one outbound request. Implementations do not retry and do not
/// validate that the answer is a syntactically valid address: whatever
/// non-empty text the endpoint returns, trimmed, is the address.
#[async_trait]
pub trait IpChecker: Send + Sync {
    /// Discover the current public address for `family`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The trimmed response body
    /// - `Err(Error)`: Transport failure or non-2xx status
    async fn check(&self, family: AddressFamily) -> Result<String, crate::Error>;
}
