// # Record Client Trait
//
// Defines the interface for reading and rewriting the DNS record that the
// poll loop keeps in sync.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// DNS record type managed by the updater
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[serde(rename = "A")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DNS record as the provider reports it
///
/// Only `content` is ever rewritten; type, name and the proxied flag are sent
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// The record ID (provider-specific)
    pub id: String,
    /// Record type as returned by the provider ("A", "AAAA", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// The record name
    pub name: String,
    /// The current content (an address for A/AAAA)
    pub content: String,
    /// Whether the provider proxies traffic for this record
    #[serde(default)]
    pub proxied: bool,
}

/// Result of an update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Record content was rewritten
    Updated {
        /// The record that was rewritten
        record_id: String,
        /// Content before the update
        previous: String,
        /// Content after the update
        current: String,
    },
    /// Record already had the desired content (no write issued)
    Unchanged {
        /// The current content
        current: String,
    },
}

/// Trait for the DNS record client
///
/// Implementations are stateless between calls: the record is fetched fresh
/// on every update, and nothing is cached.
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// List records of `record_type` named exactly `host`, in provider order
    async fn list_records(
        &self,
        host: &str,
        record_type: RecordType,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Point the record for `host` at `desired`
    ///
    /// Looks the record up first. When several records match, the first one
    /// returned by the provider is used; no further disambiguation is done.
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome::Unchanged)`: content already matched, no write
    /// - `Ok(UpdateOutcome::Updated)`: content rewritten
    /// - `Err(Error::NotFound)`: no record matched
    /// - `Err(Error)`: transport or serialization failure from either call
    async fn update_record(
        &self,
        host: &str,
        desired: &str,
        record_type: RecordType,
    ) -> Result<UpdateOutcome, crate::Error>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
