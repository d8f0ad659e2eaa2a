// # Cloudflare DNS Record Client
//
// This crate provides the Cloudflare implementation of `RecordClient` for the
// DDNS updater.
//
// ## Behavior
//
// - Two calls at most per update: a filtered list, then a PUT if needed
// - No PUT when the first matching record already has the desired content
// - Type, name and proxied flag of the record are sent back unchanged
// - No retry, no backoff, no caching: every update fetches the record fresh
// - Dry-run mode performs the list call and logs the PUT it would send
//
// ## Known Limitation
//
// When several records share the same type and name, the first record in the
// order Cloudflare returns them is the one updated. There is no tie-break.
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=...&name=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::Credentials;
use ddns_core::traits::{DnsRecord, RecordClient, RecordType, UpdateOutcome};
use ddns_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result: Option<T>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// PUT body for a record update
#[derive(Debug, Serialize)]
struct RecordUpdate<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    proxied: bool,
}

/// Cloudflare DNS record client
///
/// Bound to one zone. The host and record type are supplied per call.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the client will:
/// - Perform the list request
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareClient {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone the records live in
    zone_id: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a new Cloudflare client
    ///
    /// # Parameters
    ///
    /// - `credentials`: API token (Zone:DNS:Edit) and zone ID
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    pub fn new(credentials: &Credentials, dry_run: bool) -> Result<Self> {
        if credentials.api_token().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token: credentials.api_token().to_string(),
            zone_id: credentials.zone_id().to_string(),
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a client that modifies records
    pub fn new_live(credentials: &Credentials) -> Result<Self> {
        Self::new(credentials, false)
    }

    /// Create a client that only logs the updates it would make
    pub fn new_dry_run(credentials: &Credentials) -> Result<Self> {
        Self::new(credentials, true)
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, self.zone_id)
    }

    /// Send an authorized request and return the body of a 2xx response
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String> {
        let response = request
            .bearer_auth(&self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::http(format!("Cloudflare request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read Cloudflare response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::from_status("cloudflare", status.as_u16(), &body));
        }

        Ok(body)
    }

    /// Decode a response envelope, failing when Cloudflare reports `success: false`
    fn decode<T>(body: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let envelope: ApiResponse<T> = serde_json::from_str(body)?;

        if !envelope.success {
            let messages: Vec<String> = envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect();
            return Err(Error::provider(
                "cloudflare",
                format!("request unsuccessful: {}", messages.join("; ")),
            ));
        }

        Ok(envelope.result.unwrap_or_default())
    }
}

#[async_trait]
impl RecordClient for CloudflareClient {
    /// List records of one type and exact name
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=home.example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(&self, host: &str, record_type: RecordType) -> Result<Vec<DnsRecord>> {
        tracing::debug!("Listing {} records for {}", record_type, host);

        let request = self
            .client
            .get(self.records_url())
            .query(&[("type", record_type.as_str()), ("name", host)]);

        let body = self.send(request).await?;
        let records: Vec<DnsRecord> = Self::decode(&body)?;

        tracing::debug!("Found {} {} record(s) for {}", records.len(), record_type, host);
        Ok(records)
    }

    /// Rewrite the first matching record's content when it differs
    ///
    /// # API Calls
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=A&name=home.example.com
    ///
    /// # Only if content differs (skipped in dry-run mode)
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {"type": "A", "name": "home.example.com", "content": "203.0.113.5", "proxied": false}
    /// ```
    async fn update_record(
        &self,
        host: &str,
        desired: &str,
        record_type: RecordType,
    ) -> Result<UpdateOutcome> {
        let records = self.list_records(host, record_type).await?;

        let record = records.first().ok_or_else(|| {
            Error::not_found(format!("host not found: {} (type: {})", host, record_type))
        })?;

        if records.len() > 1 {
            tracing::warn!(
                "{} {} records match {}; updating the first ({})",
                records.len(),
                record_type,
                host,
                record.id
            );
        }

        if record.content == desired {
            tracing::debug!("DNS record already has correct content: {} -> {}", host, desired);
            return Ok(UpdateOutcome::Unchanged {
                current: record.content.clone(),
            });
        }

        let payload = RecordUpdate {
            record_type: &record.record_type,
            name: &record.name,
            content: desired,
            proxied: record.proxied,
        };
        let url = format!("{}/{}", self.records_url(), record.id);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                url,
                serde_json::to_string(&payload)?
            );
        } else {
            tracing::info!(
                "Updating DNS record: {} -> {} (was: {})",
                host,
                desired,
                record.content
            );
            let body = self.send(self.client.put(&url).json(&payload)).await?;
            Self::decode::<serde_json::Value>(&body)?;
        }

        Ok(UpdateOutcome::Updated {
            record_id: record.id.clone(),
            previous: record.content.clone(),
            current: desired.to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
