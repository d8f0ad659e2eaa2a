//! Configuration types for the DDNS updater
//!
//! The updater is configured from two places: the provider credential, zone
//! and host come from the environment, and the schedule and enabled address
//! families come from command-line flags parsed by the daemon.

use crate::error::{Error, Result};
use crate::traits::AddressFamily;
use std::time::Duration;

/// Environment variable holding the Cloudflare API token
pub const TOKEN_VAR: &str = "CF_TOKEN";

/// Environment variable holding the zone identifier
pub const ZONE_ID_VAR: &str = "CF_ZONE_ID";

/// Environment variable holding the hostname whose records are updated
pub const HOST_VAR: &str = "CF_HOST";

/// Provider credential and record target
///
/// # Security
///
/// The Debug implementation does NOT expose the API token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_token: String,
    zone_id: String,
    host: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("host", &self.host)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            host: host.into(),
        }
    }

    /// Load credentials from `CF_TOKEN`, `CF_ZONE_ID` and `CF_HOST`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an arbitrary variable lookup
    ///
    /// A variable that is set but empty counts as missing. The first missing
    /// variable, in the order token, zone, host, is reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::config(format!("{} env. variable is required", name)))
        };

        Ok(Self {
            api_token: require(TOKEN_VAR)?,
            zone_id: require(ZONE_ID_VAR)?,
            host: require(HOST_VAR)?,
        })
    }

    /// The API token. Never log this value.
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Which address families the loop keeps in sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Families {
    /// Update the A record
    pub ipv4: bool,

    /// Update the AAAA record
    pub ipv6: bool,
}

impl Families {
    pub fn new(ipv4: bool, ipv6: bool) -> Self {
        Self { ipv4, ipv6 }
    }

    /// Enabled families in tick order (IPv4 before IPv6)
    pub fn enabled(&self) -> impl Iterator<Item = AddressFamily> + use<> {
        let ipv4 = self.ipv4.then_some(AddressFamily::V4);
        let ipv6 = self.ipv6.then_some(AddressFamily::V6);
        ipv4.into_iter().chain(ipv6)
    }

    /// True when neither family is enabled; ticks then do nothing
    pub fn is_empty(&self) -> bool {
        !self.ipv4 && !self.ipv6
    }
}

impl Default for Families {
    fn default() -> Self {
        Self {
            ipv4: true,
            ipv6: false,
        }
    }
}

/// When the loop ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Schedule {
    /// One tick, then return
    #[default]
    Once,
    /// Tick immediately, then once per interval until shut down
    Every(Duration),
}

impl Schedule {
    /// A zero interval means single-shot
    pub fn from_interval(interval: Duration) -> Self {
        if interval.is_zero() {
            Schedule::Once
        } else {
            Schedule::Every(interval)
        }
    }
}

/// Everything the engine needs to run
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub credentials: Credentials,
    pub families: Families,
    pub schedule: Schedule,
}

impl UpdaterConfig {
    pub fn new(credentials: Credentials, families: Families, interval: Duration) -> Self {
        Self {
            credentials,
            families,
            schedule: Schedule::from_interval(interval),
        }
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parse a duration such as `15s`, `1m`, `6h`, `1h30m` or `1.5h`
///
/// Accepted units are `ns`, `us` (also `µs`), `ms`, `s`, `m` and `h`. Each
/// number may carry a decimal fraction. A bare `0` is accepted without a unit.
/// Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || Error::config(format!("invalid duration {:?}", input));

    let mut rest = input.trim();
    if rest.starts_with('-') {
        return Err(Error::config(format!(
            "duration must not be negative: {:?}",
            input
        )));
    }
    rest = rest.strip_prefix('+').unwrap_or(rest);

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if !number.chars().any(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            "" => {
                return Err(Error::config(format!(
                    "missing unit in duration {:?}",
                    input
                )));
            }
            other => {
                return Err(Error::config(format!(
                    "unknown unit {:?} in duration {:?}",
                    other, input
                )));
            }
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut value = whole.checked_mul(scale).ok_or_else(invalid)?;

        if !fraction.is_empty() {
            if !fraction.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            // Digits beyond nanosecond precision of the largest unit are dropped.
            let digits = &fraction[..fraction.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            value += numerator * scale / 10u128.pow(digits.len() as u32);
        }

        total = total.checked_add(value).ok_or_else(invalid)?;
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}
