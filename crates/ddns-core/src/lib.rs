// # ddns-core
//
// Core library for the polling dynamic-DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping a DNS record in
// sync with the caller's public address:
// - **IpChecker**: Trait for discovering the current public IPv4/IPv6 address
// - **RecordClient**: Trait for reading and rewriting the DNS record
// - **DdnsEngine**: Poll loop that runs check → compare → update → log
//
// ## Design Principles
//
// 1. **Single control flow**: One tick at a time, IPv4 then IPv6
// 2. **Memory-only state**: Last observed addresses live in the loop and are
//    lost on restart, which costs one extra update call
// 3. **Fire and forget**: A failed update is logged, never retried for the
//    same address
// 4. **Library-First**: The daemon is a thin wrapper around this crate

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{AddressFamily, DnsRecord, IpChecker, RecordClient, RecordType, UpdateOutcome};
pub use engine::{DdnsEngine, FamilyOutcome, LastObserved, TickReport, update_if_changed};
pub use config::{Credentials, Families, Schedule, UpdaterConfig, parse_duration};
pub use error::{Error, Result};
