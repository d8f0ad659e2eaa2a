pub mod ip_checker;
pub mod record_client;

pub use ip_checker::{AddressFamily, IpChecker};
pub use record_client::{DnsRecord, RecordClient, RecordType, UpdateOutcome};
