//! Test doubles and common utilities for poll-loop contract tests
//!
//! The doubles share their counters through `Arc`, so a test can hand a clone
//! to the engine and keep another to inspect afterwards.

#![allow(dead_code)]

use ddns_core::config::{Credentials, Families, UpdaterConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressFamily, DnsRecord, IpChecker, RecordClient, RecordType, UpdateOutcome};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HOST: &str = "home.example.com";

/// An IpChecker that answers from a per-family script
///
/// Each call pops the next scripted answer. The final answer is sticky: once
/// the script is down to one entry, it is returned forever.
#[derive(Clone, Default)]
pub struct ScriptedIpChecker {
    answers: Arc<Mutex<HashMap<AddressFamily, VecDeque<std::result::Result<String, String>>>>>,
    calls: Arc<Mutex<HashMap<AddressFamily, usize>>>,
}

impl ScriptedIpChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer for `family`
    pub fn answer(self, family: AddressFamily, ip: &str) -> Self {
        self.push(family, Ok(ip.to_string()));
        self
    }

    /// Queue a failure for `family`
    pub fn fail(self, family: AddressFamily, message: &str) -> Self {
        self.push(family, Err(message.to_string()));
        self
    }

    fn push(&self, family: AddressFamily, answer: std::result::Result<String, String>) {
        self.answers
            .lock()
            .unwrap()
            .entry(family)
            .or_default()
            .push_back(answer);
    }

    /// Number of check() calls made for `family`
    pub fn calls(&self, family: AddressFamily) -> usize {
        self.calls.lock().unwrap().get(&family).copied().unwrap_or(0)
    }

    /// Total number of check() calls across families
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait::async_trait]
impl IpChecker for ScriptedIpChecker {
    async fn check(&self, family: AddressFamily) -> Result<String> {
        *self.calls.lock().unwrap().entry(family).or_default() += 1;

        let mut answers = self.answers.lock().unwrap();
        let queue = answers
            .get_mut(&family)
            .ok_or_else(|| Error::ip_check(format!("no answer scripted for {}", family)))?;

        let answer = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        match answer {
            Some(Ok(ip)) => Ok(ip),
            Some(Err(message)) => Err(Error::http(message)),
            None => Err(Error::ip_check(format!("no answer scripted for {}", family))),
        }
    }
}

/// One update_record() call as seen by the client double
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub host: String,
    pub desired: String,
    pub record_type: RecordType,
}

/// A RecordClient that records update calls
#[derive(Clone, Default)]
pub struct RecordingRecordClient {
    updates: Arc<Mutex<Vec<UpdateCall>>>,
    list_calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    already_current: Arc<AtomicBool>,
}

impl RecordingRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following update_record() call fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Report the record as already carrying the desired content
    pub fn set_already_current(&self, already_current: bool) {
        self.already_current.store(already_current, Ordering::SeqCst);
    }

    /// All update_record() calls so far
    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.lock().unwrap().clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn updates_for(&self, record_type: RecordType) -> Vec<UpdateCall> {
        self.updates()
            .into_iter()
            .filter(|call| call.record_type == record_type)
            .collect()
    }
}

#[async_trait::async_trait]
impl RecordClient for RecordingRecordClient {
    async fn list_records(&self, host: &str, record_type: RecordType) -> Result<Vec<DnsRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![DnsRecord {
            id: "record-1".to_string(),
            record_type: record_type.to_string(),
            name: host.to_string(),
            content: String::new(),
            proxied: false,
        }])
    }

    async fn update_record(
        &self,
        host: &str,
        desired: &str,
        record_type: RecordType,
    ) -> Result<UpdateOutcome> {
        self.updates.lock().unwrap().push(UpdateCall {
            host: host.to_string(),
            desired: desired.to_string(),
            record_type,
        });

        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::from_status("cloudflare", 500, "internal error"));
        }

        if self.already_current.load(Ordering::SeqCst) {
            return Ok(UpdateOutcome::Unchanged {
                current: desired.to_string(),
            });
        }

        Ok(UpdateOutcome::Updated {
            record_id: "record-1".to_string(),
            previous: "198.51.100.1".to_string(),
            current: desired.to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create an UpdaterConfig for testing
pub fn config(ipv4: bool, ipv6: bool, interval: Duration) -> UpdaterConfig {
    UpdaterConfig::new(
        Credentials::new("test-token", "zone-1", HOST),
        Families::new(ipv4, ipv6),
        interval,
    )
}
