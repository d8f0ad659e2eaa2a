//! Core DDNS poll loop
//!
//! The DdnsEngine is responsible for:
//! - Discovering the current public address via IpChecker
//! - Comparing it to the last observed address held in memory
//! - Updating the DNS record via RecordClient when it changed
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐      ┌──────────────┐      ┌──────────────┐
//! │  IpChecker  │─ip──▶│  DdnsEngine  │─ip──▶│ RecordClient │
//! └─────────────┘      └──────────────┘      └──────────────┘
//!                             │
//!                             ▼
//!                     LastObserved (loop-local)
//! ```
//!
//! ## Tick Flow
//!
//! For each enabled family, IPv4 first:
//!
//! 1. Check the public address; on error log and skip the family
//! 2. Compare with the last observed address; equal means no update
//! 3. Record the new address as observed *before* the remote update, so a
//!    failed update is not retried for the same address on the next tick
//! 4. Update the record; on error log only
//!
//! Families are independent: a failure in one never affects the other.

use crate::config::{Families, Schedule, UpdaterConfig};
use crate::traits::{AddressFamily, IpChecker, RecordClient, UpdateOutcome};
use std::future::Future;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

/// Most recent address per family that this process detected and pushed
///
/// Starts empty, so the first tick always treats the address as changed.
/// Lives only as long as the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastObserved {
    pub ipv4: String,
    pub ipv6: String,
}

impl LastObserved {
    pub fn get(&self, family: AddressFamily) -> &str {
        match family {
            AddressFamily::V4 => &self.ipv4,
            AddressFamily::V6 => &self.ipv6,
        }
    }

    fn take(&mut self, family: AddressFamily) -> String {
        match family {
            AddressFamily::V4 => std::mem::take(&mut self.ipv4),
            AddressFamily::V6 => std::mem::take(&mut self.ipv6),
        }
    }

    fn set(&mut self, family: AddressFamily, ip: String) {
        match family {
            AddressFamily::V4 => self.ipv4 = ip,
            AddressFamily::V6 => self.ipv6 = ip,
        }
    }
}

/// What happened to one family during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyOutcome {
    /// The IP check failed; nothing else was attempted
    CheckFailed { error: String },
    /// Same address as last observed; no update call
    Unchanged { ip: String },
    /// The record was rewritten to `ip`
    Updated { ip: String },
    /// The address changed locally but the record already carried it
    AlreadyCurrent { ip: String },
    /// The update call failed; `ip` is still recorded as observed
    UpdateFailed { ip: String, error: String },
}

impl FamilyOutcome {
    /// Whether an update call was issued to the record client
    pub fn attempted_update(&self) -> bool {
        matches!(
            self,
            FamilyOutcome::Updated { .. }
                | FamilyOutcome::AlreadyCurrent { .. }
                | FamilyOutcome::UpdateFailed { .. }
        )
    }
}

/// Per-family outcomes of one tick, in tick order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub outcomes: Vec<(AddressFamily, FamilyOutcome)>,
}

impl TickReport {
    pub fn outcome(&self, family: AddressFamily) -> Option<&FamilyOutcome> {
        self.outcomes
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, outcome)| outcome)
    }
}

/// Check one family and update its record if the address changed
///
/// Takes the last observed address by value and hands back the value the
/// caller should keep for the next tick, together with what happened.
pub async fn update_if_changed(
    family: AddressFamily,
    checker: &dyn IpChecker,
    last_observed: String,
    client: &dyn RecordClient,
    host: &str,
) -> (String, FamilyOutcome) {
    let label = family.label();

    let current = match checker.check(family).await {
        Ok(ip) => ip,
        Err(e) => {
            error!("failed to check {}: {}", label, e);
            return (
                last_observed,
                FamilyOutcome::CheckFailed {
                    error: e.to_string(),
                },
            );
        }
    };

    if current == last_observed {
        info!("{} unchanged ({})", label, current);
        return (last_observed, FamilyOutcome::Unchanged { ip: current });
    }

    debug!(
        "{} changed: {:?} -> {}",
        label,
        if last_observed.is_empty() {
            None
        } else {
            Some(last_observed.as_str())
        },
        current
    );

    let outcome = match client
        .update_record(host, &current, family.record_type())
        .await
    {
        Ok(UpdateOutcome::Updated { previous, .. }) => {
            info!("{} record updated to {} (was: {})", label, current, previous);
            FamilyOutcome::Updated {
                ip: current.clone(),
            }
        }
        Ok(UpdateOutcome::Unchanged { .. }) => {
            info!("{} record already points at {}", label, current);
            FamilyOutcome::AlreadyCurrent {
                ip: current.clone(),
            }
        }
        Err(e) => {
            error!("failed to update {} record: {}", label, e);
            FamilyOutcome::UpdateFailed {
                ip: current.clone(),
                error: e.to_string(),
            }
        }
    };

    (current, outcome)
}

/// Core DDNS engine
///
/// Owns the checker, the record client and the schedule. The last observed
/// addresses are not stored here: they are threaded through [`DdnsEngine::tick`]
/// by value, and [`DdnsEngine::run_until`] keeps them local to the loop.
pub struct DdnsEngine {
    /// Public address discovery
    checker: Box<dyn IpChecker>,

    /// DNS record reads and writes
    client: Box<dyn RecordClient>,

    /// Hostname whose records are kept in sync
    host: String,

    /// Families to check each tick
    families: Families,

    /// Single-shot or periodic
    schedule: Schedule,
}

impl DdnsEngine {
    pub fn new(
        checker: Box<dyn IpChecker>,
        client: Box<dyn RecordClient>,
        config: &UpdaterConfig,
    ) -> Self {
        Self {
            checker,
            client,
            host: config.credentials.host().to_string(),
            families: config.families,
            schedule: config.schedule,
        }
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Run one check-compare-update pass over every enabled family
    pub async fn tick(&self, mut state: LastObserved) -> (LastObserved, TickReport) {
        let mut report = TickReport::default();

        for family in self.families.enabled() {
            let last = state.take(family);
            let (observed, outcome) = update_if_changed(
                family,
                self.checker.as_ref(),
                last,
                self.client.as_ref(),
                &self.host,
            )
            .await;
            state.set(family, observed);
            report.outcomes.push((family, outcome));
        }

        (state, report)
    }

    /// Run until the process is terminated
    pub async fn run(&self) -> LastObserved {
        self.run_until(std::future::pending()).await
    }

    /// Run according to the schedule, stopping early when `shutdown` resolves
    ///
    /// In single-shot mode this is exactly one tick. In periodic mode the first
    /// tick happens immediately and then once per interval; ticks missed while
    /// a slow tick was running are skipped, not caught up. `shutdown` is only
    /// observed between ticks.
    ///
    /// Returns the last observed addresses at exit.
    pub async fn run_until<F>(&self, shutdown: F) -> LastObserved
    where
        F: Future<Output = ()>,
    {
        if self.families.is_empty() {
            warn!("Both IPv4 and IPv6 updates are disabled; ticks will do nothing");
        }

        let mut state = LastObserved::default();

        let period = match self.schedule {
            Schedule::Once => {
                info!("Running a single update check for {}", self.host);
                let (state, _) = self.tick(state).await;
                return state;
            }
            Schedule::Every(period) => period,
        };

        info!(
            "Checking {} every {:?} ({})",
            self.host,
            period,
            self.client.provider_name()
        );

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticks = IntervalStream::new(interval);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                Some(_) = ticks.next() => {
                    let (next, _) = self.tick(state).await;
                    state = next;
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping poll loop");
                    break;
                }
            }
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_observed_starts_empty() {
        let state = LastObserved::default();
        assert_eq!(state.get(AddressFamily::V4), "");
        assert_eq!(state.get(AddressFamily::V6), "");
    }

    #[test]
    fn last_observed_take_and_set() {
        let mut state = LastObserved::default();
        state.set(AddressFamily::V6, "2001:db8::1".to_string());
        assert_eq!(state.get(AddressFamily::V6), "2001:db8::1");
        assert_eq!(state.get(AddressFamily::V4), "");

        assert_eq!(state.take(AddressFamily::V6), "2001:db8::1");
        assert_eq!(state.get(AddressFamily::V6), "");
    }

    #[test]
    fn attempted_update_classification() {
        assert!(!FamilyOutcome::CheckFailed { error: "x".into() }.attempted_update());
        assert!(!FamilyOutcome::Unchanged { ip: "1.2.3.4".into() }.attempted_update());
        assert!(FamilyOutcome::Updated { ip: "1.2.3.4".into() }.attempted_update());
        assert!(
            FamilyOutcome::UpdateFailed {
                ip: "1.2.3.4".into(),
                error: "x".into()
            }
            .attempted_update()
        );
    }
}
