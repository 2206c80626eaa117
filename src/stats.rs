//! Usage counters for reporting
//!
//! Owned by an orchestrator instance; counters only ever increase.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use crate::models::AgentKind;

const RECENT_ACTIVITY: usize = 10;
const QUERY_PREVIEW_CHARS: usize = 100;

#[derive(Default)]
struct AgentCounters {
    invocations: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    /// Milliseconds since the epoch; zero means never used
    last_used_ms: AtomicI64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub query: String,
    pub agent: AgentKind,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub invocations: u64,
    pub successes: u64,
    pub failures: u64,
    pub success_rate: f64,
    pub last_used: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_requests: u64,
    pub total_successes: u64,
    pub total_failures: u64,
    pub agents: BTreeMap<String, AgentStats>,
    pub recent_activity: Vec<ActivityEntry>,
}

pub struct Stats {
    total_requests: AtomicU64,
    total_successes: AtomicU64,
    total_failures: AtomicU64,
    agents: RwLock<BTreeMap<AgentKind, AgentCounters>>,
    history: Mutex<VecDeque<ActivityEntry>>,
}

impl Stats {
    /// Report the given agent kinds even before their first use; `Unknown`
    /// is always reported. Other kinds are added when first recorded.
    pub fn new(kinds: impl IntoIterator<Item = AgentKind>) -> Self {
        let mut agents: BTreeMap<AgentKind, AgentCounters> = kinds
            .into_iter()
            .map(|kind| (kind, AgentCounters::default()))
            .collect();
        agents.entry(AgentKind::Unknown).or_default();

        Self {
            total_requests: AtomicU64::new(0),
            total_successes: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            agents: RwLock::new(agents),
            history: Mutex::new(VecDeque::with_capacity(RECENT_ACTIVITY)),
        }
    }

    /// Report `kind` from now on, with zero counts until it is used
    pub fn track(&self, kind: AgentKind) {
        let known = self
            .agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&kind);
        if !known {
            self.agents
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .entry(kind)
                .or_default();
        }
    }

    /// Record one finished invocation
    pub fn record(&self, kind: AgentKind, success: bool, query: &str) {
        let now = Utc::now();

        self.total_requests.fetch_add(1, Ordering::Relaxed);
        let total = if success {
            &self.total_successes
        } else {
            &self.total_failures
        };
        total.fetch_add(1, Ordering::Relaxed);

        self.track(kind);
        {
            let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
            if let Some(counters) = agents.get(&kind) {
                counters.invocations.fetch_add(1, Ordering::Relaxed);
                let outcome = if success {
                    &counters.successes
                } else {
                    &counters.failures
                };
                outcome.fetch_add(1, Ordering::Relaxed);
                counters
                    .last_used_ms
                    .fetch_max(now.timestamp_millis(), Ordering::Relaxed);
            }
        }

        let entry = ActivityEntry {
            query: query.chars().take(QUERY_PREVIEW_CHARS).collect(),
            agent: kind,
            success,
            timestamp: now,
        };
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.len() >= RECENT_ACTIVITY {
            history.pop_front();
        }
        history.push_back(entry);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let agents = self
            .agents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(kind, counters)| {
                let invocations = counters.invocations.load(Ordering::Relaxed);
                let successes = counters.successes.load(Ordering::Relaxed);
                let failures = counters.failures.load(Ordering::Relaxed);
                let last_used_ms = counters.last_used_ms.load(Ordering::Relaxed);

                let stats = AgentStats {
                    invocations,
                    successes,
                    failures,
                    success_rate: if invocations == 0 {
                        0.0
                    } else {
                        successes as f64 / invocations as f64
                    },
                    last_used: if last_used_ms == 0 {
                        None
                    } else {
                        Utc.timestamp_millis_opt(last_used_ms).single()
                    },
                };
                (kind.to_string(), stats)
            })
            .collect();

        let recent_activity = {
            let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
            history.iter().cloned().collect()
        };

        StatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            total_successes: self.total_successes.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            agents,
            recent_activity,
        }
    }
}
