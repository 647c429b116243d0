//! # Gate-state tracker with sequence-based ordering.
//!
//! [`StateTracker`] maintains authoritative state of which tasks are alive
//! and where each worker stands relative to the gate (parked or active),
//! using event sequence numbers to handle out-of-order delivery.
//!
//! ## Architecture
//! ```text
//! tasks ──► Bus ──► supervisor listener ──► StateTracker::on_event()
//!                                                  │
//!                                                  ▼
//!                                     HashMap<String, TaskState>
//!                                    (name → {seq, alive, gate state})
//! ```
//!
//! ## Rules
//! - `TaskStarting` / `TaskStopped` / `TaskFailed` change liveness
//! - `WaiterParked` / `WaiterResumed` change gate state
//! - Gate state is monotonic: `Active` never reverts to `Parked`
//! - Events with `seq <= last_seq` for a task are **rejected** (stale)
//! - Read operations are **eventually consistent**

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// A worker's observed position relative to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterState {
    /// Blocked in `wait`, release condition not yet observed.
    Parked,
    /// Release observed; running the operational loop.
    Active,
}

/// Per-task state for ordering validation.
#[derive(Debug, Clone)]
struct TaskState {
    /// Last seen sequence number for this task.
    last_seq: u64,
    /// Current liveness (true = running under the registry).
    alive: bool,
    /// Gate position, for workers.
    gate: Option<WaiterState>,
}

/// Thread-safe tracker of task liveness and worker gate state.
///
/// ### Responsibilities
/// - Provides snapshots for graceful shutdown (stuck task detection)
/// - Answers "which workers are active" for callers and tests
/// - Rejects stale events using sequence numbers
pub struct StateTracker {
    state: RwLock<HashMap<String, TaskState>>,
}

impl StateTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Applies an event if it is newer than the last seen for its task.
    ///
    /// ### State transitions
    /// - `TaskStarting` → alive
    /// - `TaskStopped` / `TaskFailed` → not alive
    /// - `WaiterParked` → gate = `Parked` (unless already `Active`)
    /// - `WaiterResumed` → gate = `Active`
    /// - Other events → seq bookkeeping only
    pub async fn update(&self, ev: &Event) {
        let name = match ev.task.as_deref() {
            Some(n) => n,
            None => return,
        };

        let mut state = self.state.write().await;
        let entry = state.entry(name.to_string()).or_insert(TaskState {
            last_seq: 0,
            alive: false,
            gate: None,
        });

        if ev.seq <= entry.last_seq {
            return;
        }
        entry.last_seq = ev.seq;

        match ev.kind {
            EventKind::TaskStarting => entry.alive = true,
            EventKind::TaskStopped | EventKind::TaskFailed => entry.alive = false,
            EventKind::WaiterParked => {
                // Monotonic: a resumed worker never reads as parked again.
                if entry.gate != Some(WaiterState::Active) {
                    entry.gate = Some(WaiterState::Parked);
                }
            }
            EventKind::WaiterResumed => entry.gate = Some(WaiterState::Active),
            _ => {}
        }
    }

    /// Returns the sorted names of workers currently in the `Active` state.
    pub async fn active(&self) -> Vec<String> {
        self.filter_gate(WaiterState::Active).await
    }

    /// Returns the sorted names of workers currently in the `Parked` state.
    pub async fn parked(&self) -> Vec<String> {
        self.filter_gate(WaiterState::Parked).await
    }

    /// Returns true if the named worker has observed its release.
    pub async fn is_active(&self, name: &str) -> bool {
        self.state
            .read()
            .await
            .get(name)
            .map(|ts| ts.gate == Some(WaiterState::Active))
            .unwrap_or(false)
    }

    /// Returns the sorted names of currently alive tasks.
    ///
    /// Used by the supervisor to report stuck tasks when the shutdown grace
    /// period is exceeded.
    pub async fn alive(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .iter()
            .filter(|(_, ts)| ts.alive)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    async fn filter_gate(&self, wanted: WaiterState) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .iter()
            .filter(|(_, ts)| ts.gate == Some(wanted))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for StateTracker {
    async fn on_event(&self, event: &Event) {
        self.update(event).await;
    }

    fn name(&self) -> &'static str {
        "state-tracker"
    }
}
