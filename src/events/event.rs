//! # Runtime events emitted by the supervisor, gates and tasks.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Init events**: progress of the one-shot initialization phase
//! - **Gate events**: waiter state changes around the release gate
//! - **Management events**: task spawning and retirement
//! - **Shutdown events**: signal handling and grace accounting
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task
//! names, waiter identities and observed release masks.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::gates::{GateStrategy, WaiterId};
use crate::tasks::{Priority, TaskRef};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Init events ===
    /// The init sequencer started its workload.
    ///
    /// Sets: `task`, `at`, `seq`.
    InitStarted,

    /// Countdown progress: `tick` units of work remain.
    ///
    /// Sets: `tick`, `at`, `seq`.
    InitTick,

    /// Initialization finished and the gate release was performed.
    ///
    /// Sets: `task`, `at`, `seq`.
    InitCompleted,

    // === Gate events ===
    /// The one-shot release was performed on the gate.
    ///
    /// Sets: `task` (releasing task), `strategy`, `at`, `seq`.
    GateOpened,

    /// A worker began blocking on the gate.
    ///
    /// Sets: `task`, `waiter`, `at`, `seq`.
    WaiterParked,

    /// A worker's wait returned; it is entering its operational loop.
    ///
    /// Sets: `task`, `waiter`, `strategy`, `mask` (bitmask strategy only),
    /// `at`, `seq`.
    WaiterResumed,

    /// One iteration of a released worker's periodic loop.
    ///
    /// Sets: `task`, `at`, `seq`.
    WorkerBeat,

    // === Task management events ===
    /// Request to create a task under the registry.
    ///
    /// Sets: `task`, `priority`, `request` (private), `at`, `seq`.
    TaskSpawnRequested,

    /// Task was created and registered.
    ///
    /// Sets: `task`, `priority`, `at`, `seq`.
    TaskSpawned,

    /// A spawn request was rejected (duplicate name).
    ///
    /// Sets: `task`, `reason`, `at`, `seq`.
    SpawnRejected,

    /// Task began executing.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskStarting,

    /// Task finished successfully or exited on cancellation.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskStopped,

    /// Task failed with an error.
    ///
    /// Sets: `task`, `reason`, `at`, `seq`.
    TaskFailed,

    /// Task's execution resources were reclaimed by the registry.
    ///
    /// Sets: `task`, `at`, `seq`.
    TaskRetired,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed or explicit `shutdown()`).
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// All tasks stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some tasks did not stop in time.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `task` (subscriber name), `reason`, `at`, `seq`.
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `task` (subscriber name), `reason`, `at`, `seq`.
    SubscriberOverflow,
}

/// Internal payload of a [`EventKind::TaskSpawnRequested`] event.
///
/// Carries the task to create and its scheduling metadata to the registry.
#[derive(Clone)]
pub(crate) struct SpawnRequest {
    /// The task to spawn.
    pub(crate) task: TaskRef,
    /// Priority metadata recorded with the spawned task.
    pub(crate) priority: Priority,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Waiter identity on the gate, if applicable.
    pub waiter: Option<WaiterId>,
    /// Release mask observed by a bitmask-gated waiter.
    pub mask: Option<u32>,
    /// Remaining countdown ticks.
    pub tick: Option<u32>,
    /// Scheduling priority metadata.
    pub priority: Option<Priority>,
    /// Gate strategy involved in the event.
    pub strategy: Option<GateStrategy>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,

    /// Internal spawn payload (used only for TaskSpawnRequested).
    pub(crate) request: Option<SpawnRequest>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            waiter: None,
            mask: None,
            tick: None,
            priority: None,
            strategy: None,
            reason: None,
            request: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a waiter identity.
    #[inline]
    pub fn with_waiter(mut self, waiter: WaiterId) -> Self {
        self.waiter = Some(waiter);
        self
    }

    /// Attaches an observed release mask.
    #[inline]
    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Attaches a countdown tick value.
    #[inline]
    pub fn with_tick(mut self, tick: u32) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches priority metadata.
    #[inline]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attaches a gate strategy.
    #[inline]
    pub fn with_strategy(mut self, strategy: GateStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub(crate) fn with_request(mut self, request: SpawnRequest) -> Self {
        self.request = Some(request);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic() {
        let a = Event::now(EventKind::InitStarted);
        let b = Event::now(EventKind::InitTick);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builder_setters_attach_metadata() {
        let ev = Event::now(EventKind::WaiterResumed)
            .with_task("task-a")
            .with_waiter(WaiterId::new(0))
            .with_mask(0b111)
            .with_strategy(GateStrategy::Bitmask);

        assert_eq!(ev.task.as_deref(), Some("task-a"));
        assert_eq!(ev.waiter, Some(WaiterId::new(0)));
        assert_eq!(ev.mask, Some(0b111));
        assert_eq!(ev.strategy, Some(GateStrategy::Bitmask));
    }
}
