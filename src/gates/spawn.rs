//! # Deferred-spawn release gate.
//!
//! [`SpawnGate`] holds no blocking state at all: "release" means *create the
//! worker tasks*, which did not exist before. A worker's release condition
//! is satisfied by construction the moment it runs — creation happens-after
//! initialization completion because the sequencer performs it, in
//! sequential code, after its workload finishes.
//!
//! ## Shape
//! ```text
//! SpawnGate { deferred: [spec-a, spec-b, spec-c] }
//!
//! open() ── drain once ──► TaskSpawnRequested × N ──► Bus ──► Registry
//!                                                              └─► spawn
//! ```
//!
//! ## Rules
//! - Each worker is created at most once: `open` drains the deferred list
//!   exactly once, a second call fails.
//! - `wait` returns immediately — a spawn-gated worker only exists once its
//!   condition already holds. The identity is still validated.
//! - Simplest of the three strategies, and the least flexible: it cannot
//!   re-gate a task that already runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;

use crate::error::GateError;
use crate::events::{Bus, Event, EventKind, SpawnRequest};
use crate::gates::{GateRef, GateStrategy, Release, ReleaseGate, WaiterId};
use crate::tasks::{TaskRef, Worker, WorkerSpec};

/// Startup gate that releases workers by creating them.
pub struct SpawnGate {
    /// Self-handle passed to spawned workers as their gate capability.
    me: Weak<SpawnGate>,
    capacity: usize,
    /// Worker configurations awaiting creation; drained on `open`.
    deferred: Mutex<Vec<WorkerSpec>>,
    opened: AtomicBool,
    bus: Bus,
}

impl SpawnGate {
    /// Creates a gate deferring the given workers until `open`.
    ///
    /// Spawned workers receive this gate as their [`GateRef`], so the gate
    /// is built cyclic from the start.
    pub fn arc(workers: Vec<WorkerSpec>, bus: Bus) -> Result<Arc<Self>, GateError> {
        if workers.is_empty() {
            return Err(GateError::Empty);
        }
        let capacity = workers.len();
        Ok(Arc::new_cyclic(|me| Self {
            me: me.clone(),
            capacity,
            deferred: Mutex::new(workers),
            opened: AtomicBool::new(false),
            bus,
        }))
    }

    /// Returns the number of workers still awaiting creation.
    pub fn deferred_len(&self) -> usize {
        match self.deferred.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[async_trait]
impl ReleaseGate for SpawnGate {
    fn strategy(&self) -> GateStrategy {
        GateStrategy::Spawn
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    /// Task existence is the synchronization mechanism: if this runs, the
    /// release already happened.
    async fn wait(&self, waiter: WaiterId) -> Result<Release, GateError> {
        if waiter.index() >= self.capacity {
            return Err(GateError::UnknownWaiter {
                waiter,
                capacity: self.capacity,
            });
        }
        Ok(Release { mask: None })
    }

    /// Drains the deferred worker list exactly once and publishes one spawn
    /// request per worker.
    fn open(&self) -> Result<(), GateError> {
        if self.opened.swap(true, Ordering::AcqRel) {
            return Err(GateError::AlreadyOpen);
        }
        let gate: GateRef = match self.me.upgrade() {
            Some(me) => me,
            None => return Err(GateError::Closed),
        };
        let specs: Vec<WorkerSpec> = {
            let mut guard = match self.deferred.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.drain(..).collect()
        };
        for spec in specs {
            let priority = spec.priority();
            let worker: TaskRef = Worker::arc(spec, Arc::clone(&gate), self.bus.clone());
            self.bus.publish(
                Event::now(EventKind::TaskSpawnRequested)
                    .with_task(worker.name().to_string())
                    .with_priority(priority)
                    .with_request(SpawnRequest {
                        task: worker,
                        priority,
                    }),
            );
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Priority;
    use std::time::Duration;

    fn specs() -> Vec<WorkerSpec> {
        vec![
            WorkerSpec::new("task-a", WaiterId::new(0), Duration::from_millis(10), Priority(1)),
            WorkerSpec::new("task-b", WaiterId::new(1), Duration::from_millis(10), Priority(2)),
        ]
    }

    #[test]
    fn empty_worker_set_is_rejected() {
        let bus = Bus::new(8);
        assert!(matches!(
            SpawnGate::arc(Vec::new(), bus),
            Err(GateError::Empty)
        ));
    }

    #[tokio::test]
    async fn open_publishes_one_request_per_worker() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let gate = SpawnGate::arc(specs(), bus).unwrap();

        assert_eq!(gate.deferred_len(), 2);
        assert!(!gate.is_open());

        gate.open().unwrap();
        assert!(gate.is_open());
        assert_eq!(gate.deferred_len(), 0);

        let mut requested = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::TaskSpawnRequested {
                assert!(ev.request.is_some(), "spawn request carries the task");
                requested.push(ev.task.as_deref().map(str::to_string));
            }
        }
        assert_eq!(
            requested,
            vec![Some("task-a".to_string()), Some("task-b".to_string())]
        );
    }

    #[tokio::test]
    async fn double_open_is_rejected_and_spawns_nothing() {
        let bus = Bus::new(16);
        let gate = SpawnGate::arc(specs(), bus.clone()).unwrap();
        gate.open().unwrap();

        let mut rx = bus.subscribe();
        assert_eq!(gate.open().unwrap_err(), GateError::AlreadyOpen);
        assert!(rx.try_recv().is_err(), "no events after a rejected open");
    }

    #[tokio::test]
    async fn wait_is_immediate_for_registered_waiters() {
        let bus = Bus::new(8);
        let gate = SpawnGate::arc(specs(), bus).unwrap();

        gate.wait(WaiterId::new(0)).await.unwrap();
        assert_eq!(
            gate.wait(WaiterId::new(7)).await.unwrap_err(),
            GateError::UnknownWaiter {
                waiter: WaiterId::new(7),
                capacity: 2
            }
        );
    }
}
