//! # Supervisor: composition root, fan-out delivery, and graceful shutdown.
//!
//! The [`Supervisor`] owns the event bus, a [`SubscriberSet`], the task
//! [`Registry`] and the release gate it constructs for the selected
//! strategy. It is the only component aware of all three strategies; workers
//! and the sequencer depend only on the gate contract, so the mechanism is
//! swappable without touching worker logic.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   GateStrategy + Vec<WorkerSpec> ──► Supervisor::run()
//!
//! Preparation:
//!   - validate composition (unique labels, in-range waiter ids)
//!   - build the gate (capacity = worker count)
//!   - spawn requests:
//!       Counting/Bitmask: sequencer (lowest priority) + all workers up front
//!       Spawn:            sequencer only; the gate defers the workers
//!
//! Event flow:
//!   tasks/gates ── publish(Event) ──► Bus ──► subscriber listener ──► SubscriberSet
//!                                        └──► Registry listener (spawns tasks)
//!
//! Shutdown path:
//!   OS signal or shutdown()
//!             └─► Bus.publish(ShutdownRequested)
//!             └─► runtime_token.cancel()   → propagates to child tokens
//!             └─► wait_all_with_grace(cfg.grace):
//!                    ├─ Ok (all joined)    → Bus.publish(AllStoppedWithin)
//!                    └─ Timeout exceeded   → Bus.publish(GraceExceeded)
//!                                            (StateTracker names the stuck tasks)
//! ```
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use taskgate::{
//!     Config, GateStrategy, Priority, Supervisor, WaiterId, WorkerSpec,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.countdown = 5;
//!
//!     let sup = Supervisor::builder(cfg).build();
//!
//!     let workers = vec![
//!         WorkerSpec::new("task-a", WaiterId::new(0), Duration::from_millis(2500), Priority(2)),
//!         WorkerSpec::new("task-b", WaiterId::new(1), Duration::from_millis(3000), Priority(3)),
//!         WorkerSpec::new("task-c", WaiterId::new(2), Duration::from_millis(5000), Priority(4)),
//!     ];
//!
//!     // Runs until a termination signal arrives.
//!     sup.run(GateStrategy::Counting, workers).await?;
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::builder::SupervisorBuilder;
use crate::core::registry::Registry;
use crate::core::shutdown;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind, SpawnRequest};
use crate::gates::{BitmaskGate, CountingGate, GateRef, GateStrategy, SpawnGate};
use crate::subscribers::{StateTracker, SubscriberSet};
use crate::tasks::{InitSequencer, Priority, TaskRef, Worker, WorkerSpec, INIT_TASK_NAME};

/// Coordinates the gate, the sequencer, the worker set and graceful
/// shutdown.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    tracker: Arc<StateTracker>,
    registry: Arc<Registry>,
    runtime_token: CancellationToken,
}

impl Supervisor {
    /// Returns a builder for constructing a supervisor.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        tracker: Arc<StateTracker>,
        registry: Arc<Registry>,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            tracker,
            registry,
            runtime_token,
        }
    }

    /// Returns the event bus, for subscribing to runtime events.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns the tracker of task liveness and worker gate state.
    pub fn tracker(&self) -> &Arc<StateTracker> {
        &self.tracker
    }

    /// Returns the sorted names of tasks currently registered.
    pub async fn tasks(&self) -> Vec<String> {
        self.registry.list().await
    }

    /// Requests runtime shutdown, as if a termination signal had arrived.
    pub fn shutdown(&self) {
        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        self.runtime_token.cancel();
    }

    /// Runs the system under the selected release strategy until a
    /// termination signal arrives or [`shutdown`](Supervisor::shutdown) is
    /// called.
    ///
    /// For the counting and bitmask strategies all tasks (sequencer
    /// included) are created up front: workers in registration order, the
    /// sequencer at the lowest priority. For the spawn strategy only the
    /// sequencer is created up front; the gate creates the workers after
    /// initialization completes.
    pub async fn run(
        &self,
        strategy: GateStrategy,
        workers: Vec<WorkerSpec>,
    ) -> Result<(), RuntimeError> {
        self.validate(&workers)?;
        let capacity = workers.len();

        let gate: GateRef = match strategy {
            GateStrategy::Counting => Arc::new(CountingGate::new(capacity)?),
            GateStrategy::Bitmask => Arc::new(BitmaskGate::new(capacity)?),
            GateStrategy::Spawn => SpawnGate::arc(workers.clone(), self.bus.clone())?,
        };

        let sequencer = InitSequencer::countdown(
            Arc::clone(&gate),
            self.cfg.countdown,
            self.cfg.tick,
            self.bus.clone(),
        );
        self.request_spawn(sequencer, self.cfg.init_priority);

        if !matches!(strategy, GateStrategy::Spawn) {
            for spec in workers {
                let priority = spec.priority();
                let worker = Worker::arc(spec, Arc::clone(&gate), self.bus.clone());
                self.request_spawn(worker, priority);
            }
        }

        self.drive_shutdown().await
    }

    /// Rejects inconsistent worker sets before anything is spawned.
    fn validate(&self, workers: &[WorkerSpec]) -> Result<(), RuntimeError> {
        if workers.is_empty() {
            return Err(RuntimeError::Composition {
                reason: "no workers registered".to_string(),
            });
        }

        let mut labels = HashSet::new();
        let mut waiters = HashSet::new();
        for spec in workers {
            if spec.label() == INIT_TASK_NAME {
                return Err(RuntimeError::Composition {
                    reason: format!("worker label {INIT_TASK_NAME:?} is reserved"),
                });
            }
            if !labels.insert(spec.label().to_string()) {
                return Err(RuntimeError::Composition {
                    reason: format!("duplicate worker label {:?}", spec.label()),
                });
            }
            if spec.waiter().index() >= workers.len() {
                return Err(RuntimeError::Composition {
                    reason: format!(
                        "waiter {} outside 0..{}",
                        spec.waiter(),
                        workers.len()
                    ),
                });
            }
            if !waiters.insert(spec.waiter()) {
                return Err(RuntimeError::Composition {
                    reason: format!("duplicate waiter {}", spec.waiter()),
                });
            }
        }
        Ok(())
    }

    /// Publishes a spawn request for the registry to act on.
    fn request_spawn(&self, task: TaskRef, priority: Priority) {
        self.bus.publish(
            Event::now(EventKind::TaskSpawnRequested)
                .with_task(task.name().to_string())
                .with_priority(priority)
                .with_request(SpawnRequest { task, priority }),
        );
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    ///
    /// The receiver is created synchronously, so no event published after
    /// construction can be missed.
    pub(crate) fn spawn_subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Waits until a termination signal or an explicit shutdown, then joins
    /// all tasks within the grace period.
    async fn drive_shutdown(&self) -> Result<(), RuntimeError> {
        tokio::select! {
            _ = shutdown::wait_for_shutdown_signal() => {
                self.bus.publish(Event::now(EventKind::ShutdownRequested));
                self.runtime_token.cancel();
            }
            _ = self.runtime_token.cancelled() => {}
        }
        self.wait_all_with_grace().await
    }

    /// Waits for all tasks to finish within the configured grace period.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] on timeout and returns
    /// [`RuntimeError::GraceExceeded`] with the list of stuck tasks.
    async fn wait_all_with_grace(&self) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        match time::timeout(grace, self.registry.cancel_all()).await {
            Ok(()) => {
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::now(EventKind::GraceExceeded));
                let stuck = self.tracker.alive().await;
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }
}
