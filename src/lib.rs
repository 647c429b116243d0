//! # taskgate
//!
//! **Taskgate** gates a set of supervised async worker tasks behind a
//! one-time initialization phase, and demonstrates three alternative release
//! mechanisms behind one contract:
//!
//! - a **counting** gate (N interchangeable permits),
//! - a **bitmask** gate (one private bit per waiter, released all at once),
//! - a **spawn** gate (workers are created only after init completes).
//!
//! All three solve the same problem — *do not let worker logic run until
//! setup finishes* — with different primitives. Workers and the init
//! sequencer depend only on the [`ReleaseGate`] contract, so the mechanism
//! is swappable without touching worker logic.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  WorkerSpec  │   │  WorkerSpec  │   │  WorkerSpec  │
//!     │   (task-a)   │   │   (task-b)   │   │   (task-c)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (composition root)                                    │
//! │  - selects ONE ReleaseGate strategy (counting/bitmask/spawn)      │
//! │  - Bus (broadcast events)  - Registry (task handles by name)      │
//! │  - StateTracker (parked/active per worker)                        │
//! └──────┬──────────────────────────────┬─────────────────────────────┘
//!        ▼                              ▼
//!   ┌──────────────┐             ┌──────────────┐
//!   │ InitSequencer│── open() ──►│ ReleaseGate  │◄── wait(id) ── Worker × N
//!   │  (one shot)  │             │  (1 of 3)    │
//!   └──────────────┘             └──────────────┘
//!
//! Data flows one direction: InitSequencer → ReleaseGate → Workers.
//! ```
//!
//! ## Lifecycle
//! ```text
//! Supervisor::run(strategy, workers)
//!   ├─► validate composition (fatal on duplicates / bad waiter ids)
//!   ├─► build gate, capacity = worker count
//!   ├─► spawn init sequencer (lowest priority)
//!   ├─► counting/bitmask: spawn all workers up front (they park on wait)
//!   │   spawn:            workers deferred inside the gate
//!   │
//!   ├─► sequencer: workload (countdown) → gate.open() → retire
//!   │        │ failure/cancel → gate stays closed, workers stay parked
//!   │        ▼
//!   ├─► workers: wait() returns → periodic loop until cancelled
//!   │
//!   └─► OS signal / shutdown() → cancel all → join within grace
//! ```
//!
//! ## Ordering
//! Workers request the gate in registration order but resume in whatever
//! order the runtime schedules the simultaneously released tasks. The gate
//! only decides *whether/when* a waiter's condition is satisfied — it never
//! orders resumes; [`Priority`] metadata is carried on every spawn request
//! for schedulers that honor it.
//!
//! ## Features
//! | Area            | Description                                             | Key types / traits                          |
//! |-----------------|---------------------------------------------------------|---------------------------------------------|
//! | **Gates**       | One contract, three release strategies.                 | [`ReleaseGate`], [`CountingGate`], [`BitmaskGate`], [`SpawnGate`] |
//! | **Tasks**       | Cancelable async units; gated periodic workers.         | [`Task`], [`TaskFn`], [`Worker`], [`InitSequencer`] |
//! | **Supervision** | Composition root, registry, graceful shutdown.          | [`Supervisor`]                              |
//! | **Subscriber API** | Hook into runtime events (logging, tracking).        | [`Subscribe`], [`StateTracker`]             |
//! | **Errors**      | Typed fail-fast errors for gates and the runtime.       | [`GateError`], [`TaskError`], [`RuntimeError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use taskgate::{Config, GateStrategy, Priority, Supervisor, WaiterId, WorkerSpec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default(); // 5-tick countdown, 1s per tick
//!     let sup = Supervisor::builder(cfg).build();
//!
//!     // Three workers park on the gate in registration order; the runtime
//!     // decides who runs first once the sequencer opens it.
//!     let workers = vec![
//!         WorkerSpec::new("task-a", WaiterId::new(0), Duration::from_millis(2500), Priority(2)),
//!         WorkerSpec::new("task-b", WaiterId::new(1), Duration::from_millis(3000), Priority(3)),
//!         WorkerSpec::new("task-c", WaiterId::new(2), Duration::from_millis(5000), Priority(4)),
//!     ];
//!
//!     sup.run(GateStrategy::Counting, workers).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod gates;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Supervisor, SupervisorBuilder};
pub use error::{GateError, RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use gates::{
    BitmaskGate, CountingGate, GateRef, GateStrategy, Release, ReleaseGate, SpawnGate, WaiterId,
};
pub use subscribers::{StateTracker, Subscribe, SubscriberSet, WaiterState};
pub use tasks::{InitSequencer, Priority, Task, TaskFn, TaskRef, Worker, WorkerSpec};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
