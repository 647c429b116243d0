//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format — the
//! serial-console lines of the reference scenarios.
//!
//! ## Output format
//! ```text
//! [spawned] task=task-a priority=2
//! [init] starting
//! [init] countdown t-3
//! [gate] opened strategy=counting
//! [parked] worker=task-a waiter=w0
//! [resumed] worker=task-c strategy=bitmask mask=0b111
//! [beat] worker=task-c
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom
/// [`Subscribe`] for structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::InitStarted => println!("[init] starting"),
            EventKind::InitTick => {
                if let Some(t) = e.tick {
                    println!("[init] countdown t-{t}");
                }
            }
            EventKind::InitCompleted => println!("[init] complete"),
            EventKind::GateOpened => {
                let strategy = e.strategy.map(|s| s.as_label()).unwrap_or("?");
                println!("[gate] opened strategy={strategy}");
            }
            EventKind::WaiterParked => {
                if let (Some(task), Some(w)) = (&e.task, e.waiter) {
                    println!("[parked] worker={task} waiter={w}");
                }
            }
            EventKind::WaiterResumed => {
                let task = e.task.as_deref().unwrap_or("?");
                let strategy = e.strategy.map(|s| s.as_label()).unwrap_or("?");
                match e.mask {
                    Some(mask) => {
                        println!("[resumed] worker={task} strategy={strategy} mask={mask:#b}")
                    }
                    None => println!("[resumed] worker={task} strategy={strategy}"),
                }
            }
            EventKind::WorkerBeat => {
                if let Some(task) = &e.task {
                    println!("[beat] worker={task}");
                }
            }
            EventKind::TaskSpawnRequested => {
                if let Some(task) = &e.task {
                    println!("[spawn-requested] task={task}");
                }
            }
            EventKind::TaskSpawned => {
                let task = e.task.as_deref().unwrap_or("?");
                match e.priority {
                    Some(p) => println!("[spawned] task={task} priority={p}"),
                    None => println!("[spawned] task={task}"),
                }
            }
            EventKind::SpawnRejected => {
                println!(
                    "[spawn-rejected] task={:?} reason={:?}",
                    e.task, e.reason
                );
            }
            EventKind::TaskStarting => {
                if let Some(task) = &e.task {
                    println!("[starting] task={task}");
                }
            }
            EventKind::TaskStopped => {
                if let Some(task) = &e.task {
                    println!("[stopped] task={task}");
                }
            }
            EventKind::TaskFailed => {
                println!("[failed] task={:?} err={:?}", e.task, e.reason);
            }
            EventKind::TaskRetired => {
                if let Some(task) = &e.task {
                    println!("[retired] task={task}");
                }
            }
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::AllStoppedWithin => println!("[all-stopped-within-grace]"),
            EventKind::GraceExceeded => println!("[grace-exceeded]"),
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panic] name={:?} info={:?}", e.task, e.reason);
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] name={:?} reason={:?}", e.task, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
