//! # Run a single task execution.
//!
//! Executes a [`Task`] once and publishes its lifecycle events to the
//! [`Bus`]. Tasks in this system run exactly once: workers loop internally
//! until cancelled, and the sequencer retires after its one shot — there is
//! no restart path.
//!
//! ## Event flow
//! ```text
//! Success:
//!   task.run() → Ok(())         → publish TaskStopped
//!
//! Cancellation:
//!   task.run() → Err(Canceled)  → publish TaskStopped (graceful exit)
//!
//! Failure:
//!   task.run() → Err(other)     → publish TaskFailed
//!
//! Always, afterwards:            publish TaskRetired
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `TaskStopped` or
//!   `TaskFailed`
//! - `Canceled` is treated as graceful exit → `TaskStopped`
//! - `TaskRetired` follows the terminal event so the registry can reclaim
//!   the handle

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::TaskRef;

/// Executes `task` once, publishing lifecycle events to `bus`.
pub(crate) async fn run_task(task: TaskRef, token: CancellationToken, bus: Bus) {
    bus.publish(Event::now(EventKind::TaskStarting).with_task(task.name().to_string()));

    match task.run(token).await {
        Ok(()) => publish_stopped(&bus, task.name()),
        Err(TaskError::Canceled) => publish_stopped(&bus, task.name()),
        Err(e) => publish_failed(&bus, task.name(), &e),
    }

    bus.publish(Event::now(EventKind::TaskRetired).with_task(task.name().to_string()));
}

/// Publishes `TaskStopped` (success or graceful cancellation).
fn publish_stopped(bus: &Bus, name: &str) {
    bus.publish(Event::now(EventKind::TaskStopped).with_task(name.to_string()));
}

/// Publishes `TaskFailed` with error details.
fn publish_failed(bus: &Bus, name: &str, err: &TaskError) {
    bus.publish(
        Event::now(EventKind::TaskFailed)
            .with_task(name.to_string())
            .with_reason(err.to_string()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;

    #[tokio::test]
    async fn success_publishes_stopped_then_retired() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let task: TaskRef = TaskFn::arc("ok", |_ctx: CancellationToken| async { Ok(()) });

        run_task(task, CancellationToken::new(), bus).await;

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskStarting,
                EventKind::TaskStopped,
                EventKind::TaskRetired
            ]
        );
    }

    #[tokio::test]
    async fn failure_publishes_failed_with_reason() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let task: TaskRef = TaskFn::arc("bad", |_ctx: CancellationToken| async {
            Err(TaskError::Fail {
                error: "boom".to_string(),
            })
        });

        run_task(task, CancellationToken::new(), bus).await;

        let failed = std::iter::from_fn(|| rx.try_recv().ok())
            .find(|ev| ev.kind == EventKind::TaskFailed)
            .expect("failed event");
        assert!(failed.reason.as_deref().unwrap_or("").contains("boom"));
    }

    #[tokio::test]
    async fn cancellation_counts_as_graceful_stop() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let task: TaskRef =
            TaskFn::arc("cancelled", |_ctx: CancellationToken| async {
                Err(TaskError::Canceled)
            });

        run_task(task, CancellationToken::new(), bus).await;

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert!(kinds.contains(&EventKind::TaskStopped));
        assert!(!kinds.contains(&EventKind::TaskFailed));
    }
}
