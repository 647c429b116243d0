//! # One-shot initialization sequencer.
//!
//! [`InitSequencer`] runs an opaque initialization workload and, on success,
//! performs the gate release exactly once. Workers stay blocked while the
//! workload runs — and stay blocked forever if it fails or is cancelled:
//! releasing against an unverified precondition is worse than not releasing.
//!
//! ## Lifecycle
//! ```text
//! run(ctx)
//!   ├─► publish InitStarted
//!   ├─► workload.run(ctx)
//!   │     ├─ Err/cancel ──► return (gate stays closed)
//!   │     └─ Ok
//!   ├─► gate.open()              (exactly once; double release is fatal)
//!   ├─► publish GateOpened, InitCompleted
//!   └─► return                   (the task retires; registry reclaims it)
//! ```
//!
//! The bundled [`countdown`](InitSequencer::countdown) workload models a
//! bounded-duration init phase: it publishes one `InitTick` per remaining
//! unit and paces itself on the tick source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::gates::GateRef;
use crate::tasks::{Task, TaskFn, TaskRef};

/// Name under which the sequencer is registered. Reserved: no worker may
/// use it.
pub(crate) const INIT_TASK_NAME: &str = "init";

/// One-shot initialization task that opens the gate on success.
pub struct InitSequencer {
    gate: GateRef,
    workload: TaskRef,
    bus: Bus,
    /// Re-entry guard: the sequencer must never run twice.
    entered: AtomicBool,
}

impl InitSequencer {
    /// Creates a sequencer around an externally supplied workload.
    pub fn new(gate: GateRef, workload: TaskRef, bus: Bus) -> Self {
        Self {
            gate,
            workload,
            bus,
            entered: AtomicBool::new(false),
        }
    }

    /// Creates the sequencer and returns it as a shared handle.
    pub fn arc(gate: GateRef, workload: TaskRef, bus: Bus) -> Arc<Self> {
        Arc::new(Self::new(gate, workload, bus))
    }

    /// Creates a sequencer with the bundled countdown workload: `ticks`
    /// progress ticks, one every `tick`.
    pub fn countdown(gate: GateRef, ticks: u32, tick: Duration, bus: Bus) -> Arc<Self> {
        let tick_bus = bus.clone();
        let workload: TaskRef = TaskFn::arc("init-countdown", move |ctx: CancellationToken| {
            let bus = tick_bus.clone();
            async move {
                for remaining in (1..=ticks).rev() {
                    bus.publish(Event::now(EventKind::InitTick).with_tick(remaining));
                    tokio::select! {
                        _ = time::sleep(tick) => {}
                        _ = ctx.cancelled() => return Err(TaskError::Canceled),
                    }
                }
                Ok(())
            }
        });
        Self::arc(gate, workload, bus)
    }
}

#[async_trait]
impl Task for InitSequencer {
    fn name(&self) -> &str {
        INIT_TASK_NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        if self.entered.swap(true, Ordering::AcqRel) {
            return Err(TaskError::Fatal {
                error: "init sequencer re-entered".to_string(),
            });
        }

        self.bus
            .publish(Event::now(EventKind::InitStarted).with_task(self.name()));

        // A failed or cancelled workload leaves the gate closed.
        self.workload.run(ctx).await?;

        self.gate.open()?;
        self.bus.publish(
            Event::now(EventKind::GateOpened)
                .with_task(self.name())
                .with_strategy(self.gate.strategy()),
        );
        self.bus
            .publish(Event::now(EventKind::InitCompleted).with_task(self.name()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::{CountingGate, ReleaseGate};
    use tokio::time::timeout;

    const LONG: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn countdown_completes_then_opens_the_gate() {
        let bus = Bus::new(64);
        let gate = Arc::new(CountingGate::new(2).unwrap());
        let seq = InitSequencer::countdown(
            gate.clone(),
            3,
            Duration::from_millis(5),
            bus.clone(),
        );

        let mut rx = bus.subscribe();
        assert!(!gate.is_open());

        timeout(LONG, seq.run(CancellationToken::new()))
            .await
            .expect("countdown is bounded")
            .unwrap();
        assert!(gate.is_open());

        let mut ticks = Vec::new();
        let mut saw_opened = false;
        let mut saw_completed = false;
        while let Ok(ev) = rx.try_recv() {
            match ev.kind {
                EventKind::InitTick => ticks.push(ev.tick.expect("tick value")),
                EventKind::GateOpened => saw_opened = true,
                EventKind::InitCompleted => saw_completed = true,
                _ => {}
            }
        }
        assert_eq!(ticks, vec![3, 2, 1]);
        assert!(saw_opened);
        assert!(saw_completed);
    }

    #[tokio::test]
    async fn cancelled_workload_leaves_the_gate_closed() {
        let bus = Bus::new(64);
        let gate = Arc::new(CountingGate::new(1).unwrap());
        let seq = InitSequencer::countdown(
            gate.clone(),
            100,
            Duration::from_millis(10),
            bus.clone(),
        );

        let token = CancellationToken::new();
        let handle = {
            let seq = Arc::clone(&seq);
            let token = token.clone();
            tokio::spawn(async move { seq.run(token).await })
        };

        time::sleep(Duration::from_millis(25)).await;
        token.cancel();

        let exit = timeout(LONG, handle).await.expect("sequencer exits").unwrap();
        assert!(matches!(exit, Err(TaskError::Canceled)));
        assert!(!gate.is_open(), "no release against an unverified precondition");
    }

    #[tokio::test]
    async fn failing_workload_leaves_the_gate_closed() {
        let bus = Bus::new(64);
        let gate = Arc::new(CountingGate::new(1).unwrap());
        let workload: TaskRef = TaskFn::arc("boom", |_ctx: CancellationToken| async {
            Err(TaskError::Fail {
                error: "probe failed".to_string(),
            })
        });
        let seq = InitSequencer::arc(gate.clone(), workload, bus);

        let exit = seq.run(CancellationToken::new()).await;
        assert!(matches!(exit, Err(TaskError::Fail { .. })));
        assert!(!gate.is_open());
    }

    #[tokio::test]
    async fn re_entry_is_fatal_and_releases_nothing_twice() {
        let bus = Bus::new(64);
        let gate = Arc::new(CountingGate::new(1).unwrap());
        let seq = InitSequencer::countdown(gate.clone(), 0, Duration::from_millis(1), bus);

        seq.run(CancellationToken::new()).await.unwrap();
        assert!(gate.is_open());

        let second = seq.run(CancellationToken::new()).await;
        assert!(matches!(second, Err(TaskError::Fatal { .. })));
        assert_eq!(gate.available(), 1, "second run must not grant again");
    }
}
