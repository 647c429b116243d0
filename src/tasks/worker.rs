//! # Gated periodic worker.
//!
//! [`Worker`] is a named unit of repeating work that waits on a release gate
//! before entering its operational loop. One parameterized type covers every
//! worker in the system; the strategy behind the gate and the loop interval
//! are configuration, not code.
//!
//! ## Lifecycle
//! ```text
//! run(ctx)
//!   ├─► publish WaiterParked
//!   ├─► gate.wait(waiter)            (cancellable; blocks until release)
//!   ├─► publish WaiterResumed        (WAITING → ACTIVE, exactly once)
//!   └─► loop {
//!         publish WorkerBeat
//!         sleep(interval)            (cancellable)
//!       }
//! ```
//!
//! Workers are mutually independent once released: no worker depends on any
//! other, and only the runtime decides which released worker runs next.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};
use crate::gates::{GateRef, WaiterId};
use crate::tasks::{Priority, Task};

/// Configuration of a single worker.
///
/// The loop interval is the only meaningful per-worker knob (2000–7000 ms in
/// the reference scenarios); everything else is identity and scheduling
/// metadata.
#[derive(Clone, Debug)]
pub struct WorkerSpec {
    label: Cow<'static, str>,
    waiter: WaiterId,
    interval: Duration,
    priority: Priority,
}

impl WorkerSpec {
    /// Creates a worker configuration.
    pub fn new(
        label: impl Into<Cow<'static, str>>,
        waiter: WaiterId,
        interval: Duration,
        priority: Priority,
    ) -> Self {
        Self {
            label: label.into(),
            waiter,
            interval,
            priority,
        }
    }

    /// Returns the worker's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the worker's waiter identity on the gate.
    pub fn waiter(&self) -> WaiterId {
        self.waiter
    }

    /// Returns the pause between loop iterations.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the worker's scheduling priority metadata.
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

/// A worker task gated behind a [`ReleaseGate`](crate::gates::ReleaseGate).
pub struct Worker {
    spec: WorkerSpec,
    gate: GateRef,
    bus: Bus,
}

impl Worker {
    /// Creates a worker wired to the given gate and event bus.
    pub fn new(spec: WorkerSpec, gate: GateRef, bus: Bus) -> Self {
        Self { spec, gate, bus }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(spec: WorkerSpec, gate: GateRef, bus: Bus) -> Arc<Self> {
        Arc::new(Self::new(spec, gate, bus))
    }

    /// Returns the worker's configuration.
    pub fn spec(&self) -> &WorkerSpec {
        &self.spec
    }
}

#[async_trait]
impl Task for Worker {
    fn name(&self) -> &str {
        self.spec.label()
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        let waiter = self.spec.waiter();
        self.bus.publish(
            Event::now(EventKind::WaiterParked)
                .with_task(self.name().to_string())
                .with_waiter(waiter),
        );

        // The gate itself blocks indefinitely; shutdown is the caller's
        // concern and cuts in here, not inside the gate.
        let release = tokio::select! {
            res = self.gate.wait(waiter) => res?,
            _ = ctx.cancelled() => return Err(TaskError::Canceled),
        };

        let mut resumed = Event::now(EventKind::WaiterResumed)
            .with_task(self.name().to_string())
            .with_waiter(waiter)
            .with_strategy(self.gate.strategy());
        if let Some(mask) = release.mask {
            resumed = resumed.with_mask(mask);
        }
        self.bus.publish(resumed);

        loop {
            self.bus
                .publish(Event::now(EventKind::WorkerBeat).with_task(self.name().to_string()));

            tokio::select! {
                _ = time::sleep(self.spec.interval()) => {}
                _ = ctx.cancelled() => return Err(TaskError::Canceled),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::{CountingGate, ReleaseGate};
    use tokio::time::timeout;

    const SHORT: Duration = Duration::from_millis(40);
    const LONG: Duration = Duration::from_millis(500);

    fn worker_on(gate: GateRef, bus: &Bus) -> Arc<Worker> {
        Worker::arc(
            WorkerSpec::new(
                "task-a",
                WaiterId::new(0),
                Duration::from_millis(10),
                Priority(1),
            ),
            gate,
            bus.clone(),
        )
    }

    #[tokio::test]
    async fn worker_stays_parked_until_release() {
        let bus = Bus::new(64);
        let gate = Arc::new(CountingGate::new(1).unwrap());
        let worker = worker_on(gate.clone(), &bus);

        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let handle = {
            let worker = Arc::clone(&worker);
            let token = token.clone();
            tokio::spawn(async move { worker.run(token).await })
        };

        time::sleep(SHORT).await;
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert!(kinds.contains(&EventKind::WaiterParked));
        assert!(!kinds.contains(&EventKind::WaiterResumed));

        gate.open().unwrap();
        // Resumed and beating now.
        let resumed = timeout(LONG, async {
            loop {
                let ev = rx.recv().await.expect("bus open");
                if ev.kind == EventKind::WaiterResumed {
                    return ev;
                }
            }
        })
        .await
        .expect("worker resumes after release");
        assert_eq!(resumed.task.as_deref(), Some("task-a"));

        token.cancel();
        let exit = timeout(LONG, handle).await.expect("worker exits").unwrap();
        assert!(matches!(exit, Err(TaskError::Canceled)));
    }

    #[tokio::test]
    async fn cancellation_while_parked_exits_without_resuming() {
        let bus = Bus::new(64);
        let gate = Arc::new(CountingGate::new(1).unwrap());
        let worker = worker_on(gate, &bus);

        let token = CancellationToken::new();
        let handle = {
            let worker = Arc::clone(&worker);
            let token = token.clone();
            tokio::spawn(async move { worker.run(token).await })
        };

        time::sleep(SHORT).await;
        token.cancel();
        let exit = timeout(LONG, handle).await.expect("worker exits").unwrap();
        assert!(matches!(exit, Err(TaskError::Canceled)));
    }

    #[tokio::test]
    async fn released_worker_beats_periodically() {
        let bus = Bus::new(256);
        let gate = Arc::new(CountingGate::new(1).unwrap());
        gate.open().unwrap();
        let worker = worker_on(gate, &bus);

        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let handle = {
            let worker = Arc::clone(&worker);
            let token = token.clone();
            tokio::spawn(async move { worker.run(token).await })
        };

        time::sleep(SHORT).await;
        token.cancel();
        let _ = timeout(LONG, handle).await.expect("worker exits");

        let mut beats = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::WorkerBeat {
                beats += 1;
            }
        }
        assert!(beats >= 2, "expected repeated beats, saw {beats}");
    }
}
