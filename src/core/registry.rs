//! # Task registry - event-driven task lifecycle manager.
//!
//! Registry subscribes to Bus events and manages active tasks:
//! - Listens for `TaskSpawnRequested` → spawns the task and registers it
//! - Listens for `TaskRetired` → joins and removes the finished task
//!
//! ## Architecture
//! ```text
//! Bus → Registry.spawn_listener()
//!         ├─► TaskSpawnRequested(task, priority) → spawn_and_register()
//!         └─► TaskRetired(name)                  → cleanup_task(name)
//! ```
//!
//! ## Rules
//! - Registry owns the task handles (JoinHandle + CancellationToken)
//! - Duplicate names are rejected with a `SpawnRejected` event — creation
//!   failures surface, they are never silently ignored
//! - Cleanup is automatic via events (no polling needed)
//! - `list()` exposes the registry contents: with the spawn strategy this is
//!   how "no worker task exists before init completes" is observable

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::runner::run_task;
use crate::events::{Bus, Event, EventKind, SpawnRequest};

/// Handle to a running task.
struct Handle {
    /// Join handle for the task's execution.
    join: JoinHandle<()>,
    /// Individual cancellation token for this task.
    cancel: CancellationToken,
}

/// Event-driven registry of active tasks.
pub(crate) struct Registry {
    tasks: RwLock<HashMap<String, Handle>>,
    bus: Bus,
    runtime_token: CancellationToken,
}

impl Registry {
    /// Creates a new registry.
    pub(crate) fn new(bus: Bus, runtime_token: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            tasks: RwLock::new(HashMap::new()),
            bus,
            runtime_token,
        })
    }

    /// Spawns the event listener that manages task lifecycle.
    ///
    /// Call once during supervisor construction. The bus receiver is created
    /// synchronously, so no spawn request published afterwards can be lost.
    pub(crate) fn spawn_listener(self: &Arc<Self>) {
        let mut rx = self.bus.subscribe();
        let rt = self.runtime_token.clone();
        let me = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = rt.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => me.handle_event(&ev).await,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
            }
        });
    }

    /// Handles incoming events.
    async fn handle_event(&self, event: &Event) {
        match event.kind {
            EventKind::TaskSpawnRequested => {
                if let Some(request) = &event.request {
                    self.spawn_and_register(request.clone()).await;
                }
            }
            EventKind::TaskRetired => {
                if let Some(name) = &event.task {
                    self.cleanup_task(name).await;
                }
            }
            _ => {}
        }
    }

    /// Returns the sorted list of registered task names.
    pub(crate) async fn list(&self) -> Vec<String> {
        let tasks = self.tasks.read().await;
        let mut names: Vec<String> = tasks.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Cancels all tasks in the registry: cancel → join.
    pub(crate) async fn cancel_all(&self) {
        let handles: Vec<(String, Handle)> = {
            let mut tasks = self.tasks.write().await;
            tasks.drain().collect()
        };

        for (_, h) in &handles {
            h.cancel.cancel();
        }

        for (_, h) in handles {
            let _ = h.join.await;
        }
    }

    /// Spawns the requested task and adds it to the registry.
    async fn spawn_and_register(&self, request: SpawnRequest) {
        let name = request.task.name().to_string();

        {
            let tasks = self.tasks.read().await;
            if tasks.contains_key(&name) {
                self.bus.publish(
                    Event::now(EventKind::SpawnRejected)
                        .with_task(name)
                        .with_reason("task_already_exists"),
                );
                return;
            }
        }

        let token = self.runtime_token.child_token();
        let join = tokio::spawn(run_task(
            request.task,
            token.clone(),
            self.bus.clone(),
        ));

        let handle = Handle {
            join,
            cancel: token,
        };

        let mut tasks = self.tasks.write().await;
        if tasks.insert(name.clone(), handle).is_none() {
            drop(tasks);
            self.bus.publish(
                Event::now(EventKind::TaskSpawned)
                    .with_task(name)
                    .with_priority(request.priority),
            );
        } else {
            drop(tasks);
            self.bus.publish(
                Event::now(EventKind::SpawnRejected)
                    .with_task(name)
                    .with_reason("task_already_exists_race"),
            );
        }
    }

    /// Joins and removes a finished task (called on TaskRetired).
    async fn cleanup_task(&self, name: &str) {
        let handle = {
            let mut tasks = self.tasks.write().await;
            tasks.remove(name)
        };
        if let Some(handle) = handle {
            let _ = handle.join.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{Priority, TaskFn, TaskRef};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn request(name: &'static str) -> Event {
        let task: TaskRef = TaskFn::arc(name, |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(crate::error::TaskError::Canceled)
        });
        Event::now(EventKind::TaskSpawnRequested)
            .with_task(name)
            .with_priority(Priority(1))
            .with_request(SpawnRequest {
                task,
                priority: Priority(1),
            })
    }

    #[tokio::test]
    async fn spawn_requests_register_tasks() {
        let bus = Bus::new(64);
        let token = CancellationToken::new();
        let registry = Registry::new(bus.clone(), token.clone());
        registry.spawn_listener();

        assert!(registry.list().await.is_empty());
        bus.publish(request("task-a"));
        bus.publish(request("task-b"));

        sleep(Duration::from_millis(50)).await;
        assert_eq!(
            registry.list().await,
            vec!["task-a".to_string(), "task-b".to_string()]
        );

        timeout(Duration::from_millis(500), registry.cancel_all())
            .await
            .expect("cancel_all joins promptly");
        assert!(registry.list().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let bus = Bus::new(64);
        let token = CancellationToken::new();
        let registry = Registry::new(bus.clone(), token.clone());
        registry.spawn_listener();

        let mut rx = bus.subscribe();
        bus.publish(request("task-a"));
        bus.publish(request("task-a"));

        sleep(Duration::from_millis(50)).await;
        assert_eq!(registry.list().await, vec!["task-a".to_string()]);

        let mut rejected = false;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::SpawnRejected {
                rejected = true;
            }
        }
        assert!(rejected, "duplicate spawn must be reported");

        registry.cancel_all().await;
    }

    #[tokio::test]
    async fn finished_tasks_are_reclaimed() {
        let bus = Bus::new(64);
        let token = CancellationToken::new();
        let registry = Registry::new(bus.clone(), token.clone());
        registry.spawn_listener();

        let oneshot: TaskRef =
            TaskFn::arc("oneshot", |_ctx: CancellationToken| async { Ok(()) });
        bus.publish(
            Event::now(EventKind::TaskSpawnRequested)
                .with_task("oneshot")
                .with_request(SpawnRequest {
                    task: oneshot,
                    priority: Priority::LOWEST,
                }),
        );

        sleep(Duration::from_millis(80)).await;
        assert!(
            registry.list().await.is_empty(),
            "retired one-shot task must leave the registry"
        );
    }
}
