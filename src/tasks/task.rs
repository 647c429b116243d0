//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cancelable) and the shared
//! handle type [`TaskRef`], an `Arc<dyn Task>` suitable for sharing across
//! the runtime.
//!
//! A task receives a [`CancellationToken`] and should periodically check it
//! to stop cooperatively during shutdown.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Scheduling priority metadata.
///
/// Carried on every spawn request and surfaced in events and logs. Higher
/// values mean higher priority. The bundled tokio backend is
/// priority-agnostic: among simultaneously runnable tasks the runtime, not
/// this crate, decides which runs next; the metadata is preserved for
/// schedulers that honor it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u8);

impl Priority {
    /// The lowest priority; conventionally assigned to the init sequencer.
    pub const LOWEST: Priority = Priority(0);
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// # Asynchronous, cancelable unit.
///
/// A `Task` has a stable [`name`](Task::name) and an async
/// [`run`](Task::run) method that receives a [`CancellationToken`].
/// Implementors should regularly check cancellation and exit promptly during
/// shutdown.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use taskgate::{Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` and exit quickly to
    /// honor graceful shutdown.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}

/// Shared reference to a task.
pub type TaskRef = Arc<dyn Task>;
