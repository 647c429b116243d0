//! # Task abstractions and the two gated task kinds.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for implementing async cancelable tasks
//! - [`TaskFn`] - function-backed task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`Priority`] - scheduling priority metadata carried on spawn requests
//! - [`Worker`], [`WorkerSpec`] - a named unit of repeating work gated
//!   behind a release gate
//! - [`InitSequencer`] - the one-shot initialization task that performs the
//!   gate release

mod init;
mod task;
mod task_fn;
mod worker;

pub use init::InitSequencer;
pub(crate) use init::INIT_TASK_NAME;
pub use task::{Priority, Task, TaskRef};
pub use task_fn::TaskFn;
pub use worker::{Worker, WorkerSpec};
