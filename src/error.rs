//! Error types used by the taskgate runtime, gates and tasks.
//!
//! This module defines three error enums:
//!
//! - [`GateError`] — contract violations on a release gate (misconfiguration,
//!   double release, out-of-range waiters).
//! - [`TaskError`] — errors raised by individual task executions.
//! - [`RuntimeError`] — errors raised by the supervisor runtime itself.
//!
//! All gate and composition errors are structural/startup-time: there is no
//! legitimate recovery path at runtime, so the supervisor halts startup with a
//! diagnostic instead of proceeding into an under-provisioned gate.

use std::time::Duration;
use thiserror::Error;

use crate::gates::WaiterId;

/// # Errors produced by release gates.
///
/// These represent violations of the gate contract: misconfiguration detected
/// at construction, or a caller breaking the one-shot release discipline.
/// None of them are retryable; they are rejected fail-fast.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Gate constructed with zero waiters.
    #[error("gate requires at least one waiter")]
    Empty,

    /// Requested waiter count does not fit the bitmask width.
    #[error("waiter count {requested} exceeds bitmask width {width}")]
    WidthExceeded {
        /// The requested waiter count.
        requested: usize,
        /// The available mask width in bits.
        width: u32,
    },

    /// Waiter identity outside the gate's registered capacity.
    #[error("waiter {waiter} outside gate capacity {capacity}")]
    UnknownWaiter {
        /// The offending waiter.
        waiter: WaiterId,
        /// The gate's registered waiter count.
        capacity: usize,
    },

    /// The one-shot release was performed more than once.
    #[error("gate already opened")]
    AlreadyOpen,

    /// A per-waiter release would exceed the gate's capacity.
    #[error("release overdraws gate capacity {capacity}")]
    Overdrawn {
        /// The gate's registered waiter count.
        capacity: usize,
    },

    /// A per-waiter release was repeated for the same waiter.
    #[error("waiter {waiter} already released")]
    AlreadyReleased {
        /// The waiter whose release was repeated.
        waiter: WaiterId,
    },

    /// The gate's underlying primitive was torn down while a waiter was
    /// still blocked on it.
    #[error("gate closed while waiting")]
    Closed,
}

impl GateError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskgate::GateError;
    ///
    /// assert_eq!(GateError::AlreadyOpen.as_label(), "gate_already_open");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            GateError::Empty => "gate_empty",
            GateError::WidthExceeded { .. } => "gate_width_exceeded",
            GateError::UnknownWaiter { .. } => "gate_unknown_waiter",
            GateError::AlreadyOpen => "gate_already_open",
            GateError::Overdrawn { .. } => "gate_overdrawn",
            GateError::AlreadyReleased { .. } => "gate_already_released",
            GateError::Closed => "gate_closed",
        }
    }
}

/// # Errors produced by task execution.
///
/// Workers never reach an error state once released (their loop has no
/// failure exit); these surface init-workload failures, cancellation, and
/// gate contract violations hit from inside a task.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable error: the task must not run again.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Task was cancelled due to runtime shutdown.
    #[error("context cancelled")]
    Canceled,

    /// A gate operation failed inside the task.
    #[error(transparent)]
    Gate(#[from] GateError),
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Canceled => "task_canceled",
            TaskError::Gate(e) => e.as_label(),
        }
    }
}

/// # Errors produced by the taskgate runtime.
///
/// All variants are startup or shutdown failures; there is no steady-state
/// error surface once the system is correctly wired.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The worker set handed to the supervisor is inconsistent
    /// (duplicate labels, out-of-range waiter ids, reserved names).
    #[error("invalid composition: {reason}")]
    Composition {
        /// Human-readable description of the inconsistency.
        reason: String,
    },

    /// Gate construction failed for the requested strategy.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Shutdown grace period was exceeded; some tasks remained stuck.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// List of task names that did not shut down in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskgate::RuntimeError;
    ///
    /// let err = RuntimeError::Composition { reason: "duplicate label".into() };
    /// assert_eq!(err.as_label(), "runtime_composition");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Composition { .. } => "runtime_composition",
            RuntimeError::Gate(e) => e.as_label(),
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}
