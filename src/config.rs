//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the supervisor runtime and
//! the bundled countdown init workload.
//!
//! Config is consumed once, at supervisor construction:
//! `Supervisor::builder(config)`.

use std::time::Duration;

use crate::tasks::Priority;

/// Global configuration for the supervisor runtime.
///
/// Defines:
/// - **Shutdown behavior**: grace period for graceful termination
/// - **Event system**: bus capacity for event delivery
/// - **Init workload**: countdown length and tick pacing
/// - **Scheduling metadata**: the init sequencer's priority
///
/// ## Field semantics
/// - `grace`: maximum wait for tasks to stop gracefully (`0s` = no wait)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `countdown`: number of progress ticks the init workload runs before the
///   gate is released (`0` = release immediately)
/// - `tick`: pause between countdown ticks
/// - `init_priority`: priority metadata attached to the init sequencer's
///   spawn request; conventionally the lowest in the system so that released
///   workers outrank it on priority-aware schedulers
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for graceful shutdown before force-terminating.
    ///
    /// When a shutdown signal is received:
    /// - Tasks are cancelled via `CancellationToken`
    /// - Supervisor waits up to `grace` for tasks to exit
    /// - If the timeout elapses, `RuntimeError::GraceExceeded` is returned
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will receive `Lagged` and skip older items. Minimum value is 1
    /// (enforced by Bus).
    pub bus_capacity: usize,

    /// Number of countdown ticks the init workload performs.
    pub countdown: u32,

    /// Pause between countdown ticks.
    pub tick: Duration,

    /// Priority metadata for the init sequencer's spawn request.
    pub init_priority: Priority,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 30s` (reasonable graceful shutdown window)
    /// - `bus_capacity = 1024` (good baseline)
    /// - `countdown = 5` ticks of `tick = 1s` (the reference init workload)
    /// - `init_priority = Priority::LOWEST`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
            countdown: 5,
            tick: Duration::from_secs(1),
            init_priority: Priority::LOWEST,
        }
    }
}
