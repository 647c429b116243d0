//! # The release-gate contract.
//!
//! [`ReleaseGate`] is the seam between the one-shot init phase and the
//! worker set: the sequencer calls [`open`](ReleaseGate::open) exactly once
//! after all initialization side effects are complete, and every worker
//! blocks in [`wait`](ReleaseGate::wait) until its release condition holds.
//!
//! ## Contract
//! - `wait` never returns early (no spurious wakeups) and blocks
//!   indefinitely if the gate is never opened — the unbounded-wait policy.
//!   Cancellation is layered on top by the caller (the worker selects
//!   against its cancellation token), not by the gate.
//! - `open` must not block and must be called only after initialization is
//!   complete. Every strategy routes the release through a primitive with
//!   acquire/release semantics, so writes made before `open` are visible
//!   once `wait` returns.
//! - A second `open` fails with [`GateError::AlreadyOpen`]: double release
//!   is a caller bug that is rejected, not absorbed.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GateError;

/// Compact identity of a registered waiter.
///
/// Waiters are numbered `0..capacity` in registration order. For the bitmask
/// strategy, waiter `i` owns bit `1 << i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaiterId(usize);

impl WaiterId {
    /// Creates a waiter identity from its registration index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the registration index.
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns the waiter's private bit in a release mask.
    ///
    /// Meaningful only for indices below the mask width; gates validate the
    /// range at construction and on every call.
    pub const fn bit(self) -> u32 {
        1 << self.0
    }
}

impl fmt::Display for WaiterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Selector for the concrete release strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStrategy {
    /// Counting-permit release ([`CountingGate`](crate::gates::CountingGate)).
    Counting,
    /// Per-waiter bit release ([`BitmaskGate`](crate::gates::BitmaskGate)).
    Bitmask,
    /// Deferred task creation ([`SpawnGate`](crate::gates::SpawnGate)).
    Spawn,
}

impl GateStrategy {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            GateStrategy::Counting => "counting",
            GateStrategy::Bitmask => "bitmask",
            GateStrategy::Spawn => "spawn",
        }
    }
}

/// What a satisfied `wait` observed.
///
/// The bitmask strategy reports the released mask it saw; the other
/// strategies have nothing to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    /// The released mask observed by the waiter (bitmask strategy only).
    pub mask: Option<u32>,
}

/// Shared capability reference to a gate.
///
/// Workers and the sequencer hold this — enough to call `wait`/`open`,
/// never lifecycle control over the gate itself.
pub type GateRef = Arc<dyn ReleaseGate>;

/// One-time startup gate: block until initialization publishes release.
#[async_trait]
pub trait ReleaseGate: Send + Sync + 'static {
    /// Returns the strategy implemented by this gate.
    fn strategy(&self) -> GateStrategy;

    /// Returns the number of registered waiters.
    fn capacity(&self) -> usize;

    /// Suspends the calling task until the release condition for `waiter`
    /// holds.
    ///
    /// Blocks indefinitely if the gate is never opened. Returns
    /// [`GateError::UnknownWaiter`] for an out-of-range identity.
    async fn wait(&self, waiter: WaiterId) -> Result<Release, GateError>;

    /// Performs the one-time release of every registered waiter.
    ///
    /// Non-blocking. A second call returns [`GateError::AlreadyOpen`].
    fn open(&self) -> Result<(), GateError>;

    /// Returns whether the one-time release has been performed.
    ///
    /// Monotonic: once `true`, never `false` again.
    fn is_open(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiter_bits_are_private() {
        assert_eq!(WaiterId::new(0).bit(), 0b001);
        assert_eq!(WaiterId::new(1).bit(), 0b010);
        assert_eq!(WaiterId::new(2).bit(), 0b100);
    }

    #[test]
    fn strategy_labels_are_stable() {
        assert_eq!(GateStrategy::Counting.as_label(), "counting");
        assert_eq!(GateStrategy::Bitmask.as_label(), "bitmask");
        assert_eq!(GateStrategy::Spawn.as_label(), "spawn");
    }
}
