//! # Counting release gate.
//!
//! [`CountingGate`] models "N equivalent permits, handed out to whichever
//! waiters ask first among those ready to ask". Waiters are interchangeable;
//! the only guarantee is that exactly k grants unlock at most k waiters.
//!
//! ## Shape
//! ```text
//! open()  ──► add capacity permits ──► Semaphore(0) ◄── wait(): acquire + forget
//! grant() ──► add one permit       ──►
//! ```
//!
//! ## Rules
//! - The permit count never goes negative and never exceeds the registered
//!   capacity: total grants are capped, acquires consume.
//! - `wait` consumes its permit (`forget`), so a released waiter can never
//!   "return" the release.
//! - `open` is the sequencer's one-shot path; `grant` is the per-waiter
//!   release for callers that hand permits out one at a time.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::GateError;
use crate::gates::{GateStrategy, Release, ReleaseGate, WaiterId};

/// Counting-permit startup gate over a [`tokio::sync::Semaphore`].
#[derive(Debug)]
pub struct CountingGate {
    capacity: usize,
    permits: Semaphore,
    /// Total permits ever granted; monotonic, capped at `capacity`.
    granted: AtomicUsize,
}

impl CountingGate {
    /// Creates a gate for `capacity` waiters with zero initial permits.
    pub fn new(capacity: usize) -> Result<Self, GateError> {
        if capacity == 0 {
            return Err(GateError::Empty);
        }
        Ok(Self {
            capacity,
            permits: Semaphore::new(0),
            granted: AtomicUsize::new(0),
        })
    }

    /// Releases a single permit, unblocking at most one waiter.
    ///
    /// Fails with [`GateError::Overdrawn`] once `capacity` grants have been
    /// performed: handing out more permits than waiters is a caller bug.
    pub fn grant(&self) -> Result<(), GateError> {
        self.granted
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |g| {
                if g >= self.capacity {
                    None
                } else {
                    Some(g + 1)
                }
            })
            .map_err(|_| GateError::Overdrawn {
                capacity: self.capacity,
            })?;
        self.permits.add_permits(1);
        Ok(())
    }

    /// Returns the number of granted permits not yet consumed by a waiter.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl ReleaseGate for CountingGate {
    fn strategy(&self) -> GateStrategy {
        GateStrategy::Counting
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    /// Waiter identity is validated but not used for gating: permits are
    /// interchangeable.
    async fn wait(&self, waiter: WaiterId) -> Result<Release, GateError> {
        if waiter.index() >= self.capacity {
            return Err(GateError::UnknownWaiter {
                waiter,
                capacity: self.capacity,
            });
        }
        match self.permits.acquire().await {
            Ok(permit) => {
                permit.forget();
                Ok(Release { mask: None })
            }
            Err(_closed) => Err(GateError::Closed),
        }
    }

    fn open(&self) -> Result<(), GateError> {
        self.granted
            .compare_exchange(0, self.capacity, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GateError::AlreadyOpen)?;
        self.permits.add_permits(self.capacity);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.granted.load(Ordering::Acquire) >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const SHORT: Duration = Duration::from_millis(30);
    const LONG: Duration = Duration::from_millis(500);

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(CountingGate::new(0).unwrap_err(), GateError::Empty);
    }

    #[tokio::test]
    async fn waiter_blocks_until_granted() {
        let gate = CountingGate::new(1).unwrap();

        let premature = timeout(SHORT, gate.wait(WaiterId::new(0))).await;
        assert!(premature.is_err(), "wait must not return before release");

        gate.grant().unwrap();
        timeout(LONG, gate.wait(WaiterId::new(0)))
            .await
            .expect("released waiter must resume")
            .unwrap();
    }

    #[tokio::test]
    async fn k_grants_unlock_at_most_k_waiters() {
        let gate = Arc::new(CountingGate::new(3).unwrap());

        gate.grant().unwrap();
        gate.grant().unwrap();

        for i in 0..2 {
            timeout(LONG, gate.wait(WaiterId::new(i)))
                .await
                .expect("granted waiter must resume")
                .unwrap();
        }

        // The third waiter stays blocked on two grants.
        let blocked = timeout(SHORT, gate.wait(WaiterId::new(2))).await;
        assert!(blocked.is_err());

        gate.grant().unwrap();
        timeout(LONG, gate.wait(WaiterId::new(2)))
            .await
            .expect("third grant unlocks third waiter")
            .unwrap();
    }

    #[tokio::test]
    async fn grants_beyond_capacity_are_rejected() {
        let gate = CountingGate::new(2).unwrap();
        gate.grant().unwrap();
        gate.grant().unwrap();
        assert_eq!(
            gate.grant().unwrap_err(),
            GateError::Overdrawn { capacity: 2 }
        );
    }

    #[tokio::test]
    async fn open_releases_every_waiter_once() {
        let gate = Arc::new(CountingGate::new(3).unwrap());
        assert!(!gate.is_open());

        gate.open().unwrap();
        assert!(gate.is_open());
        assert_eq!(gate.available(), 3);

        for i in 0..3 {
            timeout(LONG, gate.wait(WaiterId::new(i)))
                .await
                .expect("opened gate releases all waiters")
                .unwrap();
        }
        assert_eq!(gate.available(), 0);

        // Monotonic: consuming permits does not close the gate again.
        assert!(gate.is_open());
    }

    #[tokio::test]
    async fn double_open_is_rejected() {
        let gate = CountingGate::new(2).unwrap();
        gate.open().unwrap();
        assert_eq!(gate.open().unwrap_err(), GateError::AlreadyOpen);
    }

    #[tokio::test]
    async fn open_after_partial_grants_is_rejected() {
        let gate = CountingGate::new(2).unwrap();
        gate.grant().unwrap();
        assert_eq!(gate.open().unwrap_err(), GateError::AlreadyOpen);
    }

    #[tokio::test]
    async fn unknown_waiter_is_rejected() {
        let gate = CountingGate::new(1).unwrap();
        let err = gate.wait(WaiterId::new(5)).await.unwrap_err();
        assert_eq!(
            err,
            GateError::UnknownWaiter {
                waiter: WaiterId::new(5),
                capacity: 1
            }
        );
    }
}
