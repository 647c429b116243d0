//! # Bitmask release gate.
//!
//! [`BitmaskGate`] gives every waiter its *own independently addressable*
//! release bit, and can satisfy all of them simultaneously in a single
//! atomic step. Use it when all-at-once semantics with distinguishable
//! waiters matters (e.g. telling which subset is still pending).
//!
//! ## Shape
//! ```text
//!                 pending mask (watch channel)
//! open() ── set full mask ──►  0b0111  ◄── wait(w1): block on bit 1,
//! release(w) ── set one bit ──►                      then clear bit 1
//!
//!                 released mask (sticky, atomic)
//!                 grows monotonically; what resumed waiters observe
//! ```
//!
//! ## Rules
//! - A pending bit set by a release is consumed (cleared) by its waiter
//!   exactly once; no other waiter touches it.
//! - The sticky released mask never loses bits, so a waiter that resumes
//!   after a full `open()` observes the complete mask even if sibling
//!   waiters already consumed their pending bits.
//! - Waiters wait at most once by design; a second `wait` for a consumed
//!   bit would block forever.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::GateError;
use crate::gates::{GateStrategy, Release, ReleaseGate, WaiterId};

/// Width of the release mask in bits.
const MASK_WIDTH: u32 = u32::BITS;

/// Per-waiter-bit startup gate over a [`tokio::sync::watch`] channel.
#[derive(Debug)]
pub struct BitmaskGate {
    capacity: usize,
    /// All registered waiters' bits set.
    full: u32,
    /// Bits released but not yet consumed by their waiters.
    pending: watch::Sender<u32>,
    /// Bits ever released; monotonic.
    released: AtomicU32,
}

impl BitmaskGate {
    /// Creates a gate for `capacity` waiters, all bits clear.
    ///
    /// Fails with [`GateError::WidthExceeded`] when the waiter count does
    /// not fit the mask width.
    pub fn new(capacity: usize) -> Result<Self, GateError> {
        if capacity == 0 {
            return Err(GateError::Empty);
        }
        if capacity > MASK_WIDTH as usize {
            return Err(GateError::WidthExceeded {
                requested: capacity,
                width: MASK_WIDTH,
            });
        }
        let full = if capacity == MASK_WIDTH as usize {
            u32::MAX
        } else {
            (1u32 << capacity) - 1
        };
        let (pending, _) = watch::channel(0u32);
        Ok(Self {
            capacity,
            full,
            pending,
            released: AtomicU32::new(0),
        })
    }

    /// Releases a single waiter by setting its private bit.
    ///
    /// Fails with [`GateError::AlreadyReleased`] when the bit was already
    /// released once, even if its waiter has consumed it since.
    pub fn release(&self, waiter: WaiterId) -> Result<(), GateError> {
        self.check(waiter)?;
        let bit = waiter.bit();
        let prev = self.released.fetch_or(bit, Ordering::AcqRel);
        if prev & bit != 0 {
            return Err(GateError::AlreadyReleased { waiter });
        }
        self.pending.send_modify(|b| *b |= bit);
        Ok(())
    }

    /// Blocks until this waiter's bit is released, consumes the bit, and
    /// returns the released mask observed at resume time.
    ///
    /// After a full [`open`](ReleaseGate::open) every waiter observes the
    /// complete mask, regardless of how its resume interleaves with sibling
    /// consumption.
    pub async fn wait_bits(&self, waiter: WaiterId) -> Result<u32, GateError> {
        self.check(waiter)?;
        let bit = waiter.bit();

        let mut rx = self.pending.subscribe();
        let _pending = *rx
            .wait_for(|b| b & bit != 0)
            .await
            .map_err(|_| GateError::Closed)?;

        let observed = self.released.load(Ordering::Acquire);
        self.pending.send_modify(|b| *b &= !bit);
        Ok(observed)
    }

    /// Returns the bits released but not yet consumed.
    pub fn pending(&self) -> u32 {
        *self.pending.borrow()
    }

    /// Returns the full mask covering every registered waiter.
    pub fn full_mask(&self) -> u32 {
        self.full
    }

    fn check(&self, waiter: WaiterId) -> Result<(), GateError> {
        if waiter.index() >= self.capacity {
            return Err(GateError::UnknownWaiter {
                waiter,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ReleaseGate for BitmaskGate {
    fn strategy(&self) -> GateStrategy {
        GateStrategy::Bitmask
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    async fn wait(&self, waiter: WaiterId) -> Result<Release, GateError> {
        let mask = self.wait_bits(waiter).await?;
        Ok(Release { mask: Some(mask) })
    }

    /// Sets the full mask in one atomic step: every waiter's condition
    /// becomes true simultaneously.
    fn open(&self) -> Result<(), GateError> {
        self.released
            .compare_exchange(0, self.full, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GateError::AlreadyOpen)?;
        self.pending.send_modify(|b| *b |= self.full);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.released.load(Ordering::Acquire) == self.full
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
    fn width_is_enforced_at_construction() {
        assert_eq!(BitmaskGate::new(0).unwrap_err(), GateError::Empty);
        assert!(BitmaskGate::new(32).is_ok());
        assert_eq!(
            BitmaskGate::new(33).unwrap_err(),
            GateError::WidthExceeded {
                requested: 33,
                width: 32
            }
        );
    }

    #[tokio::test]
    async fn waiter_blocks_until_its_own_bit() {
        let gate = BitmaskGate::new(2).unwrap();

        // Releasing waiter 1 must not unblock waiter 0.
        gate.release(WaiterId::new(1)).unwrap();
        let blocked = timeout(SHORT, gate.wait_bits(WaiterId::new(0))).await;
        assert!(blocked.is_err());

        gate.release(WaiterId::new(0)).unwrap();
        let observed = timeout(LONG, gate.wait_bits(WaiterId::new(0)))
            .await
            .expect("released waiter must resume")
            .unwrap();
        assert_eq!(observed & WaiterId::new(0).bit(), WaiterId::new(0).bit());
    }

    #[tokio::test]
    async fn open_releases_every_waiter_with_the_full_mask() {
        let gate = Arc::new(BitmaskGate::new(3).unwrap());

        // One waiter parks before the release...
        let early = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait_bits(WaiterId::new(0)).await })
        };
        tokio::time::sleep(SHORT).await;

        gate.open().unwrap();
        assert!(gate.is_open());

        // ...and the others ask afterwards; all observe the exact full mask.
        let observed_early = timeout(LONG, early)
            .await
            .expect("early waiter resumes")
            .expect("join")
            .unwrap();
        assert_eq!(observed_early, 0b111);

        for i in 1..3 {
            let observed = timeout(LONG, gate.wait_bits(WaiterId::new(i)))
                .await
                .expect("late waiter resumes")
                .unwrap();
            assert_eq!(observed, 0b111, "no waiter may observe a partial mask");
        }

        // Every pending bit was consumed exactly once.
        assert_eq!(gate.pending(), 0);
        assert!(gate.is_open(), "consumption must not un-open the gate");
    }

    #[tokio::test]
    async fn consuming_clears_only_the_waiters_bit() {
        let gate = BitmaskGate::new(2).unwrap();
        gate.open().unwrap();

        let _ = gate.wait_bits(WaiterId::new(0)).await.unwrap();
        assert_eq!(gate.pending(), WaiterId::new(1).bit());
    }

    #[tokio::test]
    async fn double_release_of_one_bit_is_rejected() {
        let gate = BitmaskGate::new(2).unwrap();
        gate.release(WaiterId::new(0)).unwrap();

        // Rejected while pending...
        assert_eq!(
            gate.release(WaiterId::new(0)).unwrap_err(),
            GateError::AlreadyReleased {
                waiter: WaiterId::new(0)
            }
        );

        // ...and still rejected after the waiter consumed the bit.
        let _ = gate.wait_bits(WaiterId::new(0)).await.unwrap();
        assert_eq!(
            gate.release(WaiterId::new(0)).unwrap_err(),
            GateError::AlreadyReleased {
                waiter: WaiterId::new(0)
            }
        );
    }

    #[tokio::test]
    async fn double_open_is_rejected() {
        let gate = BitmaskGate::new(2).unwrap();
        gate.open().unwrap();
        assert_eq!(gate.open().unwrap_err(), GateError::AlreadyOpen);
    }

    #[tokio::test]
    async fn open_after_partial_release_is_rejected() {
        let gate = BitmaskGate::new(2).unwrap();
        gate.release(WaiterId::new(1)).unwrap();
        assert_eq!(gate.open().unwrap_err(), GateError::AlreadyOpen);
    }

    #[tokio::test]
    async fn unknown_waiter_is_rejected() {
        let gate = BitmaskGate::new(2).unwrap();
        assert_eq!(
            gate.release(WaiterId::new(2)).unwrap_err(),
            GateError::UnknownWaiter {
                waiter: WaiterId::new(2),
                capacity: 2
            }
        );
    }
}
