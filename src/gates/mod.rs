//! Release gates: one-time startup synchronization.
//!
//! This module provides the crate's core abstraction, [`ReleaseGate`] — the
//! unified contract for "block worker logic until one-shot initialization
//! publishes a release signal" — and its three concrete strategies:
//!
//! - [`CountingGate`]: N interchangeable permits handed to whichever waiters
//!   ask (counting-semaphore shape);
//! - [`BitmaskGate`]: one independently addressable bit per waiter, released
//!   all at once in a single atomic step (event-group shape);
//! - [`SpawnGate`]: no blocking state at all — "release" creates the worker
//!   tasks, which did not exist before (deferred-spawn shape).
//!
//! ## Wiring
//! ```text
//! InitSequencer ── open() ──► ReleaseGate ◄── wait(id) ── Worker × N
//!                                  ▲
//!                  Supervisor (constructs, owns, selects strategy)
//! ```
//!
//! ## Rules
//! - A gate decides *whether/when* a waiter's condition is satisfied; which
//!   ready task runs next is the runtime's decision. Gates never order
//!   resumes.
//! - Release is monotonic: once a waiter's condition becomes true it never
//!   reverts ([`ReleaseGate::is_open`] never goes back to `false`).
//! - The one-shot release discipline is enforced fail-fast: a second
//!   `open()` is an error, never silently tolerated.

mod bitmask;
mod counting;
mod gate;
mod spawn;

pub use bitmask::BitmaskGate;
pub use counting::CountingGate;
pub use gate::{GateRef, GateStrategy, Release, ReleaseGate, WaiterId};
pub use spawn::SpawnGate;
