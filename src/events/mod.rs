//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the supervisor, registry,
//! gates, tasks and subscriber workers. The bus is the crate's only logging
//! side channel: everything user-visible (countdown progress, waiter state
//! changes, worker beats) travels through it, and nothing in the core depends
//! on its content for correctness.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor`, `Registry`, `InitSequencer`, `Worker`,
//!   `SpawnGate`, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the supervisor's subscriber listener (fans out to
//!   `SubscriberSet`) and the `Registry` (its own listener).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

pub(crate) use event::SpawnRequest;
