//! # Event subscribers for the taskgate runtime.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   tasks/gates ── publish(Event) ──► Bus ──► supervisor listener
//!                                              │
//!                                              ▼
//!                                        SubscriberSet
//!                                   ┌─────────┼─────────┐
//!                                   ▼         ▼         ▼
//!                              StateTracker LogWriter  custom...
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** observe and react to events (logging, metrics).
//! - **Stateful subscribers** maintain internal state based on events
//!   ([`StateTracker`]).

mod set;
mod state;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use state::{StateTracker, WaiterState};
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
