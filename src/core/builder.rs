//! # Supervisor builder.
//!
//! Wires the runtime pieces together: event bus, subscriber fan-out, state
//! tracker and registry. Must be called within a tokio runtime, since the
//! registry and subscriber listeners are spawned at build time (their bus
//! receivers are created synchronously, so nothing published afterwards is
//! lost).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::registry::Registry;
use crate::core::supervisor::Supervisor;
use crate::events::Bus;
use crate::subscribers::{StateTracker, Subscribe, SubscriberSet};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (init progress, waiter state
    /// changes, worker beats) through dedicated workers with bounded queues.
    /// The supervisor's [`StateTracker`] is always included.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the supervisor instance.
    ///
    /// This consumes the builder and initializes all runtime components:
    /// - Event bus for broadcasting
    /// - Registry for task lifecycle management
    /// - Subscriber workers (user subscribers + the state tracker)
    pub fn build(self) -> Arc<Supervisor> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let runtime_token = CancellationToken::new();

        let tracker = Arc::new(StateTracker::new());
        let mut subscribers = self.subscribers;
        subscribers.push(Arc::clone(&tracker) as Arc<dyn Subscribe>);
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));

        let registry = Registry::new(bus.clone(), runtime_token.clone());
        registry.spawn_listener();

        let sup = Arc::new(Supervisor::new_internal(
            self.cfg,
            bus,
            subs,
            tracker,
            registry,
            runtime_token,
        ));
        sup.spawn_subscriber_listener();
        sup
    }
}
