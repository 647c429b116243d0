//! # Demo: spawn
//!
//! Initialization gating by deferred task creation: no worker task exists
//! until the sequencer finishes its countdown; "release" is the creation of
//! the workers themselves.
//!
//! ## Flow
//! ```text
//! Supervisor::run(Spawn, [a, b, c])
//!   ├─► SpawnGate holds the three worker specs
//!   ├─► init: countdown t-5 … t-1 → open() → 3 spawn requests → retire
//!   └─► registry creates the workers; their wait() is already satisfied
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example spawn --features logging
//! ```
//! Stop with Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use taskgate::{
    Config, GateStrategy, LogWriter, Priority, Subscribe, Supervisor, WaiterId, WorkerSpec,
};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let mut cfg = Config::default();
    cfg.grace = Duration::from_secs(5);
    cfg.init_priority = Priority(1);

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let sup = Supervisor::builder(cfg).with_subscribers(subs).build();

    let workers = vec![
        WorkerSpec::new("task-a", WaiterId::new(0), Duration::from_millis(3000), Priority(2)),
        WorkerSpec::new("task-b", WaiterId::new(1), Duration::from_millis(2000), Priority(3)),
        WorkerSpec::new("task-c", WaiterId::new(2), Duration::from_millis(3000), Priority(4)),
    ];

    match sup.run(GateStrategy::Spawn, workers).await {
        Ok(()) => println!("runtime stopped gracefully"),
        Err(e) => println!("runtime stopped with error: {e}"),
    }
    Ok(())
}
