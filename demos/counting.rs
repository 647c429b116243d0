//! # Demo: counting
//!
//! Initialization gating with the counting strategy: the sequencer releases
//! three permits after a 5-second countdown; each worker unblocks by taking
//! one.
//!
//! Workers park in registration order (A, B, C) and resume in whatever
//! order the runtime picks among the simultaneously released tasks.
//!
//! ## Flow
//! ```text
//! Supervisor::run(Counting, [a, b, c])
//!   ├─► CountingGate(3 permits, all withheld)
//!   ├─► init: countdown t-5 … t-1 → open() → +3 permits → retire
//!   └─► workers: wait() → beat every 2.5s / 3s / 5s
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example counting --features logging
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

    // Lowest-interval worker first; priorities increase A < B < C.
    let workers = vec![
        WorkerSpec::new("task-a", WaiterId::new(0), Duration::from_millis(2500), Priority(2)),
        WorkerSpec::new("task-b", WaiterId::new(1), Duration::from_millis(3000), Priority(3)),
        WorkerSpec::new("task-c", WaiterId::new(2), Duration::from_millis(5000), Priority(4)),
    ];

    match sup.run(GateStrategy::Counting, workers).await {
        Ok(()) => println!("runtime stopped gracefully"),
        Err(e) => println!("runtime stopped with error: {e}"),
    }
    Ok(())
}
