//! # Demo: bitmask
//!
//! Initialization gating with the bitmask strategy: each worker owns a
//! private bit and the sequencer sets all three in one atomic step. Every
//! worker's resume carries the full released mask it observed.
//!
//! ## Flow
//! ```text
//! Supervisor::run(Bitmask, [a, b, c])
//!   ├─► BitmaskGate(bits 0b111, all clear)
//!   ├─► init: countdown t-5 … t-1 → open() → mask 0b111 in one step
//!   └─► workers: wait() consumes own bit → [resumed] ... mask=0b111
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example bitmask --features logging
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
        WorkerSpec::new("task-b", WaiterId::new(1), Duration::from_millis(7000), Priority(3)),
        WorkerSpec::new("task-c", WaiterId::new(2), Duration::from_millis(2000), Priority(4)),
    ];

    match sup.run(GateStrategy::Bitmask, workers).await {
        Ok(()) => println!("runtime stopped gracefully"),
        Err(e) => println!("runtime stopped with error: {e}"),
    }
    Ok(())
}
