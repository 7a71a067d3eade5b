//! Two accounts, concurrent transfers, and what each transaction observed.
//!
//! Run with `RUST_LOG=maat_row=debug cargo run --example transfer` to see the
//! commit and abort fan-out.

use maat_row::{EngineConfig, LatchOp, MaatEngine, MaatError};
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

fn balance(bytes: &[u8]) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    i64::from_le_bytes(raw)
}

fn main() -> Result<(), MaatError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = Arc::new(MaatEngine::with_config(
        EngineConfig::default().with_latch_stats(true),
    )?);
    engine.table().get_or_insert(1, 100i64.to_le_bytes().to_vec());
    engine.table().get_or_insert(2, 0i64.to_le_bytes().to_vec());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let engine = engine.clone();
            thread::spawn(move || -> Result<(), MaatError> {
                let from = engine.table().get(1).expect("account 1");
                let to = engine.table().get(2).expect("account 2");

                let mut txn = engine.begin();
                let a = balance(&txn.read(&from)?);
                let b = balance(&txn.read(&to)?);
                txn.write(&from, (a - 10).to_le_bytes().to_vec())?;
                txn.write(&to, (b + 10).to_le_bytes().to_vec())?;

                // Stand-in policy: give up on any overlap with another transaction.
                let obs = txn.observations();
                let overlapping = obs.writers_on_read().len()
                    + obs.writers_on_prewrite().len()
                    + obs.readers().len();
                if overlapping > 0 {
                    println!("worker {worker}: saw {overlapping} concurrent accesses, aborting");
                    return txn.abort();
                }
                let ts = engine.commit(&mut txn)?;
                println!("worker {worker}: committed at {ts}");
                Ok(())
            })
        })
        .collect();

    for h in handles {
        h.join().expect("worker panicked")?;
    }

    let a = balance(&engine.table().get(1).expect("account 1").data());
    let b = balance(&engine.table().get(2).expect("account 2").data());
    println!("balances: {a} + {b} = {}", a + b);

    if let Some(stats) = engine.latch_stats() {
        for op in [LatchOp::Read, LatchOp::Prewrite, LatchOp::Commit, LatchOp::Abort] {
            let wait = stats.snapshot(op);
            println!(
                "{op:?}: {} acquisitions, {:?} waiting",
                wait.acquisitions, wait.total_wait
            );
        }
    }
    Ok(())
}
