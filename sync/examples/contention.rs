//! readers and writers contending on one lock
//!
//! run with: RUST_LOG=trace cargo run --release --example contention

use shex_sync::SharedExclusive;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

const READERS: usize = 8;
const WRITERS: usize = 2;
const READS_PER_THREAD: usize = 100_000;
const WRITES_PER_THREAD: usize = 1_000;

// readers sum the table; writers bump every slot so the sum always divides evenly
fn main() {
    env_logger::init();

    let table = Arc::new(SharedExclusive::new([0u64; 16]));
    let start = Instant::now();

    let writers: Vec<_> = (0..WRITERS)
        .map(|_| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                for _ in 0..WRITES_PER_THREAD {
                    let mut slots = table.write();
                    for slot in slots.iter_mut() {
                        *slot += 1;
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let mut torn = 0usize;
                for _ in 0..READS_PER_THREAD {
                    let slots = table.read();
                    let first = slots[0];
                    if slots.iter().any(|&slot| slot != first) {
                        torn += 1;
                    }
                }
                torn
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }
    let torn: usize = readers.into_iter().map(|r| r.join().unwrap()).sum();
    let elapsed = start.elapsed();

    println!("shared/exclusive contention");
    println!("===========================");
    println!("readers:  {} x {} reads", READERS, READS_PER_THREAD);
    println!("writers:  {} x {} writes", WRITERS, WRITES_PER_THREAD);
    println!("final:    {}", table.read()[0]);
    println!("torn:     {} ({})", torn, if torn == 0 { "OK" } else { "BROKEN" });
    println!(
        "elapsed:  {} ms ({:.2} ns/op)",
        elapsed.as_millis(),
        elapsed.as_nanos() as f64 / (READERS * READS_PER_THREAD + WRITERS * WRITES_PER_THREAD) as f64
    );
}
