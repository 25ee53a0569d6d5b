//! `harness = false`: times the coalescing path in isolation, including
//! the linear free-list scan cost the design notes call out as the
//! tradeoff for fast-path simplicity.

use std::time::Instant;

use blockpool::{Pool, PoolConfig};

const ITERATIONS: u32 = 100_000;

fn main() {
    let pool = Pool::init(PoolConfig::new(4 * 1024 * 1024, 32)).expect("pool configuration should be valid");

    let start = Instant::now();
    for _ in 0..ITERATIONS {
        let ptr = pool
            .allocate(96)
            .expect("pool should not exhaust under steady-state reuse");
        pool.release(ptr.as_ptr());
    }
    let elapsed = start.elapsed();

    println!(
        "coalescing: {ITERATIONS} allocate/release pairs (3-block spans) in {elapsed:?} ({:.0}/sec), {} coalesces",
        ITERATIONS as f64 / elapsed.as_secs_f64(),
        pool.coalesce_count()
    );
}
