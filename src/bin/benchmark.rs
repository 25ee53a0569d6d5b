//! Plain `Instant`-based throughput comparison between the fast
//! (single-block) allocation path and the coalescing (multi-block) path.

use std::time::Instant;

use blockpool::{Pool, PoolConfig};

const ITERATIONS: u32 = 200_000;

fn bench_fast_path(pool: &Pool) -> f64 {
    let start = Instant::now();
    for _ in 0..ITERATIONS {
        if let Some(ptr) = pool.allocate(32) {
            pool.release(ptr.as_ptr());
        }
    }
    let elapsed = start.elapsed();
    ITERATIONS as f64 / elapsed.as_secs_f64()
}

fn bench_coalescing_path(pool: &Pool) -> f64 {
    let start = Instant::now();
    for _ in 0..ITERATIONS {
        if let Some(ptr) = pool.allocate(96) {
            pool.release(ptr.as_ptr());
        }
    }
    let elapsed = start.elapsed();
    ITERATIONS as f64 / elapsed.as_secs_f64()
}

fn main() {
    env_logger::init();

    let pool = Pool::init(PoolConfig::new(1024 * 1024, 32)).expect("pool configuration should be valid");

    let fast = bench_fast_path(&pool);
    println!("fast path:       {fast:.0} allocations/sec");

    let coalescing = bench_coalescing_path(&pool);
    println!("coalescing path: {coalescing:.0} allocations/sec");

    println!("coalesce_count:  {}", pool.coalesce_count());
}
