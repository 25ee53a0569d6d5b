//! Randomized invariant checks for P1–P5 and L1–L5, written by hand
//! against plain `#[test]` (no `proptest`/`quickcheck`, matching the
//! donor), plus a heavier multi-thread soak than `scenarios.rs`'s S6.

use std::collections::HashSet;

use blockpool::{Pool, PoolConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn assert_descriptor_invariants(pool: &Pool) {
    let stride = pool.block_stride();
    let free = pool.free_list_snapshot();

    // P1: every reachable descriptor's size is a positive multiple of B.
    for &(_, size) in &free {
        assert!(size > 0 && size % stride == 0, "P1 violated: size {size}");
    }

    // P4: the free list is in strictly ascending span-base order.
    assert!(
        free.windows(2).all(|w| w[0].0 < w[1].0),
        "P4 violated: free list not ascending"
    );

    // P2: byte ranges of free descriptors are pairwise disjoint.
    for i in 0..free.len() {
        for j in (i + 1)..free.len() {
            let (base_a, size_a) = free[i];
            let (base_b, size_b) = free[j];
            let disjoint = base_a + size_a <= base_b || base_b + size_b <= base_a;
            assert!(disjoint, "P2 violated between free descriptors {i} and {j}");
        }
    }

    // P3: the free list alone can never cover more bytes than the arena.
    let free_bytes: u32 = free.iter().map(|&(_, size)| size).sum();
    assert!(free_bytes <= pool.block_count() * stride);
}

fn stride_multiple(rng: &mut StdRng, stride: u32) -> u32 {
    let k = rng.gen_range(1..=4);
    stride * k - rng.gen_range(0..stride.min(32))
}

#[test]
fn property_random_allocate_release_sequences_preserve_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    let pool = Pool::init(PoolConfig::new(1024 * 64, 64)).unwrap();
    let mut live: Vec<std::ptr::NonNull<u8>> = Vec::new();

    for _ in 0..20_000 {
        if live.is_empty() || rng.gen_bool(0.6) {
            let size = stride_multiple(&mut rng, pool.block_stride());
            if let Some(ptr) = pool.allocate(size) {
                live.push(ptr);
            }
        } else {
            let idx = rng.gen_range(0..live.len());
            let ptr = live.swap_remove(idx);
            pool.release(ptr.as_ptr());
        }
        assert_descriptor_invariants(&pool);
    }

    for ptr in live {
        pool.release(ptr.as_ptr());
    }
    assert_descriptor_invariants(&pool);
    assert_eq!(pool.free_count(), pool.block_count() as usize);
}

#[test]
fn l1_round_trip_without_coalescing_restores_initial_free_list() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    let before = pool.free_list_snapshot();

    let mut ptrs = Vec::new();
    for _ in 0..16 {
        ptrs.push(pool.allocate(64).unwrap());
    }
    for ptr in ptrs {
        pool.release(ptr.as_ptr());
    }

    assert_eq!(pool.free_list_snapshot(), before);
}

#[test]
fn p5_allocated_count_tracks_outstanding_allocations() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    let mut ptrs = Vec::new();
    for i in 0..10 {
        ptrs.push(pool.allocate(64).unwrap());
        assert_eq!(pool.allocated_count(), i + 1);
    }
    for (i, ptr) in ptrs.into_iter().enumerate() {
        pool.release(ptr.as_ptr());
        assert_eq!(pool.allocated_count(), 10 - i - 1);
    }
}

#[test]
fn concurrent_soak_leaves_no_duplicate_pointers_live() {
    use std::sync::{Arc, Mutex};
    use std::thread;

    let pool = Arc::new(Pool::init(PoolConfig::new(1024 * 1024, 48)).unwrap());
    let seen = Arc::new(Mutex::new(HashSet::new()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                for _ in 0..4_000 {
                    if let Some(ptr) = pool.allocate(48) {
                        {
                            let mut seen = seen.lock().unwrap();
                            // P5: a pointer must not be live twice at once.
                            assert!(seen.insert(ptr.as_ptr() as usize));
                        }
                        pool.release(ptr.as_ptr());
                        seen.lock().unwrap().remove(&(ptr.as_ptr() as usize));
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(pool.allocated_count(), 0);
    assert_eq!(pool.free_count(), pool.block_count() as usize);
}
