//! The end-to-end scenarios, reproduced literally: each test body below
//! is one scenario, checked against the exact pointer/offset/list-state
//! outcomes it names.

use blockpool::{Pool, PoolConfig};

fn free_list_is_ascending(snapshot: &[(u32, u32)]) -> bool {
    snapshot.windows(2).all(|w| w[0].0 < w[1].0)
}

#[test]
fn s1_fast_path_offsets_and_teardown() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    let p1 = pool.allocate(4).unwrap();
    let p2 = pool.allocate(4).unwrap();
    assert_eq!(p2.as_ptr() as usize - p1.as_ptr() as usize, 64);

    pool.release(p1.as_ptr());
    pool.release(p2.as_ptr());

    let snapshot = pool.free_list_snapshot();
    assert_eq!(snapshot.len(), 16);
    assert_eq!(snapshot.first().unwrap().0, 0);
    assert_eq!(snapshot.last().unwrap().0, 15 * 64);
}

#[test]
fn s2_zero_allocate_then_grow_in_place_then_grow_and_move() {
    let pool = Pool::init(PoolConfig::new(1_048_576, 128)).unwrap();
    let p = pool.zero_allocate(40, 2).unwrap();
    let original: Vec<u8> = unsafe { std::slice::from_raw_parts(p.as_ptr(), 80) }.to_vec();
    assert!(original.iter().all(|&b| b == 0));

    let same = pool.reallocate(p.as_ptr(), 100).unwrap();
    assert_eq!(same, p);

    let moved = pool.reallocate(p.as_ptr(), 200).unwrap();
    assert_ne!(moved, p);
    let moved_bytes = unsafe { std::slice::from_raw_parts(moved.as_ptr(), 80) };
    assert_eq!(moved_bytes, original.as_slice());

    pool.release(moved.as_ptr());
    let snapshot = pool.free_list_snapshot();
    assert_eq!(snapshot.len(), 8192);
    assert!(snapshot.iter().all(|&(_, size)| size == 128));
}

#[test]
fn s3_exhaustion_and_full_release() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    let mut ptrs = Vec::new();
    for _ in 0..16 {
        ptrs.push(pool.allocate(64).unwrap());
    }
    assert!(pool.allocate(64).is_none());

    for ptr in ptrs {
        pool.release(ptr.as_ptr());
        assert!(free_list_is_ascending(&pool.free_list_snapshot()));
    }

    let snapshot = pool.free_list_snapshot();
    assert_eq!(snapshot.len(), 16);
    assert_eq!(snapshot[0].0, 0);
}

#[test]
fn s4_coalescing_allocate_and_symmetric_split_on_release() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    let p = pool.allocate(200).unwrap();
    assert_eq!(pool.free_count(), 12);

    pool.release(p.as_ptr());
    let snapshot = pool.free_list_snapshot();
    assert_eq!(snapshot.len(), 16);
    assert!(snapshot.iter().all(|&(_, size)| size == 64));
    assert!(free_list_is_ascending(&snapshot));
}

#[test]
fn s5_isolated_gap_blocks_coalescing() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    let ptrs: Vec<_> = (0..16).map(|_| pool.allocate(64).unwrap()).collect();
    // Release a single isolated block; every neighbor stays allocated, so
    // the free list never holds a 4-block contiguous run for `allocate(200)`.
    pool.release(ptrs[5].as_ptr());

    assert!(pool.allocate(200).is_none());
}

#[test]
fn s6_concurrent_allocate_release_converges() {
    use std::sync::Arc;
    use std::thread;

    const THREADS: usize = 6;
    const ITERATIONS: usize = 2_000;

    let pool = Arc::new(Pool::init(PoolConfig::new(1024 * 1024, std::mem::size_of::<usize>() as u32)).unwrap());
    let expected = pool.block_count() as usize;

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    if let Some(ptr) = pool.allocate(std::mem::size_of::<usize>() as u32) {
                        pool.release(ptr.as_ptr());
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let snapshot = pool.free_list_snapshot();
    assert_eq!(snapshot.len(), expected);
    assert!(free_list_is_ascending(&snapshot));
    assert_eq!(pool.allocated_count(), 0);
}
