//! Smoke tests: the smallest possible check that each public operation
//! does what its name says, before the heavier scenario and stress
//! suites run.

use blockpool::{Pool, PoolConfig, PoolHandle};

#[test]
fn init_rejects_degenerate_configurations() {
    assert!(Pool::init(PoolConfig::new(0, 64)).is_err());
    assert!(Pool::init(PoolConfig::new(64, 64)).is_err());
    assert!(Pool::init(PoolConfig::new(64, 128)).is_err());
}

#[test]
fn allocate_and_release_round_trip() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    let ptr = pool.allocate(16).unwrap();
    pool.release(ptr.as_ptr());
    assert_eq!(pool.free_count(), pool.block_count() as usize);
}

#[test]
fn release_of_a_pointer_never_allocated_is_reported_harmlessly() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    let mut not_ours = 0u8;
    pool.release(&mut not_ours as *mut u8);
    assert_eq!(pool.free_count(), pool.block_count() as usize);
}

#[test]
fn release_of_null_is_reported_harmlessly() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    pool.release(std::ptr::null_mut());
    assert_eq!(pool.free_count(), pool.block_count() as usize);
}

#[test]
fn single_threaded_mode_still_serves_allocations() {
    let pool = Pool::init(PoolConfig::new(1024, 64).with_thread_safe(false)).unwrap();
    let ptr = pool.allocate(64).unwrap();
    pool.release(ptr.as_ptr());
    assert_eq!(pool.free_count(), 16);
}

#[test]
fn pool_handle_allocation_is_dropped_cleanly() {
    let handle = PoolHandle::new(PoolConfig::new(1024, 64)).unwrap();
    {
        let mut guard = handle.allocate(32).unwrap();
        guard[0] = 9;
        assert_eq!(guard[0], 9);
    }
    handle.destroy().unwrap();
}

#[test]
fn destroy_consumes_a_freshly_initialized_pool() {
    let pool = Pool::init(PoolConfig::new(1024, 64)).unwrap();
    assert!(pool.destroy().is_ok());
}
