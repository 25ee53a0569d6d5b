//! A safe, owning wrapper around [`Pool`], in the same spirit as the
//! donor crate's `ThreadHandle`/`MutexGuard` pair: a `Drop`-based owning
//! handle plus a `Drop`-based RAII guard, so callers who want the raw
//! pointer API in `pool.rs` never have to.

use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::pool::Pool;

/// An owned pool. Dropping it tears the pool down; there is no manual
/// join/detach distinction the way there was for `ThreadHandle`, since a
/// pool has no concurrent task to wait on.
pub struct PoolHandle {
    pool: Option<Pool>,
}

impl PoolHandle {
    /// Initialize a pool and wrap it for safe, pointer-free use.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        Ok(Self {
            pool: Some(Pool::init(config)?),
        })
    }

    /// Allocate `n_bytes`, returning an RAII guard that releases on drop.
    pub fn allocate(&self, n_bytes: u32) -> Option<Allocation<'_>> {
        let ptr = self.pool().allocate(n_bytes)?;
        Some(Allocation {
            pool: self.pool(),
            ptr,
            len: n_bytes as usize,
        })
    }

    /// Allocate `count * elem_size` zeroed bytes.
    pub fn zero_allocate(&self, count: u32, elem_size: usize) -> Option<Allocation<'_>> {
        let ptr = self.pool().zero_allocate(count, elem_size)?;
        Some(Allocation {
            pool: self.pool(),
            ptr,
            len: count as usize * elem_size,
        })
    }

    /// Explicitly tear the pool down, surfacing any failure from
    /// [`Pool::destroy`] instead of silently dropping it.
    pub fn destroy(mut self) -> Result<(), PoolError> {
        self.pool.take().expect("pool taken twice").destroy()
    }

    fn pool(&self) -> &Pool {
        self.pool.as_ref().expect("pool dropped before handle")
    }
}

/// A single live allocation borrowed from a [`PoolHandle`]. Releasing it
/// manually is never required: dropping the guard calls
/// [`Pool::release`] automatically, mirroring `MutexGuard`'s unlock-on-drop.
pub struct Allocation<'a> {
    pool: &'a Pool,
    ptr: NonNull<u8>,
    len: usize,
}

impl<'a> Allocation<'a> {
    /// Grow this allocation in place if it fits, or move it into a fresh
    /// span otherwise. On success `self` is updated to describe the
    /// (possibly relocated) span.
    pub fn reallocate(&mut self, n_bytes: u32) -> bool {
        match self.pool.reallocate(self.ptr.as_ptr(), n_bytes) {
            Some(new_ptr) => {
                self.ptr = new_ptr;
                self.len = n_bytes as usize;
                true
            }
            None => false,
        }
    }
}

impl<'a> Deref for Allocation<'a> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: `ptr` was returned by this pool's `allocate`/
        // `zero_allocate`/`reallocate` and remains exclusively ours
        // until this guard drops.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<'a> DerefMut for Allocation<'a> {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: see `Deref`.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<'a> Drop for Allocation<'a> {
    fn drop(&mut self) {
        self.pool.release(self.ptr.as_ptr());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(capacity: u32, block_size: u32) -> PoolConfig {
        PoolConfig::new(capacity, block_size)
    }

    #[test]
    fn allocation_guard_writes_through_and_releases_on_drop() {
        let handle = PoolHandle::new(config(1024, 64)).unwrap();
        {
            let mut alloc = handle.allocate(32).unwrap();
            alloc.fill(0x42);
            assert!(alloc.iter().all(|&b| b == 0x42));
        }
        assert_eq!(handle.pool().free_count(), 16);
    }

    #[test]
    fn allocation_reallocate_grows_in_place_or_moves() {
        let handle = PoolHandle::new(config(1024, 64)).unwrap();
        let mut alloc = handle.allocate(32).unwrap();
        alloc[0] = 7;
        assert!(alloc.reallocate(65));
        assert_eq!(alloc[0], 7);
        assert_eq!(alloc.len(), 65);
    }

    #[test]
    fn destroy_consumes_the_handle() {
        let handle = PoolHandle::new(config(1024, 64)).unwrap();
        assert!(handle.destroy().is_ok());
    }
}
