//! Raw byte region acquisition from the system allocator.
//!
//! The pool's backing bytes come from `libc::malloc`, not from Rust's
//! global allocator: the region is conceptually foreign memory that the
//! pool hands out piecewise, mirroring how the donor crate reaches for
//! `libc` whenever it needs memory the Rust allocator does not own.

use crate::config::ALIGNMENT;
use std::ptr::NonNull;

/// One contiguous, `malloc`-backed byte region, advanced to an
/// 8-byte-aligned usable base.
pub struct Region {
    /// Pointer as returned by `malloc`; required to call `free`.
    original_base: NonNull<u8>,
    /// `original_base`, advanced to the next multiple of [`ALIGNMENT`].
    aligned_base: NonNull<u8>,
    /// Bytes requested from `malloc` (>= the pool's usable capacity).
    raw_len: usize,
}

unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Region {
    /// Acquire a region of at least `usable_capacity` aligned, usable
    /// bytes. Requests `usable_capacity + ALIGNMENT` from `malloc` so
    /// alignment can always be found within the returned block.
    pub fn acquire(usable_capacity: usize) -> Option<Self> {
        let raw_len = usable_capacity.checked_add(ALIGNMENT)?;
        // SAFETY: raw_len is non-zero (ALIGNMENT alone is > 0) and the
        // returned pointer, if non-null, is valid for raw_len bytes until
        // freed with `libc::free`.
        let ptr = unsafe { libc::malloc(raw_len) } as *mut u8;
        let original_base = NonNull::new(ptr)?;

        let misalignment = (original_base.as_ptr() as usize) % ALIGNMENT;
        let advance = if misalignment == 0 {
            0
        } else {
            ALIGNMENT - misalignment
        };
        // SAFETY: advance < ALIGNMENT <= raw_len, so this stays within
        // the allocation.
        let aligned_base =
            unsafe { NonNull::new_unchecked(original_base.as_ptr().add(advance)) };

        Some(Self {
            original_base,
            aligned_base,
            raw_len,
        })
    }

    /// The 8-byte-aligned base usable by the descriptor table.
    pub fn aligned_base(&self) -> NonNull<u8> {
        self.aligned_base
    }

    /// Bytes available starting from [`Region::aligned_base`].
    pub fn usable_len(&self) -> usize {
        self.raw_len - (self.aligned_base.as_ptr() as usize - self.original_base.as_ptr() as usize)
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        // SAFETY: `original_base` was returned by `libc::malloc` in
        // `acquire` and has not been freed before (ownership of `Region`
        // is unique, `free` runs at most once).
        unsafe { libc::free(self.original_base.as_ptr() as *mut libc::c_void) }
    }
}
