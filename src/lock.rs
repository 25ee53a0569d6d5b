//! The pool's two independent list locks.
//!
//! `free_mtx` and `alloc_mtx` are each one [`ListLock`]: a thin wrapper
//! that is either a real `spin::Mutex` or, in single-threaded mode, an
//! `UnsafeCell` shim that elides synchronization entirely. The donor
//! crate's own `safe_api::Mutex` is a hand-rolled spinlock; this keeps
//! the same spirit (short, uncontended critical sections, no blocking
//! syscalls) but reuses the crate's existing `spin` dependency instead
//! of reimplementing a compare-and-swap loop, and adds the no-op branch
//! the pool's single-threaded mode requires.

use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

enum Inner<T> {
    Spin(spin::Mutex<T>),
    /// Elides locking entirely. Valid only because the pool asserts, at
    /// construction, that no two threads will call into it concurrently.
    Unchecked(UnsafeCell<T>),
}

/// A list lock that is either a real spinlock or a no-op, chosen once
/// at pool construction (§5, "Thread-safety switch").
pub(crate) struct ListLock<T> {
    inner: Inner<T>,
}

// SAFETY: in the `Unchecked` variant, `Sync` is only sound because the
// caller asserted (by requesting single-threaded mode) that no two
// threads touch the pool concurrently; the pool never proves this
// itself.
unsafe impl<T: Send> Sync for ListLock<T> {}

impl<T> ListLock<T> {
    pub(crate) fn new(value: T, thread_safe: bool) -> Self {
        let inner = if thread_safe {
            Inner::Spin(spin::Mutex::new(value))
        } else {
            Inner::Unchecked(UnsafeCell::new(value))
        };
        Self { inner }
    }

    pub(crate) fn lock(&self) -> ListGuard<'_, T> {
        match &self.inner {
            Inner::Spin(mutex) => ListGuard::Spin(mutex.lock()),
            // SAFETY: see the `unsafe impl Sync` justification above.
            Inner::Unchecked(cell) => ListGuard::Unchecked(unsafe { &mut *cell.get() }),
        }
    }
}

pub(crate) enum ListGuard<'a, T> {
    Spin(spin::MutexGuard<'a, T>),
    Unchecked(&'a mut T),
}

impl<'a, T> Deref for ListGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            ListGuard::Spin(guard) => guard,
            ListGuard::Unchecked(r) => r,
        }
    }
}

impl<'a, T> DerefMut for ListGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        match self {
            ListGuard::Spin(guard) => guard,
            ListGuard::Unchecked(r) => r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_mode_serializes_access() {
        let lock = ListLock::new(0u32, true);
        *lock.lock() += 1;
        assert_eq!(*lock.lock(), 1);
    }

    #[test]
    fn unchecked_mode_still_derefs() {
        let lock = ListLock::new(0u32, false);
        *lock.lock() += 1;
        assert_eq!(*lock.lock(), 1);
    }
}
