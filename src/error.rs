//! Error kinds reported by pool operations.
//!
//! The pool never panics on its own error paths. Every fallible operation
//! either returns a raw pointer / negative status at the FFI-shaped
//! boundary (`Pool`) or a [`PoolError`] at the safe boundary (`safe_api`).

use std::fmt;

/// A pool error, classified into the four kinds a caller needs to
/// distinguish (precondition, capacity, fragmentation, bookkeeping).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// A precondition on the inputs was violated: bad size, null pointer,
    /// destroying an uninitialized pool, zero product in zero-allocate.
    Precondition(PreconditionError),
    /// The request exceeds what the pool can ever satisfy, or the free
    /// list is currently empty.
    Capacity(CapacityError),
    /// No run of consecutive free blocks is long enough to satisfy a
    /// coalescing allocation.
    Fragmentation,
    /// A release (or reallocate) pointer does not match any descriptor
    /// on the allocated list: a foreign pointer, a double release, or
    /// an interior pointer into an existing span.
    Bookkeeping(BookkeepingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    ZeroCapacity,
    BlockSizeNotSmallerThanCapacity,
    NullPointer,
    ZeroProduct,
    DestroyUninitialized,
    ZeroSizeReallocate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    RequestExceedsPoolCapacity,
    FreeListExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookkeepingError {
    PointerNotAllocated,
}

impl PoolError {
    /// A short, stable classifier string, independent of `Display`'s
    /// exact wording (which is not part of the contract).
    pub fn as_str(self) -> &'static str {
        match self {
            PoolError::Precondition(PreconditionError::ZeroCapacity) => "zero capacity",
            PoolError::Precondition(PreconditionError::BlockSizeNotSmallerThanCapacity) => {
                "block size not smaller than capacity"
            }
            PoolError::Precondition(PreconditionError::NullPointer) => "null pointer",
            PoolError::Precondition(PreconditionError::ZeroProduct) => "zero product",
            PoolError::Precondition(PreconditionError::DestroyUninitialized) => {
                "destroy of uninitialized pool"
            }
            PoolError::Precondition(PreconditionError::ZeroSizeReallocate) => {
                "zero-size reallocate"
            }
            PoolError::Capacity(CapacityError::RequestExceedsPoolCapacity) => {
                "request exceeds pool capacity"
            }
            PoolError::Capacity(CapacityError::FreeListExhausted) => "free list exhausted",
            PoolError::Fragmentation => "no adequate contiguous run",
            PoolError::Bookkeeping(BookkeepingError::PointerNotAllocated) => {
                "pointer not on allocated list"
            }
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allocator error: {}", self.as_str())
    }
}

impl std::error::Error for PoolError {}

/// Result alias used throughout the safe boundary.
pub type PoolResult<T> = Result<T, PoolError>;
