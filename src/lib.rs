//! A fixed-capacity, block-structured memory suballocator.
//!
//! A [`Pool`] carves one `malloc`-backed byte region into `N` fixed-size
//! blocks and serves allocations either directly off a free list (when
//! the request fits in one block) or by coalescing several
//! address-adjacent free blocks into one span (when it doesn't).
//! Concurrent access is mediated by two independent locks, one per
//! linked list, which are never held at the same time.
//!
//! Two layers are exposed:
//! - [`pool::Pool`] — the raw-pointer-returning core, shaped like the
//!   language-neutral contract in the design notes.
//! - [`safe_api::PoolHandle`] / [`safe_api::Allocation`] — an owning,
//!   `Drop`-based wrapper for callers who would rather not juggle raw
//!   pointers themselves.
//!
//! [`puzzle`] bundles an unrelated workload (sliding-tile A*) used only
//! to put the allocator under a bursty, size-clustered allocation
//! pattern in the `stress_test` and `benchmark` binaries.

pub mod config;
mod descriptor;
mod diagnostics;
pub mod error;
mod lock;
pub mod pool;
mod region;
pub mod safe_api;

pub mod puzzle;

pub use config::{PoolConfig, ALIGNMENT, GIGABYTE, KILOBYTE, MEGABYTE};
pub use error::{BookkeepingError, CapacityError, PoolError, PoolResult, PreconditionError};
pub use pool::Pool;
pub use safe_api::{Allocation, PoolHandle};
