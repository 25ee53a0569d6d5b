//! The suballocator pool: lifecycle, allocation, release.
//!
//! This is the hard engineering the rest of the crate exists to support:
//! the block table layout, the contiguous-run coalescing search, the
//! ordered free-list insertion, the reversible split on release, and the
//! two-lock concurrency discipline that lets allocate and release
//! interleave without ever holding both locks at once.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::PoolConfig;
use crate::descriptor::{DescriptorState, DescriptorTable};
use crate::diagnostics;
use crate::error::{BookkeepingError, CapacityError, PoolError, PreconditionError};
use crate::lock::ListLock;
use crate::region::Region;

/// A fixed-capacity, block-structured suballocation arena.
///
/// A `Pool` owns its backing bytes (via [`Region`]) and its descriptor
/// table for its entire lifetime; it is torn down by [`Pool::destroy`]
/// or, if never explicitly destroyed, by `Drop`.
pub struct Pool {
    config: PoolConfig,
    block_stride: u32,
    block_count: u32,
    region: Region,
    descriptors: DescriptorTable,
    free_head: ListLock<Option<u32>>,
    alloc_head: ListLock<Option<u32>>,
    coalesce_count: AtomicU64,
}

// SAFETY: `Pool`'s interior mutability is entirely mediated by
// `ListLock`, which is `Sync` under the same contract `Pool` itself
// asserts (thread_safe implies real locking; single-threaded mode is the
// caller's promise of exclusive access).
unsafe impl Sync for Pool {}

/// Result of a successful scan for `k` address-consecutive free
/// descriptors: the run's first index, the node preceding it in the
/// free list (`None` if the run starts at the list head), and the node
/// following the run (`None` if the run ends the list).
struct FreeRun {
    start: u32,
    start_prev: Option<u32>,
    after: Option<u32>,
}

impl Pool {
    /// Round `requested` up to the next multiple of `align` (a power of two).
    fn round_up(requested: u32, align: u32) -> Option<u32> {
        let align = align as u64;
        let requested = requested as u64;
        let rounded = requested.checked_add(align - 1)? / align * align;
        u32::try_from(rounded).ok()
    }

    /// Initialize a pool per spec.md §4.1. Preconditions are reported
    /// without allocating.
    pub fn init(config: PoolConfig) -> Result<Pool, PoolError> {
        if config.capacity == 0 {
            let err = PoolError::Precondition(PreconditionError::ZeroCapacity);
            diagnostics::report(err);
            return Err(err);
        }
        if config.requested_block_size == 0 || config.requested_block_size >= config.capacity {
            let err = PoolError::Precondition(PreconditionError::BlockSizeNotSmallerThanCapacity);
            diagnostics::report(err);
            return Err(err);
        }

        let block_stride = Self::round_up(config.requested_block_size, crate::config::ALIGNMENT as u32)
            .ok_or(PoolError::Precondition(
                PreconditionError::BlockSizeNotSmallerThanCapacity,
            ))?;
        let block_count = config.capacity / block_stride;
        if block_count == 0 {
            let err = PoolError::Precondition(PreconditionError::BlockSizeNotSmallerThanCapacity);
            diagnostics::report(err);
            return Err(err);
        }

        let usable = block_count as usize * block_stride as usize;
        let region = Region::acquire(usable).ok_or(PoolError::Capacity(
            CapacityError::RequestExceedsPoolCapacity,
        ))?;

        let descriptors = DescriptorTable::new_initial(block_count, block_stride);

        Ok(Pool {
            config,
            block_stride,
            block_count,
            region,
            descriptors,
            free_head: ListLock::new(Some(0), config.thread_safe),
            alloc_head: ListLock::new(None, config.thread_safe),
            coalesce_count: AtomicU64::new(0),
        })
    }

    /// Tear the pool down explicitly. Always succeeds: a live `Pool`
    /// value can only exist via a successful [`Pool::init`], so
    /// spec.md's "destroy of a never-initialized pool" failure has no
    /// reachable counterpart under Rust's ownership model — there is no
    /// null `Pool` handle to pass in. See DESIGN.md for the full
    /// rationale.
    pub fn destroy(self) -> Result<(), PoolError> {
        Ok(())
    }

    /// Total byte capacity requested at construction.
    pub fn capacity(&self) -> u32 {
        self.config.capacity
    }

    /// The pool's fixed block stride `B`.
    pub fn block_stride(&self) -> u32 {
        self.block_stride
    }

    /// The pool's fixed block count `N`.
    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    /// Number of coalescing allocations served so far (diagnostic only).
    pub fn coalesce_count(&self) -> u64 {
        self.coalesce_count.load(Ordering::Relaxed)
    }

    /// Number of descriptors currently on the free list.
    pub fn free_count(&self) -> usize {
        self.free_list_snapshot().len()
    }

    /// Number of descriptors currently on the allocated list.
    pub fn allocated_count(&self) -> usize {
        let head = self.alloc_head.lock();
        let mut count = 0usize;
        let mut cursor = *head;
        while let Some(idx) = cursor {
            count += 1;
            cursor = self.descriptors.get(idx).next;
        }
        count
    }

    /// Snapshot of `(span_base, span_size)` pairs in free-list order, for
    /// tests asserting P1–P5 and L1/L5.
    pub fn free_list_snapshot(&self) -> Vec<(u32, u32)> {
        let head = self.free_head.lock();
        let mut out = Vec::new();
        let mut cursor = *head;
        while let Some(idx) = cursor {
            let d = self.descriptors.get(idx);
            out.push((d.span_base, d.span_size));
            cursor = d.next;
        }
        out
    }

    fn ptr_for(&self, offset: u32) -> NonNull<u8> {
        // SAFETY: `offset` is always < block_count * block_stride <=
        // region.usable_len(), maintained as an invariant of every
        // descriptor in the table.
        unsafe { NonNull::new_unchecked(self.region.aligned_base().as_ptr().add(offset as usize)) }
    }

    fn offset_for(&self, ptr: NonNull<u8>) -> Option<u32> {
        let base = self.region.aligned_base().as_ptr() as usize;
        let p = ptr.as_ptr() as usize;
        let diff = p.checked_sub(base)?;
        if diff >= self.block_count as usize * self.block_stride as usize {
            return None;
        }
        u32::try_from(diff).ok()
    }

    /// Allocate `n_bytes`, taking the fast path (`n_bytes <= B`) or the
    /// coalescing path (`n_bytes > B`) per spec.md §4.2.
    pub fn allocate(&self, n_bytes: u32) -> Option<NonNull<u8>> {
        if n_bytes >= self.config.capacity {
            diagnostics::report(PoolError::Capacity(CapacityError::RequestExceedsPoolCapacity));
            return None;
        }
        if n_bytes <= self.block_stride {
            self.allocate_fast()
        } else {
            let k = (n_bytes + self.block_stride - 1) / self.block_stride;
            self.allocate_coalescing(k)
        }
    }

    fn allocate_fast(&self) -> Option<NonNull<u8>> {
        let idx = {
            let mut head = self.free_head.lock();
            let idx = match *head {
                Some(idx) => idx,
                None => {
                    drop(head);
                    diagnostics::report(PoolError::Capacity(CapacityError::FreeListExhausted));
                    return None;
                }
            };
            *head = self.descriptors.get(idx).next;
            idx
        };

        {
            let d = self.descriptors.get_mut(idx);
            d.state = DescriptorState::AllocatedSingle;
            d.next = None;
        }
        {
            let mut ahead = self.alloc_head.lock();
            self.descriptors.get_mut(idx).next = *ahead;
            *ahead = Some(idx);
        }
        Some(self.ptr_for(self.descriptors.get(idx).span_base))
    }

    fn find_free_run(&self, head: Option<u32>, k: u32) -> Option<FreeRun> {
        let mut cursor = head;
        let mut prev_idx: Option<u32> = None;
        let mut prev_base: Option<u32> = None;
        let mut run_start: Option<u32> = None;
        let mut run_start_prev: Option<u32> = None;
        let mut run_count: u32 = 0;

        while let Some(idx) = cursor {
            let d = self.descriptors.get(idx);
            let continues = run_count > 0 && prev_base == Some(d.span_base - self.block_stride);
            if continues {
                run_count += 1;
            } else {
                run_start = Some(idx);
                run_start_prev = prev_idx;
                run_count = 1;
            }
            if run_count == k {
                return Some(FreeRun {
                    start: run_start.unwrap(),
                    start_prev: run_start_prev,
                    after: d.next,
                });
            }
            prev_base = Some(d.span_base);
            prev_idx = Some(idx);
            cursor = d.next;
        }
        None
    }

    fn allocate_coalescing(&self, k: u32) -> Option<NonNull<u8>> {
        let head_idx = {
            let mut head = self.free_head.lock();
            let run = match self.find_free_run(*head, k) {
                Some(run) => run,
                None => {
                    drop(head);
                    diagnostics::report(PoolError::Fragmentation);
                    return None;
                }
            };

            match run.start_prev {
                Some(p) => self.descriptors.get_mut(p).next = run.after,
                None => *head = run.after,
            }

            // Descriptor indices are stable block numbers (never
            // reassigned), so the k members of a run that starts at
            // `run.start` and is address-contiguous are exactly
            // run.start .. run.start + k - 1.
            let head_descriptor = self.descriptors.get_mut(run.start);
            head_descriptor.span_size = k * self.block_stride;
            head_descriptor.state = DescriptorState::AllocatedCoalesced;
            head_descriptor.next = None;
            for i in 1..k {
                let trailing = self.descriptors.get_mut(run.start + i);
                trailing.state = DescriptorState::Retired;
                trailing.next = None;
            }
            run.start
        };

        self.coalesce_count.fetch_add(1, Ordering::Relaxed);
        let head_base = self.descriptors.get(head_idx).span_base;
        diagnostics::trace_coalesce(k, head_base);

        {
            let mut ahead = self.alloc_head.lock();
            self.descriptors.get_mut(head_idx).next = *ahead;
            *ahead = Some(head_idx);
        }
        Some(self.ptr_for(head_base))
    }

    /// Allocate `count * elem_size` bytes and zero them (spec.md §4.3).
    pub fn zero_allocate(&self, count: u32, elem_size: usize) -> Option<NonNull<u8>> {
        let total = (count as usize).checked_mul(elem_size).unwrap_or(usize::MAX);
        if total == 0 {
            diagnostics::report(PoolError::Precondition(PreconditionError::ZeroProduct));
            return None;
        }
        let n_bytes = u32::try_from(total).unwrap_or(u32::MAX);
        let ptr = self.allocate(n_bytes)?;
        // SAFETY: `allocate` returns a span of at least `n_bytes >= total`
        // bytes (when it does not saturate) that is exclusively ours
        // until release.
        unsafe { std::ptr::write_bytes(ptr.as_ptr(), 0, total) };
        Some(ptr)
    }

    /// Grow (never shrink) the allocation at `ptr` to `n_bytes` (spec.md
    /// §4.4). The lookup and the no-downsize decision happen inside one
    /// critical section; growing and copying necessarily happen outside
    /// it, since they recurse into `allocate`/`release`, each of which
    /// takes the same locks (see DESIGN.md).
    pub fn reallocate(&self, ptr: *mut u8, n_bytes: u32) -> Option<NonNull<u8>> {
        let Some(nn) = NonNull::new(ptr) else {
            diagnostics::report(PoolError::Precondition(PreconditionError::NullPointer));
            return None;
        };
        if n_bytes == 0 {
            diagnostics::report(PoolError::Precondition(PreconditionError::ZeroSizeReallocate));
            return None;
        }
        let Some(offset) = self.offset_for(nn) else {
            diagnostics::report(PoolError::Bookkeeping(BookkeepingError::PointerNotAllocated));
            return None;
        };

        let old_size = {
            let head = self.alloc_head.lock();
            if head.is_none() {
                drop(head);
                diagnostics::report(PoolError::Bookkeeping(BookkeepingError::PointerNotAllocated));
                return None;
            }
            let mut cursor = *head;
            let mut found = None;
            while let Some(idx) = cursor {
                let d = self.descriptors.get(idx);
                if d.span_base == offset {
                    found = Some(d.span_size);
                    break;
                }
                cursor = d.next;
            }
            match found {
                Some(size) => size,
                None => {
                    drop(head);
                    diagnostics::report(PoolError::Bookkeeping(BookkeepingError::PointerNotAllocated));
                    return None;
                }
            }
        };

        if old_size >= n_bytes {
            return Some(nn);
        }

        let new_ptr = self.allocate(n_bytes)?;
        // SAFETY: `old_size` bytes starting at `nn` belong to the span
        // we are about to release, and are disjoint from the freshly
        // allocated span at `new_ptr`.
        unsafe {
            std::ptr::copy_nonoverlapping(nn.as_ptr(), new_ptr.as_ptr(), old_size as usize);
        }
        self.release(ptr);
        Some(new_ptr)
    }

    /// Release `ptr` back to the pool (spec.md §4.5). A foreign pointer,
    /// a double release, or an interior pointer are all reported as a
    /// bookkeeping error, with no list mutation.
    pub fn release(&self, ptr: *mut u8) {
        let Some(nn) = NonNull::new(ptr) else {
            diagnostics::report(PoolError::Precondition(PreconditionError::NullPointer));
            return;
        };
        let Some(offset) = self.offset_for(nn) else {
            diagnostics::report(PoolError::Bookkeeping(BookkeepingError::PointerNotAllocated));
            return;
        };

        let idx = {
            let mut head = self.alloc_head.lock();
            if head.is_none() {
                drop(head);
                diagnostics::report(PoolError::Bookkeeping(BookkeepingError::PointerNotAllocated));
                return;
            }
            let mut prev: Option<u32> = None;
            let mut cursor = *head;
            let mut found: Option<u32> = None;
            while let Some(idx) = cursor {
                let d = self.descriptors.get(idx);
                if d.span_base == offset {
                    found = Some(idx);
                    break;
                }
                prev = Some(idx);
                cursor = d.next;
            }
            let idx = match found {
                Some(idx) => idx,
                None => {
                    drop(head);
                    diagnostics::report(PoolError::Bookkeeping(BookkeepingError::PointerNotAllocated));
                    return;
                }
            };
            let next = self.descriptors.get(idx).next;
            match prev {
                Some(p) => self.descriptors.get_mut(p).next = next,
                None => *head = next,
            }
            idx
        };

        let k = self.descriptors.get(idx).span_size / self.block_stride;
        if k == 1 {
            let d = self.descriptors.get_mut(idx);
            d.state = DescriptorState::Free;
            d.next = None;
            self.insert_free_chain(idx, idx);
        } else {
            diagnostics::trace_split(k, offset);
            for i in 0..k {
                let d = self.descriptors.get_mut(idx + i);
                d.state = DescriptorState::Free;
                d.span_size = self.block_stride;
                d.next = if i + 1 < k { Some(idx + i + 1) } else { None };
            }
            self.insert_free_chain(idx, idx + k - 1);
        }
    }

    /// Splice the already-internally-linked chain `[head_idx ..=
    /// tail_idx]` into the free list so that ascending address order
    /// (I4) is preserved (spec.md §4.5 step 4).
    fn insert_free_chain(&self, head_idx: u32, tail_idx: u32) {
        let mut free_head = self.free_head.lock();
        let freed_base = self.descriptors.get(head_idx).span_base;

        let cur_head = match *free_head {
            None => {
                *free_head = Some(head_idx);
                return;
            }
            Some(cur_head) => cur_head,
        };

        if freed_base < self.descriptors.get(cur_head).span_base {
            self.descriptors.get_mut(tail_idx).next = Some(cur_head);
            *free_head = Some(head_idx);
            return;
        }

        let mut cursor = cur_head;
        loop {
            match self.descriptors.get(cursor).next {
                Some(next) if self.descriptors.get(next).span_base < freed_base => {
                    cursor = next;
                }
                other => {
                    self.descriptors.get_mut(tail_idx).next = other;
                    break;
                }
            }
        }
        self.descriptors.get_mut(cursor).next = Some(head_idx);
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        diagnostics::trace_teardown();
    }
}

#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}
#[allow(dead_code)]
fn _pool_is_send_sync() {
    assert_send_sync::<Pool>();
}
