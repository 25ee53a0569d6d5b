//! The block descriptor table.
//!
//! Descriptors are stored in one contiguous array indexed by block
//! number (spec.md §9's "array variant"), not as individually
//! heap-allocated nodes: `next` is an index into this array, a weak
//! reference rather than an owned pointer. Each descriptor's `span_base`
//! is stored as a byte offset from the pool's aligned base rather than a
//! raw pointer, so the table itself needs no `unsafe impl Send`/`Sync`
//! gymnastics beyond the one documented below for the shared-custody cell.

use std::cell::UnsafeCell;

/// Per-descriptor state, mirroring the state machine of spec.md §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DescriptorState {
    Free,
    AllocatedSingle,
    AllocatedCoalesced,
    /// Folded into a coalesced span; not independently reachable from
    /// either list until the matching release revives it.
    Retired,
}

/// Metadata for one contiguous span, always a positive multiple of the
/// pool's block stride.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Descriptor {
    /// Byte offset from the pool's aligned base.
    pub span_base: u32,
    /// Span size in bytes; a positive multiple of the block stride.
    pub span_size: u32,
    /// Index of the next descriptor on whichever list currently owns
    /// this one.
    pub next: Option<u32>,
    pub state: DescriptorState,
}

/// The descriptor array, shared between the free-list and allocated-list
/// critical sections.
///
/// Individual descriptor fields are mutated under one of the pool's two
/// list locks (`free_mtx` for descriptors reachable from the free list,
/// `alloc_mtx` for descriptors reachable from the allocated list); a
/// descriptor detached from both lists is under the exclusive custody of
/// whichever thread detached it. No lock in the type system enforces
/// this split across a single backing array, so callers must only reach
/// for [`DescriptorTable::get`] / [`DescriptorTable::get_mut`] while
/// holding the lock that the spec assigns to the descriptor in question.
pub(crate) struct DescriptorTable {
    descriptors: UnsafeCell<Vec<Descriptor>>,
}

// SAFETY: access is only ever performed by callers holding the list lock
// that owns the descriptor being touched (see the struct documentation).
unsafe impl Send for DescriptorTable {}
unsafe impl Sync for DescriptorTable {}

impl DescriptorTable {
    /// Build a fresh table of `block_count` descriptors, one per
    /// stride-sized slot, each initially `Free` at offset `i * block_stride`.
    pub(crate) fn new_initial(block_count: u32, block_stride: u32) -> Self {
        let mut descriptors = Vec::with_capacity(block_count as usize);
        for i in 0..block_count {
            descriptors.push(Descriptor {
                span_base: i * block_stride,
                span_size: block_stride,
                next: if i + 1 < block_count { Some(i + 1) } else { None },
                state: DescriptorState::Free,
            });
        }
        Self {
            descriptors: UnsafeCell::new(descriptors),
        }
    }

    pub(crate) fn len(&self) -> u32 {
        // SAFETY: length never changes after construction; no lock needed.
        unsafe { (*self.descriptors.get()).len() as u32 }
    }

    /// # Safety-by-convention
    /// Must only be called while holding the list lock that owns `idx`.
    #[allow(clippy::mut_from_ref)]
    pub(crate) fn get_mut(&self, idx: u32) -> &mut Descriptor {
        // SAFETY: see struct documentation; `idx` is always in range
        // because the table never shrinks and callers only hand out
        // indices obtained from the table itself.
        unsafe { &mut (*self.descriptors.get())[idx as usize] }
    }

    /// # Safety-by-convention
    /// Must only be called while holding the list lock that owns `idx`,
    /// or for read-only diagnostics when no concurrent mutation is
    /// possible (e.g. tests on a quiesced pool).
    pub(crate) fn get(&self, idx: u32) -> Descriptor {
        // SAFETY: see `get_mut`.
        unsafe { (*self.descriptors.get())[idx as usize] }
    }
}
