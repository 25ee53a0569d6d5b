//! Structured logging for pool failures, via the `log` facade (spec.md
//! §6's "Error reporting" column, made concrete).
//!
//! The pool never panics on a caller mistake; it reports through `log`
//! and returns null/`Err`, same as the donor crate's own `log::warn!`
//! calls around its scheduler's retry paths.

use crate::error::PoolError;

pub(crate) fn report(err: PoolError) {
    match err {
        PoolError::Fragmentation => log::warn!("{err}"),
        _ => log::error!("{err}"),
    }
}

pub(crate) fn trace_coalesce(block_count: u32, offset: u32) {
    log::trace!("coalesced {block_count} blocks into span at offset {offset}");
}

pub(crate) fn trace_split(block_count: u32, offset: u32) {
    log::trace!("split {block_count}-block span at offset {offset} back into free blocks");
}

pub(crate) fn trace_teardown() {
    log::trace!("pool torn down");
}
