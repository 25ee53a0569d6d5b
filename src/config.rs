//! Pool configuration surface.
//!
//! There is no file or environment-variable configuration layer: a
//! [`PoolConfig`] is a plain value a caller builds in-process (the CLI
//! drivers under `src/bin` build one from two integers read off stdin).

/// One kilobyte, in bytes.
pub const KILOBYTE: u32 = 1024;
/// One megabyte, in bytes.
pub const MEGABYTE: u32 = 1024 * KILOBYTE;
/// One gigabyte, in bytes.
pub const GIGABYTE: u32 = 1024 * MEGABYTE;

/// Natural alignment the pool base and block stride are held to.
pub const ALIGNMENT: usize = 8;

/// Configuration for a single pool.
///
/// `capacity` and `requested_block_size` are validated by [`Pool::init`]
/// (they are precondition failures, not panics); `thread_safe` just picks
/// which lock implementation backs the two list mutexes.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// Total byte capacity requested for the pool's backing region.
    pub capacity: u32,
    /// Requested block size; rounded up to a multiple of [`ALIGNMENT`]
    /// to produce the pool's actual block stride.
    pub requested_block_size: u32,
    /// Whether the pool elides lock acquisition on every path. A caller
    /// selecting `true` asserts that no two threads will call into the
    /// pool concurrently.
    pub thread_safe: bool,
}

impl PoolConfig {
    /// A thread-safe pool configuration with the given capacity and
    /// block size.
    pub fn new(capacity: u32, requested_block_size: u32) -> Self {
        Self {
            capacity,
            requested_block_size,
            thread_safe: true,
        }
    }

    /// Builder-style override for [`PoolConfig::thread_safe`].
    pub fn with_thread_safe(mut self, thread_safe: bool) -> Self {
        self.thread_safe = thread_safe;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_contract() {
        assert_eq!(KILOBYTE, 1024);
        assert_eq!(MEGABYTE, 1_048_576);
        assert_eq!(GIGABYTE, 1_073_741_824);
    }

    #[test]
    fn default_config_is_thread_safe() {
        let cfg = PoolConfig::new(1024, 64);
        assert!(cfg.thread_safe);
    }
}
