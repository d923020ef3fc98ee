//! FIFO window geometry and occupancy thresholds.
//!
//! The thresholds are in units of the hardware `fifo_count` register. Its unit
//! (words, samples or bytes) is undocumented, so they are kept at the values
//! the receiver was validated with rather than derived from [`CHUNK_BYTES`].

/// Pages mapped for the FIFO window.
pub const WINDOW_PAGES: usize = 8;

/// Width of one FIFO word in bytes.
pub const WORD_BYTES: usize = 8;

/// Bytes copied out of the FIFO per drain.
pub const CHUNK_BYTES: usize = 16_384;

/// 64-bit words copied out of the FIFO per drain.
pub const CHUNK_WORDS: usize = CHUNK_BYTES / WORD_BYTES;

/// Minimum `fifo_count` before a chunk may be drained.
pub const FILL_THRESHOLD: u16 = 4096;

/// `fifo_count` at or above which buffered data is discarded by a reset.
pub const OVERFLOW_THRESHOLD: u16 = 8192;

/// Sleep between fill polls, in microseconds.
pub const DEFAULT_POLL_INTERVAL_US: u64 = 500;

/// Whether a sampled count allows a drain.
#[must_use]
pub const fn is_filled(count: u16) -> bool {
    count >= FILL_THRESHOLD
}

/// Whether a sampled count forces a pipeline reset.
#[must_use]
pub const fn is_overflowed(count: u16) -> bool {
    count >= OVERFLOW_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_geometry() {
        assert_eq!(CHUNK_WORDS, 2048);
        assert!(CHUNK_BYTES <= WINDOW_PAGES * 4096);
    }

    #[test]
    fn threshold_edges() {
        assert!(!is_filled(4095));
        assert!(is_filled(4096));
        assert!(!is_overflowed(8191));
        assert!(is_overflowed(8192));
        assert!(is_overflowed(u16::MAX));
    }
}
