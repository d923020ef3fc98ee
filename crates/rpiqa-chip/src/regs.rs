//! Register offsets inside the configuration and status windows.
//!
//! Every register has a fixed hardware width. Accesses must use exactly that
//! width; a wider store into `reset` would also clobber `gpio`.
//!
//! ```text
//! Config window                     Status window
//! ──────  ─────  ─────────────────  ──────  ─────  ──────────────
//! 0x00    u8     reset (bit 0)      0x00    u16    fifo_count
//! 0x02    u8     gpio
//! 0x04    u32    freq (NCO word)
//! 0x08    u8     sync
//! 0x0A    u16    rate (decimation)
//! ```

// ── Configuration window ─────────────────────────────────────────────────────

/// Receive pipeline reset. Bit 0 low holds the FIFO in reset.
pub const RESET: usize = 0x00;

/// Auxiliary output control, cleared when acquisition starts.
pub const GPIO: usize = 0x02;

/// NCO phase increment, one little-endian 32-bit word.
pub const FREQ: usize = 0x04;

/// Synchronisation control; 0 runs the NCO free.
pub const SYNC: usize = 0x08;

/// Decimation divider, 16 bits.
pub const RATE: usize = 0x0A;

/// Bytes of the configuration window the protocol touches.
pub const CONFIG_SPAN: usize = RATE + 2;

// ── Status window ────────────────────────────────────────────────────────────

/// Samples currently resident in the FIFO.
pub const FIFO_COUNT: usize = 0x00;

/// Bytes of the status window the protocol touches.
pub const STATUS_SPAN: usize = FIFO_COUNT + 2;

// ── Bit definitions ──────────────────────────────────────────────────────────

/// Bits of the `reset` register.
pub mod reset {
    /// Receive pipeline enable; strobed low then high to restart FIFO fill.
    pub const STROBE: u8 = 1 << 0;
}

/// Values of the `sync` register.
pub mod sync {
    /// Free-running NCO.
    pub const FREE_RUN: u8 = 0;
}
