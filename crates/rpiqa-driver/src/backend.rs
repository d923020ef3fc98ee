//! Register backend abstraction
//!
//! The configuration writer and the acquisition loop only ever touch the
//! receiver through this trait, so the same protocol code drives the mapped
//! hardware and the software simulation used in tests.

use rpiqa_chip::fifo::CHUNK_WORDS;
use rpiqa_chip::Channel;
use std::fmt::Debug;
use std::time::Duration;

/// One drained FIFO chunk, as 64-bit words
pub type FifoChunk = [u64; CHUNK_WORDS];

/// Width-exact access to one channel's receiver registers
///
/// Every method maps onto a single hardware access of the register's native
/// width. Register access cannot fail once a backend exists.
pub trait RxRegisters: Debug {
    /// Channel this backend drives
    fn channel(&self) -> Channel;

    /// Backend type for logging
    fn backend_type(&self) -> BackendType;

    /// Read the 8-bit `reset` register
    fn read_reset(&mut self) -> u8;

    /// Write the 8-bit `reset` register
    fn write_reset(&mut self, value: u8);

    /// Write the 8-bit `gpio` register
    fn write_gpio(&mut self, value: u8);

    /// Write the 32-bit NCO phase increment
    fn write_freq(&mut self, word: u32);

    /// Write the 8-bit `sync` register
    fn write_sync(&mut self, value: u8);

    /// Write the 16-bit decimation divider
    fn write_rate(&mut self, rate: u16);

    /// Sample the 16-bit FIFO fill counter
    fn fifo_count(&mut self) -> u16;

    /// Copy the head of the FIFO window into `chunk`
    fn drain_fifo(&mut self, chunk: &mut FifoChunk);

    /// Wait between fill polls
    ///
    /// There is no interrupt or blocking read on the FIFO, so waiting is a
    /// plain sleep.
    fn idle(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Physical registers mapped through the memory device
    Hardware,

    /// Simulated registers, no hardware required
    Software,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hardware => write!(f, "Hardware"),
            Self::Software => write!(f, "Software (simulated)"),
        }
    }
}
