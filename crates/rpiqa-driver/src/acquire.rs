//! Acquisition loop
//!
//! Drains fixed-size chunks out of a channel's FIFO into a byte stream. The
//! FIFO has no interrupt and no blocking read, so occupancy is polled:
//!
//! ```text
//! INIT ──clear gpio, strobe reset──▶ ARMED
//!   ┌──────────────────────── × chunks ─────────────────────────┐
//!   │ count ≥ OVERFLOW? ──yes──▶ OVERFLOW_RESET (strobe reset)  │
//!   │        │ no                        │                      │
//!   │        ▼                           ▼                      │
//!   │ FILLING: while count < FILL { idle(poll_interval) }       │
//!   │        ▼                                                  │
//!   │ DRAIN: copy CHUNK_BYTES, append to output                 │
//!   └───────────────────────────────────────────────────────────┘
//!                           ▼
//!                        CLOSED
//! ```
//!
//! The overflow check samples the counter once at the top of each iteration.
//! Both thresholds are in the counter's own (undocumented) unit.

use crate::backend::{FifoChunk, RxRegisters};
use crate::error::{RpiqaError, Result};
use rpiqa_chip::fifo::{self, CHUNK_BYTES, CHUNK_WORDS, DEFAULT_POLL_INTERVAL_US};
use rpiqa_chip::regs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Acquisition run parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireConfig {
    /// Number of chunks to drain
    pub chunks: u16,

    /// Sleep between fill polls
    pub poll_interval: Duration,
}

impl AcquireConfig {
    /// Drain `chunks` chunks with the default 500 µs poll interval
    pub const fn new(chunks: u16) -> Self {
        Self {
            chunks,
            poll_interval: Duration::from_micros(DEFAULT_POLL_INTERVAL_US),
        }
    }

    /// Replace the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Bytes a complete run writes
    pub const fn expected_bytes(&self) -> u64 {
        self.chunks as u64 * CHUNK_BYTES as u64
    }
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Acquisition phase, for tracing and inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireState {
    /// Nothing touched yet
    Init,
    /// gpio cleared and pipeline reset
    Armed,
    /// Waiting for the fill threshold
    Filling,
    /// Discarding an overflowed FIFO
    OverflowReset,
    /// Copying a chunk out
    Drain,
    /// All chunks written and the output flushed
    Closed,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireReport {
    /// Chunks drained
    pub chunks: u16,
    /// Bytes appended to the output
    pub bytes_written: u64,
    /// Resets forced by the overflow threshold (excludes the initial one)
    pub overflow_resets: u32,
    /// Fill-threshold polls that had to wait
    pub polls: u64,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// Clear then set the reset strobe bit, preserving the other bits
pub fn strobe_reset<R: RxRegisters + ?Sized>(regs: &mut R) {
    let value = regs.read_reset();
    regs.write_reset(value & !regs::reset::STROBE);
    let value = regs.read_reset();
    regs.write_reset(value | regs::reset::STROBE);
    debug!("Reset strobed on channel {}", regs.channel());
}

/// One acquisition run over a register backend
#[derive(Debug)]
pub struct Acquisition<'a, R: RxRegisters + ?Sized> {
    regs: &'a mut R,
    config: AcquireConfig,
    state: AcquireState,
    chunk: Box<FifoChunk>,
}

impl<'a, R: RxRegisters + ?Sized> Acquisition<'a, R> {
    /// Prepare a run; no register is touched until [`Self::run`]
    pub fn new(regs: &'a mut R, config: AcquireConfig) -> Self {
        Self {
            regs,
            config,
            state: AcquireState::Init,
            chunk: Box::new([0u64; CHUNK_WORDS]),
        }
    }

    /// Current phase
    pub const fn state(&self) -> AcquireState {
        self.state
    }

    fn enter(&mut self, state: AcquireState) {
        trace!("{:?} -> {state:?}", self.state);
        self.state = state;
    }

    /// Arm the channel and drain `config.chunks` chunks into `out`
    ///
    /// `out` is flushed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`RpiqaError::Io`] if writing to `out` fails. Register access
    /// itself cannot fail.
    pub fn run<W: Write>(&mut self, mut out: W) -> Result<AcquireReport> {
        let start = Instant::now();
        let mut overflow_resets = 0u32;
        let mut polls = 0u64;
        let mut bytes_written = 0u64;

        info!(
            "Acquiring {} chunks ({} bytes) from channel {} ({})",
            self.config.chunks,
            self.config.expected_bytes(),
            self.regs.channel(),
            self.regs.backend_type()
        );

        self.regs.write_gpio(0);
        strobe_reset(&mut *self.regs);
        self.enter(AcquireState::Armed);

        for index in 0..self.config.chunks {
            let count = self.regs.fifo_count();
            if fifo::is_overflowed(count) {
                self.enter(AcquireState::OverflowReset);
                warn!("FIFO overflow before chunk {index} (count={count}), resetting");
                strobe_reset(&mut *self.regs);
                overflow_resets += 1;
            }

            self.enter(AcquireState::Filling);
            loop {
                let count = self.regs.fifo_count();
                if fifo::is_filled(count) {
                    break;
                }
                trace!("Chunk {index}: fifo_count={count}, waiting");
                polls += 1;
                self.regs.idle(self.config.poll_interval);
            }

            self.enter(AcquireState::Drain);
            self.regs.drain_fifo(&mut self.chunk);
            out.write_all(bytemuck::cast_slice::<u64, u8>(&self.chunk[..]))?;
            bytes_written += CHUNK_BYTES as u64;
            trace!("Chunk {index} written");
        }

        out.flush()?;
        self.enter(AcquireState::Closed);

        let report = AcquireReport {
            chunks: self.config.chunks,
            bytes_written,
            overflow_resets,
            polls,
            elapsed: start.elapsed(),
        };

        info!(
            "Acquired {} chunks ({} bytes) in {:.3}s, {} overflow resets, {} fill polls",
            report.chunks,
            report.bytes_written,
            report.elapsed.as_secs_f64(),
            report.overflow_resets,
            report.polls
        );

        Ok(report)
    }
}

/// Run one acquisition into `out`
///
/// # Errors
///
/// See [`Acquisition::run`].
pub fn acquire<R: RxRegisters + ?Sized, W: Write>(
    regs: &mut R,
    config: &AcquireConfig,
    out: W,
) -> Result<AcquireReport> {
    Acquisition::new(regs, *config).run(out)
}

/// Create (truncating) the capture file
///
/// Called before any register is touched so an unwritable destination fails
/// the run up front.
///
/// # Errors
///
/// Returns [`RpiqaError::Output`] if the file cannot be created.
pub fn create_output(path: impl AsRef<Path>) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| RpiqaError::output(path, e))?;
    debug!("Opened output {}", path.display());
    Ok(BufWriter::with_capacity(CHUNK_BYTES * 4, file))
}

/// Create `path`, then run one acquisition into it
///
/// # Errors
///
/// Returns [`RpiqaError::Output`] if the file cannot be created or written;
/// no register is touched in the first case.
pub fn acquire_to_file<R: RxRegisters + ?Sized>(
    regs: &mut R,
    config: &AcquireConfig,
    path: impl AsRef<Path>,
) -> Result<AcquireReport> {
    let path = path.as_ref();
    let out = create_output(path)?;
    acquire(regs, config, out).map_err(|e| match e {
        RpiqaError::Io { source } => RpiqaError::output(path, source),
        other => other,
    })
}
