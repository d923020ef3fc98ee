// SPDX-License-Identifier: AGPL-3.0-only

//! Software (simulated) receiver backend
//!
//! Holds the configuration registers in plain fields and records every
//! access in an event log. The FIFO fill counter follows a script: each
//! [`RxRegisters::fifo_count`] call consumes the next scripted value, and once
//! the script is exhausted the counter stays at its steady value. Reset
//! strobes do not alter the script, so a test fully controls what the
//! acquisition loop observes.
//!
//! Drained chunks contain an incrementing word counter, so the output of a
//! run identifies exactly which drains produced it.
//!
//! `idle` records the requested interval instead of sleeping.

use crate::backend::{BackendType, FifoChunk, RxRegisters};
use rpiqa_chip::fifo::FILL_THRESHOLD;
use rpiqa_chip::{regs, Channel};
use std::collections::VecDeque;
use std::time::Duration;

/// One register access observed by [`SoftwareRegisters`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterEvent {
    /// `reset` written
    Reset(u8),
    /// `gpio` written
    Gpio(u8),
    /// `freq` written
    Freq(u32),
    /// `sync` written
    Sync(u8),
    /// `rate` written
    Rate(u16),
    /// `fifo_count` sampled, with the value returned
    FifoCount(u16),
    /// One chunk copied out of the FIFO window
    Drain,
    /// Poll wait requested
    Idle(Duration),
}

/// Simulated receiver registers
#[derive(Debug)]
pub struct SoftwareRegisters {
    channel: Channel,
    reset: u8,
    gpio: u8,
    freq: u32,
    sync: u8,
    rate: u16,
    script: VecDeque<u16>,
    steady_count: u16,
    next_word: u64,
    events: Vec<RegisterEvent>,
}

impl SoftwareRegisters {
    /// Backend whose FIFO always reports exactly the fill threshold
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            // Power-on state of the board image: pipeline enabled, gpio set.
            reset: regs::reset::STROBE,
            gpio: 0xff,
            freq: 0,
            sync: 1,
            rate: 0,
            script: VecDeque::new(),
            steady_count: FILL_THRESHOLD,
            next_word: 0,
            events: Vec::new(),
        }
    }

    /// Queue `counts` to be returned by successive `fifo_count` reads
    #[must_use]
    pub fn with_fifo_counts(mut self, counts: impl IntoIterator<Item = u16>) -> Self {
        self.script.extend(counts);
        self
    }

    /// Value reported once the script is exhausted
    #[must_use]
    pub fn with_steady_count(mut self, count: u16) -> Self {
        self.steady_count = count;
        self
    }

    /// Every access so far, in order
    pub fn events(&self) -> &[RegisterEvent] {
        &self.events
    }

    /// Forget recorded events
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Completed reset strobes: a write clearing the strobe bit followed by
    /// one setting it
    pub fn reset_strobes(&self) -> usize {
        let resets: Vec<u8> = self
            .events
            .iter()
            .filter_map(|e| match e {
                RegisterEvent::Reset(v) => Some(*v),
                _ => None,
            })
            .collect();
        resets
            .windows(2)
            .filter(|w| w[0] & regs::reset::STROBE == 0 && w[1] & regs::reset::STROBE != 0)
            .count()
    }

    /// Chunks drained so far
    pub fn drains(&self) -> usize {
        self.count(|e| matches!(e, RegisterEvent::Drain))
    }

    /// Poll waits requested so far
    pub fn idles(&self) -> Vec<Duration> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RegisterEvent::Idle(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Whether any register was written
    pub fn has_writes(&self) -> bool {
        self.events.iter().any(|e| {
            matches!(
                e,
                RegisterEvent::Reset(_)
                    | RegisterEvent::Gpio(_)
                    | RegisterEvent::Freq(_)
                    | RegisterEvent::Sync(_)
                    | RegisterEvent::Rate(_)
            )
        })
    }

    /// Current `reset` register
    pub const fn reset(&self) -> u8 {
        self.reset
    }

    /// Current `gpio` register
    pub const fn gpio(&self) -> u8 {
        self.gpio
    }

    /// Current `freq` register
    pub const fn freq(&self) -> u32 {
        self.freq
    }

    /// Current `sync` register
    pub const fn sync(&self) -> u8 {
        self.sync
    }

    /// Current `rate` register
    pub const fn rate(&self) -> u16 {
        self.rate
    }

    fn count(&self, pred: impl Fn(&RegisterEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }
}

impl RxRegisters for SoftwareRegisters {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Software
    }

    fn read_reset(&mut self) -> u8 {
        self.reset
    }

    fn write_reset(&mut self, value: u8) {
        self.reset = value;
        self.events.push(RegisterEvent::Reset(value));
    }

    fn write_gpio(&mut self, value: u8) {
        self.gpio = value;
        self.events.push(RegisterEvent::Gpio(value));
    }

    fn write_freq(&mut self, word: u32) {
        self.freq = word;
        self.events.push(RegisterEvent::Freq(word));
    }

    fn write_sync(&mut self, value: u8) {
        self.sync = value;
        self.events.push(RegisterEvent::Sync(value));
    }

    fn write_rate(&mut self, rate: u16) {
        self.rate = rate;
        self.events.push(RegisterEvent::Rate(rate));
    }

    fn fifo_count(&mut self) -> u16 {
        let count = self.script.pop_front().unwrap_or(self.steady_count);
        self.events.push(RegisterEvent::FifoCount(count));
        count
    }

    fn drain_fifo(&mut self, chunk: &mut FifoChunk) {
        for word in chunk.iter_mut() {
            *word = self.next_word;
            self.next_word += 1;
        }
        self.events.push(RegisterEvent::Drain);
    }

    fn idle(&mut self, interval: Duration) {
        self.events.push(RegisterEvent::Idle(interval));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpiqa_chip::fifo::CHUNK_WORDS;

    #[test]
    fn script_then_steady() {
        let mut regs = SoftwareRegisters::new(Channel::One)
            .with_fifo_counts([1, 2])
            .with_steady_count(9);
        assert_eq!(regs.fifo_count(), 1);
        assert_eq!(regs.fifo_count(), 2);
        assert_eq!(regs.fifo_count(), 9);
        assert_eq!(regs.fifo_count(), 9);
    }

    #[test]
    fn strobe_counting() {
        let mut regs = SoftwareRegisters::new(Channel::Two);
        regs.write_reset(0);
        regs.write_reset(1);
        regs.write_reset(1);
        regs.write_reset(0);
        regs.write_reset(1);
        assert_eq!(regs.reset_strobes(), 2);
    }

    #[test]
    fn drained_words_continue_across_chunks() {
        let mut regs = SoftwareRegisters::new(Channel::One);
        let mut chunk = [0u64; CHUNK_WORDS];
        regs.drain_fifo(&mut chunk);
        assert_eq!(chunk[0], 0);
        assert_eq!(chunk[CHUNK_WORDS - 1], CHUNK_WORDS as u64 - 1);
        regs.drain_fifo(&mut chunk);
        assert_eq!(chunk[0], CHUNK_WORDS as u64);
        assert_eq!(regs.drains(), 2);
    }

    #[test]
    fn reads_are_not_writes() {
        let mut regs = SoftwareRegisters::new(Channel::One);
        let _ = regs.fifo_count();
        let _ = regs.read_reset();
        assert!(!regs.has_writes());
        regs.write_gpio(0);
        assert!(regs.has_writes());
    }
}
