//! Acquisition policy tests
//!
//! Drives the acquisition loop against simulated registers with scripted
//! FIFO fill counts and checks reset, poll and drain behaviour.

use rpiqa_driver::chip::fifo::{CHUNK_BYTES, CHUNK_WORDS, FILL_THRESHOLD, OVERFLOW_THRESHOLD};
use rpiqa_driver::{
    acquire, configure, AcquireConfig, Channel, RegisterEvent, RxConfig, SoftwareRegisters,
};
use std::time::Duration;

fn run(regs: &mut SoftwareRegisters, chunks: u16) -> Vec<u8> {
    let mut out = Vec::new();
    acquire(regs, &AcquireConfig::new(chunks), &mut out).expect("acquire");
    out
}

#[test]
fn zero_chunks_resets_once_and_writes_nothing() {
    let mut regs = SoftwareRegisters::new(Channel::One);
    let out = run(&mut regs, 0);

    assert!(out.is_empty());
    assert_eq!(regs.reset_strobes(), 1);
    assert_eq!(regs.drains(), 0);
}

#[test]
fn three_chunks_without_overflow() {
    let mut regs = SoftwareRegisters::new(Channel::Two).with_steady_count(FILL_THRESHOLD + 100);
    let out = run(&mut regs, 3);

    assert_eq!(out.len(), 3 * CHUNK_BYTES);
    assert_eq!(regs.drains(), 3);
    assert_eq!(regs.reset_strobes(), 1);
    assert!(regs.idles().is_empty());
}

#[test]
fn chunks_are_written_in_drain_order() {
    let mut regs = SoftwareRegisters::new(Channel::One);
    let out = run(&mut regs, 2);

    let words: Vec<u64> = out
        .chunks_exact(8)
        .map(|b| u64::from_ne_bytes(b.try_into().unwrap()))
        .collect();
    assert_eq!(words.len(), 2 * CHUNK_WORDS);
    assert!(words.iter().enumerate().all(|(i, w)| *w == i as u64));
}

#[test]
fn overflow_at_top_of_iteration_forces_one_reset() {
    // Per iteration: one overflow-check sample, then fill samples.
    let mut regs = SoftwareRegisters::new(Channel::One).with_fifo_counts([
        0,                  // chunk 0 check
        FILL_THRESHOLD,     // chunk 0 fill
        OVERFLOW_THRESHOLD, // chunk 1 check -> reset
        FILL_THRESHOLD,     // chunk 1 fill
        5000,               // chunk 2 check
        5000,               // chunk 2 fill
        u16::MAX,           // chunk 3 check -> reset
        FILL_THRESHOLD,     // chunk 3 fill
    ]);
    let mut out = Vec::new();
    let report = acquire(&mut regs, &AcquireConfig::new(4), &mut out).unwrap();

    assert_eq!(regs.reset_strobes(), 1 + 2);
    assert_eq!(report.overflow_resets, 2);
    assert_eq!(report.chunks, 4);
    assert_eq!(out.len(), 4 * CHUNK_BYTES);
}

#[test]
fn just_below_overflow_does_not_reset() {
    let mut regs = SoftwareRegisters::new(Channel::One)
        .with_fifo_counts([OVERFLOW_THRESHOLD - 1, OVERFLOW_THRESHOLD - 1]);
    run(&mut regs, 1);
    assert_eq!(regs.reset_strobes(), 1);
}

#[test]
fn overflow_only_checked_at_top_of_iteration() {
    // The fill poll sees an overflowed count; that drains, it does not reset.
    let mut regs = SoftwareRegisters::new(Channel::One).with_fifo_counts([0, 9000]);
    run(&mut regs, 1);
    assert_eq!(regs.reset_strobes(), 1);
    assert_eq!(regs.drains(), 1);
}

#[test]
fn never_drains_below_fill_threshold() {
    let mut regs = SoftwareRegisters::new(Channel::One)
        .with_fifo_counts([0, 0, 1, 2048, FILL_THRESHOLD - 1, FILL_THRESHOLD, 0, 10, FILL_THRESHOLD]);
    let report = acquire(&mut regs, &AcquireConfig::new(2), std::io::sink()).unwrap();

    // The sample immediately preceding every drain must meet the threshold.
    let events = regs.events();
    for (i, e) in events.iter().enumerate() {
        if *e == RegisterEvent::Drain {
            let last_count = events[..i]
                .iter()
                .rev()
                .find_map(|e| match e {
                    RegisterEvent::FifoCount(c) => Some(*c),
                    _ => None,
                })
                .unwrap();
            assert!(last_count >= FILL_THRESHOLD, "drained at count {last_count}");
        }
    }

    // chunk 0: check 0, polls 0,1,2048,4095 -> 4 waits; chunk 1: check 0, polls 10 -> 1 wait
    assert_eq!(report.polls, 5);
    assert_eq!(regs.drains(), 2);
}

#[test]
fn waits_use_poll_interval() {
    let mut regs = SoftwareRegisters::new(Channel::Two).with_fifo_counts([0, 0, 0, 0]);
    let mut out = Vec::new();
    acquire(&mut regs, &AcquireConfig::new(1), &mut out).unwrap();

    let idles = regs.idles();
    assert_eq!(idles.len(), 3);
    assert!(idles.iter().all(|d| *d >= Duration::from_micros(500)));
}

#[test]
fn every_wait_follows_a_short_sample() {
    let mut regs = SoftwareRegisters::new(Channel::One).with_fifo_counts([0, 3, 7, FILL_THRESHOLD]);
    run(&mut regs, 1);

    let events = regs.events();
    for (i, e) in events.iter().enumerate() {
        if let RegisterEvent::Idle(_) = e {
            assert!(matches!(events[i - 1], RegisterEvent::FifoCount(c) if c < FILL_THRESHOLD));
        }
    }
}

#[test]
fn configure_then_acquire() {
    let mut regs = SoftwareRegisters::new(Channel::One);
    configure(&mut regs, &RxConfig::new(1.0e6, 250).unwrap());
    let out = run(&mut regs, 1);

    assert_eq!(regs.freq(), 8_589_935);
    assert_eq!(regs.sync(), 0);
    assert_eq!(regs.rate(), 250);
    assert_eq!(regs.gpio(), 0);
    assert_eq!(out.len(), CHUNK_BYTES);
}
