//! On-board tests
//!
//! Require root on a Red Pitaya running the SDR transceiver image.

use rpiqa_driver::{acquire, configure, AcquireConfig, Channel, RegisterMap, RxConfig, RxRegisters};

#[test]
#[ignore] // Requires hardware
fn test_both_channels_map() {
    for channel in Channel::ALL {
        let mut regs = RegisterMap::open(channel, "/dev/mem").expect("map channel");
        println!("Channel {channel}: fifo_count={}", regs.fifo_count());
    }
}

#[test]
#[ignore] // Requires hardware
fn test_configure_and_drain() {
    let mut regs = RegisterMap::open(Channel::One, "/dev/mem").expect("map channel");
    configure(&mut regs, &RxConfig::new(1.0e6, 250).unwrap());

    let mut out = Vec::new();
    let report = acquire(&mut regs, &AcquireConfig::new(4), &mut out).expect("acquire");
    assert_eq!(out.len(), 4 * 16_384);
    println!(
        "4 chunks in {:.3}s, {} overflow resets, {} polls",
        report.elapsed.as_secs_f64(),
        report.overflow_resets,
        report.polls
    );
}
