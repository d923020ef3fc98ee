//! Configure and drain a simulated channel.
//!
//! Shows the acquisition loop's reset and poll behaviour without a board:
//! the FIFO starts empty, fills, then overflows before the third read.
//!
//! Usage:
//!   RUST_LOG=debug cargo run --example simulated_capture

use rpiqa_driver::chip::fifo::{FILL_THRESHOLD, OVERFLOW_THRESHOLD};
use rpiqa_driver::{acquire, configure, AcquireConfig, Capture, Channel, RxConfig, SampleRate, SoftwareRegisters};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut regs = SoftwareRegisters::new(Channel::One).with_fifo_counts([
        0,
        120,
        2900,
        FILL_THRESHOLD,
        FILL_THRESHOLD + 10,
        FILL_THRESHOLD + 10,
        OVERFLOW_THRESHOLD + 3,
        FILL_THRESHOLD,
    ]);

    configure(&mut regs, &RxConfig::with_preset(1.0e6, SampleRate::Ksps250)?);

    let mut out = Vec::new();
    let report = acquire(&mut regs, &AcquireConfig::new(3), &mut out)?;

    println!("Chunks          : {}", report.chunks);
    println!("Bytes           : {}", report.bytes_written);
    println!("Overflow resets : {}", report.overflow_resets);
    println!("Fill polls      : {}", report.polls);
    println!("Reset strobes   : {}", regs.reset_strobes());

    let capture = Capture::from_bytes(out);
    println!("Samples         : {}", capture.samples()?.len());

    Ok(())
}
