//! Register-mapped control and FIFO acquisition for the Red Pitaya SDR
//! receiver.
//!
//! Runs on the board's ARM core and talks to the programmable logic through
//! `/dev/mem`. No kernel module, no interrupts: configuration is a handful of
//! width-exact register stores and acquisition is a polled FIFO drain.
//!
//! # Layers
//!
//! ```text
//! configure() / Acquisition      protocol, generic over RxRegisters
//!          │
//!   RxRegisters (trait)
//!     ├── RegisterMap             three MmioRegion windows over /dev/mem
//!     └── SoftwareRegisters       simulated, scripted fill counter
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use rpiqa_driver::{acquire_to_file, configure, AcquireConfig, Channel, RegisterMap, RxConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut regs = RegisterMap::open(Channel::One, "/dev/mem")?;
//!
//! configure(&mut regs, &RxConfig::new(1.0e6, 250)?);
//!
//! let report = acquire_to_file(&mut regs, &AcquireConfig::new(64), "/mnt/RPIQA/output.bin")?;
//! println!("{} bytes", report.bytes_written);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod acquire;
mod backend;
pub mod backends;
mod capture;
pub mod config;
mod configure;
mod error;
pub mod mmio;
mod register_map;
pub mod setup;

pub use acquire::{
    acquire, acquire_to_file, create_output, strobe_reset, AcquireConfig, AcquireReport,
    AcquireState, Acquisition,
};
pub use backend::{BackendType, FifoChunk, RxRegisters};
pub use backends::{RegisterEvent, SoftwareRegisters};
pub use capture::{decode_capture, Capture, CaptureSummary, IqSamples};
pub use config::DeviceConfig;
pub use configure::{configure, RxConfig};
pub use error::{Result, RpiqaError};
pub use register_map::RegisterMap;
pub use setup::{BoardSetup, SetupConfig};

/// Silicon model (re-exported from rpiqa-chip).
pub use rpiqa_chip as chip;
pub use rpiqa_chip::{Channel, SampleRate};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        AcquireConfig, AcquireReport, Channel, DeviceConfig, RegisterMap, Result, RpiqaError,
        RxConfig, RxRegisters, SampleRate, SoftwareRegisters,
    };
}
