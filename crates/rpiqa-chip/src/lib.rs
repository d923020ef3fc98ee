//! Silicon model for the Red Pitaya SDR receiver FPGA image.
//!
//! This crate has **no dependencies** and **no hardware access** — it is a
//! pure model of the programmable logic as seen from the ARM core: channel
//! base addresses, register offsets, FIFO geometry, NCO arithmetic and the
//! decimation presets the receiver was validated with.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`channel`] | Channel selector and its three physical windows |
//! | [`regs`] | Configuration / status window register offsets and bits |
//! | [`fifo`] | FIFO window geometry, fill and overflow thresholds |
//! | [`nco`] | Phase-increment computation (125 MHz clock, 30-bit accumulator) |
//! | [`rate`] | Decimation presets and capture duration planning |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod fifo;
pub mod nco;
pub mod rate;
pub mod regs;

pub use channel::{Channel, ChannelWindows, InvalidChannel};
pub use rate::SampleRate;
