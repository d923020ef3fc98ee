//! Register backend implementations
//!
//! - **Hardware**: [`crate::RegisterMap`], physical windows mapped through `/dev/mem`
//! - **Software**: [`SoftwareRegisters`], simulated registers with a scripted
//!   FIFO fill counter, for CI and for exercising the acquisition policy
//!   without a board

pub mod software;

pub use software::{RegisterEvent, SoftwareRegisters};
