#![cfg_attr(not(feature = "std"), no_std)]
//! iaf-hw: accelerator-side plumbing around iaf-core (keeps the kernel untouched)
//!
//! Additions:
//! - Control-bundle register map and word/float conversions
//! - `RegisterBus` trait plus `SoftKernel`, an in-process model of the accelerator
//! - `KernelDriver`: start/done handshake with a poll budget
//! - `StepBackend` so callers can swap the direct call for the register path
//! - Pulse stimulus protocol and a closed-loop `Session` that owns the neuron state

pub mod error;
pub mod regmap;
pub mod bus;
pub mod soft;
pub mod driver;
pub mod backend;
pub mod stimulus;
pub mod session;

// Re-exports
pub use error::{DeviceError, DeviceResult};
pub use bus::RegisterBus;
pub use soft::SoftKernel;
pub use driver::{KernelDriver, PollBudget};
pub use backend::{SoftwareBackend, StepBackend};
pub use stimulus::{Pulse, PulseTrain, MAX_PULSES, REFERENCE_BASE_CURRENT, REFERENCE_PULSES};
pub use session::{Session, TraceRow};
