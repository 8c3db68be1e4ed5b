#![cfg_attr(not(feature = "std"), no_std)]
//! iaf-core: one time step of a current-based leaky integrate-and-fire neuron
//! with exponentially decaying post-synaptic currents (IAF-PSC-EXP).
//!
//! The kernel is a pure function over explicitly passed state. It performs no
//! I/O, keeps no globals and never allocates, so it can sit in a tight host
//! loop or model a fixed-latency pipeline stage.

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("iaf-core needs either the `std` or the `libm` feature for expf");

pub mod error;
pub mod state;
pub mod kernel;
pub mod neuron;

// Re-exports
pub use error::{KernelError, KernelResult};
pub use state::{NeuronParameters, NeuronState, Phase, Stimulation, StepResult};
pub use kernel::{decay, membrane_derivative, step};
pub use neuron::Neuron;
