//! The one-step transition.
//!
//! Order per step:
//! 1. both synaptic traces decay, refractory or not
//! 2. branch on the refractory time the step started with
//!    - refractory: hold V at reset, count down (floored at zero), no spike
//!    - integrating: one explicit Euler step of the membrane ODE, then an
//!      end-of-step threshold check that resets V and restarts the countdown
//!
//! ```text
//! dV/dt = (E_L - V)/tau_m + (I_ex - I_in + I_e)/C_m
//! ```

use crate::state::{NeuronParameters, NeuronState, StepResult, Stimulation};

#[cfg(feature = "std")]
#[inline]
fn expf(x: f32) -> f32 {
    x.exp()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
#[inline]
fn expf(x: f32) -> f32 {
    libm::expf(x)
}

/// Exponential relaxation of a current trace over `dt`.
/// A non-positive `tau` clears the trace instead of dividing by it.
#[inline]
pub fn decay(x: f32, dt: f32, tau: f32) -> f32 {
    if tau <= 0.0 {
        return 0.0;
    }
    x * expf(-dt / tau)
}

/// Right-hand side of the membrane equation.
#[inline]
pub fn membrane_derivative(
    v: f32,
    i_syn: f32,
    params: &NeuronParameters,
    injected_current: f32,
) -> f32 {
    (params.leak_reversal - v) / params.tau_membrane
        + (i_syn + injected_current) / params.membrane_capacitance
}

/// Advance one neuron by `stimulation.dt`.
///
/// Pure: identical arguments give identical results. No input is validated;
/// see [`NeuronParameters::validate`] for an opt-in check.
pub fn step(state: NeuronState, params: &NeuronParameters, stimulation: Stimulation) -> StepResult {
    let dt = stimulation.dt;

    let psc_excitatory = decay(state.psc_excitatory, dt, params.tau_excitatory);
    let psc_inhibitory = decay(state.psc_inhibitory, dt, params.tau_inhibitory);

    if state.refractory_remaining > 0.0 {
        let mut refractory_remaining = state.refractory_remaining - dt;
        if refractory_remaining < 0.0 {
            refractory_remaining = 0.0;
        }
        return StepResult {
            state: NeuronState {
                v: params.reset_potential,
                psc_excitatory,
                psc_inhibitory,
                refractory_remaining,
            },
            spiked: false,
        };
    }

    // Inhibitory trace is a magnitude; it enters the input with a minus sign.
    let i_syn = psc_excitatory - psc_inhibitory;
    let v =
        state.v + dt * membrane_derivative(state.v, i_syn, params, stimulation.injected_current);

    let (v, refractory_remaining, spiked) = if v >= params.threshold {
        (params.reset_potential, params.refractory_duration, true)
    } else {
        (v, 0.0, false)
    };

    StepResult {
        state: NeuronState {
            v,
            psc_excitatory,
            psc_inhibitory,
            refractory_remaining,
        },
        spiked,
    }
}
