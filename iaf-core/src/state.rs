//! Records that flow through the kernel: caller-owned state, model constants,
//! per-step stimulation and the step output.

use crate::error::{KernelError, KernelResult};

/// Dynamic state of one neuron. Owned and persisted by the caller between steps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NeuronState {
    /// Membrane potential (mV)
    pub v: f32,
    /// Excitatory synaptic current trace (pA)
    pub psc_excitatory: f32,
    /// Inhibitory synaptic current trace (pA), stored as a positive magnitude
    pub psc_inhibitory: f32,
    /// Remaining absolute refractory time (ms), never negative
    pub refractory_remaining: f32,
}

/// The two logical states of the neuron, decided at step entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Integrating,
    Refractory,
}

impl NeuronState {
    /// Resting state: membrane at the leak reversal potential, no synaptic current.
    pub fn at_rest(params: &NeuronParameters) -> Self {
        Self {
            v: params.leak_reversal,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        if self.refractory_remaining > 0.0 {
            Phase::Refractory
        } else {
            Phase::Integrating
        }
    }
}

/// Model constants. Logically fixed over a run but passed on every call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeuronParameters {
    /// E_L (mV)
    pub leak_reversal: f32,
    /// V_th (mV)
    pub threshold: f32,
    /// V_reset (mV)
    pub reset_potential: f32,
    /// tau_m (ms)
    pub tau_membrane: f32,
    /// tau_syn_ex (ms); non-positive means the trace is cleared every step
    pub tau_excitatory: f32,
    /// tau_syn_in (ms); non-positive means the trace is cleared every step
    pub tau_inhibitory: f32,
    /// C_m (pF)
    pub membrane_capacitance: f32,
    /// t_ref (ms)
    pub refractory_duration: f32,
}

impl Default for NeuronParameters {
    /// Defaults of the reference `iaf_psc_exp` model.
    fn default() -> Self {
        Self {
            leak_reversal: -65.0,
            threshold: -50.0,
            reset_potential: -65.0,
            tau_membrane: 10.0,
            tau_excitatory: 2.0,
            tau_inhibitory: 2.0,
            membrane_capacitance: 250.0,
            refractory_duration: 2.0,
        }
    }
}

impl NeuronParameters {
    /// Opt-in sanity check for callers that want one.
    ///
    /// `step` does not call this: malformed values still flow straight into the
    /// arithmetic there. Non-positive synaptic time constants are accepted
    /// because the kernel defines them as "decay to zero".
    pub fn validate(&self, dt: f32) -> KernelResult<()> {
        let fields = [
            (self.leak_reversal, "leak_reversal"),
            (self.threshold, "threshold"),
            (self.reset_potential, "reset_potential"),
            (self.tau_membrane, "tau_membrane"),
            (self.tau_excitatory, "tau_excitatory"),
            (self.tau_inhibitory, "tau_inhibitory"),
            (self.membrane_capacitance, "membrane_capacitance"),
            (self.refractory_duration, "refractory_duration"),
            (dt, "dt"),
        ];
        for (value, name) in fields {
            if !value.is_finite() {
                return Err(KernelError::NonFinite(name));
            }
        }
        if self.tau_membrane <= 0.0 {
            return Err(KernelError::InvalidParameter("tau_membrane must be positive"));
        }
        if self.membrane_capacitance <= 0.0 {
            return Err(KernelError::InvalidParameter("membrane_capacitance must be positive"));
        }
        if self.refractory_duration < 0.0 {
            return Err(KernelError::InvalidParameter("refractory_duration must not be negative"));
        }
        if dt <= 0.0 {
            return Err(KernelError::InvalidParameter("dt must be positive"));
        }
        Ok(())
    }
}

/// Per-step inputs: external current and step size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stimulation {
    /// I_e (pA)
    pub injected_current: f32,
    /// Step size (ms)
    pub dt: f32,
}

impl Stimulation {
    pub fn new(injected_current: f32, dt: f32) -> Self {
        Self { injected_current, dt }
    }
}

impl Default for Stimulation {
    fn default() -> Self {
        Self::new(0.0, 0.1)
    }
}

/// Output of one step: the state `dt` later and whether the neuron fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    pub state: NeuronState,
    pub spiked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_rest_sits_on_leak_reversal() {
        let p = NeuronParameters { leak_reversal: -70.0, ..NeuronParameters::default() };
        let s = NeuronState::at_rest(&p);
        assert_eq!(s.v, -70.0);
        assert_eq!(s.psc_excitatory, 0.0);
        assert_eq!(s.psc_inhibitory, 0.0);
        assert_eq!(s.phase(), Phase::Integrating);
    }

    #[test]
    fn phase_follows_refractory_time() {
        let mut s = NeuronState::default();
        s.refractory_remaining = 0.05;
        assert_eq!(s.phase(), Phase::Refractory);
        s.refractory_remaining = 0.0;
        assert_eq!(s.phase(), Phase::Integrating);
    }

    #[test]
    fn defaults_validate() {
        assert_eq!(NeuronParameters::default().validate(0.1), Ok(()));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let base = NeuronParameters::default();
        assert!(matches!(base.validate(0.0), Err(KernelError::InvalidParameter(_))));
        assert!(matches!(base.validate(f32::NAN), Err(KernelError::NonFinite("dt"))));

        let p = NeuronParameters { membrane_capacitance: -1.0, ..base };
        assert!(matches!(p.validate(0.1), Err(KernelError::InvalidParameter(_))));

        let p = NeuronParameters { refractory_duration: -0.5, ..base };
        assert!(matches!(p.validate(0.1), Err(KernelError::InvalidParameter(_))));

        let p = NeuronParameters { threshold: f32::INFINITY, ..base };
        assert_eq!(p.validate(0.1), Err(KernelError::NonFinite("threshold")));
    }

    #[test]
    fn validate_accepts_instant_synaptic_decay() {
        let p = NeuronParameters {
            tau_excitatory: 0.0,
            tau_inhibitory: -1.0,
            ..NeuronParameters::default()
        };
        assert_eq!(p.validate(0.1), Ok(()));
    }
}
