//! Caller-side owner of one neuron's state and parameters.

use crate::kernel::step;
use crate::state::{NeuronParameters, NeuronState, Phase, Stimulation};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neuron {
    pub state: NeuronState,
    pub params: NeuronParameters,
}

impl Neuron {
    /// Start at rest with the given parameters.
    pub fn new(params: NeuronParameters) -> Self {
        Self {
            state: NeuronState::at_rest(&params),
            params,
        }
    }

    pub fn with_state(params: NeuronParameters, state: NeuronState) -> Self {
        Self { state, params }
    }

    /// Advance one step, replacing the stored state. Returns true if the neuron fired.
    pub fn advance(&mut self, stimulation: Stimulation) -> bool {
        let out = step(self.state, &self.params, stimulation);
        self.state = out.state;
        out.spiked
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }
}
