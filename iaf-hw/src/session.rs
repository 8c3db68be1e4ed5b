//! Closed-loop driver of a single neuron: the caller that owns the state.
//!
//! Each `advance()` looks up I_e for the current step, evaluates one kernel
//! step on the backend and feeds the output state back as the next input.

use iaf_core::{NeuronParameters, NeuronState, Stimulation};

use crate::backend::StepBackend;
use crate::error::DeviceResult;
use crate::stimulus::PulseTrain;

/// One sample of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceRow {
    pub step: u64,
    /// Time at the end of the step (ms)
    pub time_ms: f32,
    /// I_e applied during the step (pA)
    pub current: f32,
    /// Membrane potential after the step (mV)
    pub v: f32,
    pub spiked: bool,
}

pub struct Session<K: StepBackend> {
    backend: K,
    params: NeuronParameters,
    dt: f32,
    stimulus: PulseTrain,
    state: NeuronState,
    step: u64,
    spikes: u64,
}

impl<K: StepBackend> Session<K> {
    /// Validates `params` and `dt`, then starts the neuron at rest.
    pub fn new(
        backend: K,
        params: NeuronParameters,
        dt: f32,
        stimulus: PulseTrain,
    ) -> DeviceResult<Self> {
        params.validate(dt)?;
        log::debug!("session on {} backend, dt = {} ms", backend.name(), dt);
        Ok(Self {
            backend,
            params,
            dt,
            stimulus,
            state: NeuronState::at_rest(&params),
            step: 0,
            spikes: 0,
        })
    }

    pub fn with_initial_state(mut self, state: NeuronState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> NeuronState {
        self.state
    }

    pub fn params(&self) -> &NeuronParameters {
        &self.params
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn stimulus(&self) -> &PulseTrain {
        &self.stimulus
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    /// Steps taken so far.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn spike_count(&self) -> u64 {
        self.spikes
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.step as f32 * self.dt
    }

    /// Advance one step and report the resulting sample.
    pub fn advance(&mut self) -> DeviceResult<TraceRow> {
        let current = self.stimulus.current_at(self.step);
        let out = self
            .backend
            .step(self.state, &self.params, Stimulation::new(current, self.dt))?;

        let row = TraceRow {
            step: self.step,
            time_ms: (self.step + 1) as f32 * self.dt,
            current,
            v: out.state.v,
            spiked: out.spiked,
        };
        if out.spiked {
            self.spikes += 1;
            log::debug!("spike #{} at step {} (t = {:.1} ms)", self.spikes, row.step, row.time_ms);
        }
        self.state = out.state;
        self.step = self.step.saturating_add(1);
        Ok(row)
    }

    /// Advance `steps` times, handing each sample to `sink`.
    pub fn run<F: FnMut(&TraceRow)>(&mut self, steps: u64, mut sink: F) -> DeviceResult<()> {
        for _ in 0..steps {
            let row = self.advance()?;
            sink(&row);
        }
        Ok(())
    }

    #[cfg(feature = "std")]
    pub fn collect(&mut self, steps: u64) -> DeviceResult<std::vec::Vec<TraceRow>> {
        // Grows as rows arrive; `steps` is caller input and may be huge
        let mut rows = std::vec::Vec::new();
        self.run(steps, |row| rows.push(*row))?;
        Ok(rows)
    }
}
