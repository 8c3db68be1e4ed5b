//! One step function, two ways to get it evaluated.

use iaf_core::{step, NeuronParameters, NeuronState, StepResult, Stimulation};

use crate::bus::RegisterBus;
use crate::driver::KernelDriver;
use crate::error::DeviceResult;

/// Common interface for anything that can evaluate the step kernel.
pub trait StepBackend {
    fn step(
        &mut self,
        state: NeuronState,
        params: &NeuronParameters,
        stimulation: Stimulation,
    ) -> DeviceResult<StepResult>;

    /// Short label for logs and status lines.
    fn name(&self) -> &'static str;
}

/// Direct in-process call to [`iaf_core::step`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftwareBackend;

impl StepBackend for SoftwareBackend {
    fn step(
        &mut self,
        state: NeuronState,
        params: &NeuronParameters,
        stimulation: Stimulation,
    ) -> DeviceResult<StepResult> {
        Ok(step(state, params, stimulation))
    }

    fn name(&self) -> &'static str {
        "software"
    }
}

/// Register path. Parameter registers are rewritten only when params or dt change.
impl<B: RegisterBus> StepBackend for KernelDriver<B> {
    fn step(
        &mut self,
        state: NeuronState,
        params: &NeuronParameters,
        stimulation: Stimulation,
    ) -> DeviceResult<StepResult> {
        if self.configured != Some((*params, stimulation.dt)) {
            log::debug!("loading parameters (dt = {} ms)", stimulation.dt);
            self.configure(params, stimulation.dt)?;
        }
        self.step_once(state, stimulation.injected_current)
    }

    fn name(&self) -> &'static str {
        "registers"
    }
}

impl<K: StepBackend + ?Sized> StepBackend for &mut K {
    fn step(
        &mut self,
        state: NeuronState,
        params: &NeuronParameters,
        stimulation: Stimulation,
    ) -> DeviceResult<StepResult> {
        (**self).step(state, params, stimulation)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
