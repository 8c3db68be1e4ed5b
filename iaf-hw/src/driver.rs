//! Host-side driver for the step accelerator.
//!
//! Static parameters are written once with [`KernelDriver::configure`]. Each
//! step waits for AP_IDLE, writes the state and I_e, raises AP_START, polls
//! CTRL for AP_DONE and reads the outputs back. A run left over from a timed-out
//! step is drained and discarded before the next one starts.

use iaf_core::{NeuronParameters, NeuronState, StepResult};

use crate::bus::RegisterBus;
use crate::error::{DeviceError, DeviceResult};
use crate::regmap::{InputPort, OutputPort, AP_DONE, AP_IDLE, AP_START, CTRL};

/// Upper bound on CTRL reads while waiting for a run to finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollBudget {
    pub max_polls: u32,
}

impl Default for PollBudget {
    fn default() -> Self {
        Self { max_polls: 10_000 }
    }
}

pub struct KernelDriver<B: RegisterBus> {
    bus: B,
    budget: PollBudget,
    pub(crate) configured: Option<(NeuronParameters, f32)>,
}

impl<B: RegisterBus> KernelDriver<B> {
    pub fn new(bus: B) -> Self {
        Self::with_budget(bus, PollBudget::default())
    }

    pub fn with_budget(bus: B, budget: PollBudget) -> Self {
        Self {
            bus,
            budget,
            configured: None,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn budget(&self) -> PollBudget {
        self.budget
    }

    pub fn set_budget(&mut self, budget: PollBudget) {
        self.budget = budget;
    }

    /// Parameters and dt currently loaded on the device, if any.
    pub fn configured(&self) -> Option<(NeuronParameters, f32)> {
        self.configured
    }

    fn put(&mut self, port: InputPort, value: f32) -> DeviceResult<()> {
        log::trace!("{} <- {}", port.name(), value);
        self.bus.write_f32(port.offset(), value)
    }

    fn get(&mut self, port: OutputPort) -> DeviceResult<f32> {
        let value = self.bus.read_f32(port.offset())?;
        log::trace!("{} -> {}", port.name(), value);
        Ok(value)
    }

    /// Write the registers that stay fixed over a run.
    pub fn configure(&mut self, params: &NeuronParameters, dt: f32) -> DeviceResult<()> {
        self.configured = None;
        self.put(InputPort::Dt, dt)?;
        self.put(InputPort::EL, params.leak_reversal)?;
        self.put(InputPort::VTh, params.threshold)?;
        self.put(InputPort::VReset, params.reset_potential)?;
        self.put(InputPort::TauM, params.tau_membrane)?;
        self.put(InputPort::TauEx, params.tau_excitatory)?;
        self.put(InputPort::TauIn, params.tau_inhibitory)?;
        self.put(InputPort::CM, params.membrane_capacitance)?;
        self.put(InputPort::TRef, params.refractory_duration)?;
        self.configured = Some((*params, dt));
        Ok(())
    }

    /// Run one step on the device with the configured parameters.
    pub fn step_once(
        &mut self,
        state: NeuronState,
        injected_current: f32,
    ) -> DeviceResult<StepResult> {
        if self.configured.is_none() {
            return Err(DeviceError::NotConfigured);
        }
        self.wait_idle()?;
        self.put(InputPort::VIn, state.v)?;
        self.put(InputPort::PscExIn, state.psc_excitatory)?;
        self.put(InputPort::PscInIn, state.psc_inhibitory)?;
        self.put(InputPort::TRefLeftIn, state.refractory_remaining)?;
        self.put(InputPort::IE, injected_current)?;

        self.bus.write(CTRL, AP_START)?;
        self.wait_done()?;

        let v = self.get(OutputPort::VOut)?;
        let psc_excitatory = self.get(OutputPort::PscExOut)?;
        let psc_inhibitory = self.get(OutputPort::PscInOut)?;
        let refractory_remaining = self.get(OutputPort::TRefLeftOut)?;
        let spiked = self.bus.read(OutputPort::SpikeOut.offset())? != 0;

        Ok(StepResult {
            state: NeuronState {
                v,
                psc_excitatory,
                psc_inhibitory,
                refractory_remaining,
            },
            spiked,
        })
    }

    /// Poll CTRL until AP_IDLE so AP_START is not dropped by a busy device.
    /// Reading CTRL also consumes a stale AP_DONE from an abandoned run.
    fn wait_idle(&mut self) -> DeviceResult<()> {
        for poll in 1..=self.budget.max_polls {
            let ctrl = self.bus.read(CTRL)?;
            if ctrl & AP_IDLE != 0 {
                if poll > 1 || ctrl & AP_DONE != 0 {
                    log::warn!("discarded the result of an abandoned run");
                }
                return Ok(());
            }
        }
        log::warn!("step kernel not idle after {} polls", self.budget.max_polls);
        Err(DeviceError::Busy {
            polls: self.budget.max_polls,
        })
    }

    /// Poll CTRL until AP_DONE; returns the number of polls used.
    fn wait_done(&mut self) -> DeviceResult<u32> {
        for poll in 1..=self.budget.max_polls {
            if self.bus.read(CTRL)? & AP_DONE != 0 {
                return Ok(poll);
            }
        }
        log::warn!("step kernel still busy after {} polls", self.budget.max_polls);
        Err(DeviceError::Timeout {
            polls: self.budget.max_polls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soft::SoftKernel;
    use iaf_core::{step, Stimulation};

    /// Accepts every write, reports idle, never reports completion.
    struct NeverDoneBus;

    impl RegisterBus for NeverDoneBus {
        fn read(&mut self, offset: u32) -> DeviceResult<u32> {
            Ok(if offset == CTRL { AP_IDLE } else { 0 })
        }
        fn write(&mut self, _offset: u32, _value: u32) -> DeviceResult<()> {
            Ok(())
        }
    }

    #[test]
    fn step_requires_configuration() {
        let mut drv = KernelDriver::new(SoftKernel::new());
        assert_eq!(drv.step_once(NeuronState::default(), 0.0), Err(DeviceError::NotConfigured));
    }

    #[test]
    fn device_step_matches_kernel() {
        let params = NeuronParameters {
            tau_excitatory: 5.0,
            tau_inhibitory: 10.0,
            ..NeuronParameters::default()
        };
        let mut drv = KernelDriver::new(SoftKernel::new());
        drv.configure(&params, 0.1).unwrap();

        let state = NeuronState {
            v: -55.0,
            psc_excitatory: 120.0,
            psc_inhibitory: 40.0,
            refractory_remaining: 0.0,
        };
        let got = drv.step_once(state, 300.0).unwrap();
        let want = step(state, &params, Stimulation::new(300.0, 0.1));
        assert_eq!(got, want);
        assert_eq!(drv.bus().runs(), 1);
    }

    #[test]
    fn spike_flag_crosses_the_bus() {
        let params = NeuronParameters::default();
        let mut drv = KernelDriver::new(SoftKernel::new());
        drv.configure(&params, 0.1).unwrap();
        let state = NeuronState { v: -50.01, ..NeuronState::default() };
        let out = drv.step_once(state, 5000.0).unwrap();
        assert!(out.spiked);
        assert_eq!(out.state.v, params.reset_potential);
        assert_eq!(out.state.refractory_remaining, params.refractory_duration);
    }

    #[test]
    fn waits_through_device_latency() {
        let mut drv = KernelDriver::new(SoftKernel::with_latency(5));
        drv.configure(&NeuronParameters::default(), 0.1).unwrap();
        assert!(drv.step_once(NeuronState { v: -65.0, ..NeuronState::default() }, 0.0).is_ok());
    }

    #[test]
    fn stuck_device_times_out() {
        let mut drv = KernelDriver::with_budget(NeverDoneBus, PollBudget { max_polls: 16 });
        drv.configure(&NeuronParameters::default(), 0.1).unwrap();
        assert_eq!(
            drv.step_once(NeuronState::default(), 0.0),
            Err(DeviceError::Timeout { polls: 16 })
        );
    }

    #[test]
    fn budget_shorter_than_latency_times_out() {
        let budget = PollBudget { max_polls: 4 };
        let mut drv = KernelDriver::with_budget(SoftKernel::with_latency(10), budget);
        drv.configure(&NeuronParameters::default(), 0.1).unwrap();
        let res = drv.step_once(NeuronState::default(), 0.0);
        assert!(matches!(res, Err(DeviceError::Timeout { .. })));
    }

    #[test]
    fn step_after_timeout_uses_fresh_inputs() {
        let params = NeuronParameters::default();
        let mut drv =
            KernelDriver::with_budget(SoftKernel::with_latency(10), PollBudget { max_polls: 4 });
        drv.configure(&params, 0.1).unwrap();

        let a = NeuronState::at_rest(&params);
        assert!(matches!(drv.step_once(a, 0.0), Err(DeviceError::Timeout { .. })));

        // Abandoned run still has 6 polls to go
        let b = NeuronState {
            v: -55.0,
            psc_excitatory: 300.0,
            ..NeuronState::default()
        };
        let polls = drv.budget().max_polls;
        assert_eq!(drv.step_once(b, 800.0), Err(DeviceError::Busy { polls }));

        drv.set_budget(PollBudget::default());
        let got = drv.step_once(b, 800.0).unwrap();
        assert_eq!(got, step(b, &params, Stimulation::new(800.0, 0.1)));
        assert_eq!(drv.bus().runs(), 2);
    }

    #[test]
    fn stale_done_flag_is_not_mistaken_for_a_new_run() {
        let params = NeuronParameters::default();
        let mut drv =
            KernelDriver::with_budget(SoftKernel::with_latency(3), PollBudget { max_polls: 2 });
        drv.configure(&params, 0.1).unwrap();
        let a = NeuronState::at_rest(&params);
        assert!(drv.step_once(a, 0.0).is_err());

        drv.set_budget(PollBudget { max_polls: 5 });
        let b = NeuronState {
            v: -52.0,
            ..NeuronState::default()
        };
        let got = drv.step_once(b, 400.0).unwrap();
        assert_eq!(got, step(b, &params, Stimulation::new(400.0, 0.1)));
    }
}
