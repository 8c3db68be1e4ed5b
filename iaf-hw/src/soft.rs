//! In-process model of the register-mapped step accelerator.
//!
//! Behaves like the synthesized IP from the host's point of view: inputs are
//! latched registers, AP_START runs one kernel step, outputs and their valid
//! flags appear when the run completes, AP_DONE clears when CTRL is read.

use iaf_core::{step, NeuronParameters, NeuronState, Stimulation};

use crate::bus::RegisterBus;
use crate::error::{DeviceError, DeviceResult};
use crate::regmap::{
    decode, f32_to_word, word_to_f32, InputPort, OutputPort, Register, AP_DONE, AP_IDLE, AP_READY,
    AP_START, INPUT_COUNT, OUTPUT_COUNT,
};

#[derive(Clone, Debug, Default)]
pub struct SoftKernel {
    inputs: [u32; INPUT_COUNT],
    outputs: [u32; OUTPUT_COUNT],
    valid: [bool; OUTPUT_COUNT],
    gie: u32,
    ier: u32,
    isr: u32,
    done: bool,
    // Result of a started run and the CTRL polls left before it lands
    pending: Option<([u32; OUTPUT_COUNT], u32)>,
    latency: u32,
    runs: u64,
}

impl SoftKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model a busy device: a started run completes only after `polls` reads of CTRL.
    pub fn with_latency(polls: u32) -> Self {
        Self {
            latency: polls,
            ..Self::default()
        }
    }

    /// Number of completed runs.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    fn input(&self, port: InputPort) -> f32 {
        word_to_f32(self.inputs[port.index()])
    }

    fn compute(&self) -> [u32; OUTPUT_COUNT] {
        let state = NeuronState {
            v: self.input(InputPort::VIn),
            psc_excitatory: self.input(InputPort::PscExIn),
            psc_inhibitory: self.input(InputPort::PscInIn),
            refractory_remaining: self.input(InputPort::TRefLeftIn),
        };
        let params = NeuronParameters {
            leak_reversal: self.input(InputPort::EL),
            threshold: self.input(InputPort::VTh),
            reset_potential: self.input(InputPort::VReset),
            tau_membrane: self.input(InputPort::TauM),
            tau_excitatory: self.input(InputPort::TauEx),
            tau_inhibitory: self.input(InputPort::TauIn),
            membrane_capacitance: self.input(InputPort::CM),
            refractory_duration: self.input(InputPort::TRef),
        };
        let stim = Stimulation::new(self.input(InputPort::IE), self.input(InputPort::Dt));
        let out = step(state, &params, stim);

        let mut words = [0u32; OUTPUT_COUNT];
        words[OutputPort::VOut.index()] = f32_to_word(out.state.v);
        words[OutputPort::PscExOut.index()] = f32_to_word(out.state.psc_excitatory);
        words[OutputPort::PscInOut.index()] = f32_to_word(out.state.psc_inhibitory);
        words[OutputPort::TRefLeftOut.index()] = f32_to_word(out.state.refractory_remaining);
        words[OutputPort::SpikeOut.index()] = out.spiked as u32;
        words
    }

    fn start(&mut self) {
        if self.pending.is_some() {
            // Already running; AP_START is ignored until the run lands
            return;
        }
        let words = self.compute();
        if self.latency == 0 {
            self.publish(words);
        } else {
            self.pending = Some((words, self.latency));
        }
    }

    fn publish(&mut self, words: [u32; OUTPUT_COUNT]) {
        self.outputs = words;
        self.valid = [true; OUTPUT_COUNT];
        self.done = true;
        self.runs += 1;
    }

    fn read_ctrl(&mut self) -> u32 {
        if let Some((words, left)) = self.pending {
            if left <= 1 {
                self.pending = None;
                self.publish(words);
            } else {
                self.pending = Some((words, left - 1));
            }
        }
        let mut ctrl = 0;
        if self.pending.is_some() {
            ctrl |= AP_START;
        } else {
            ctrl |= AP_IDLE | AP_READY;
        }
        if self.done {
            ctrl |= AP_DONE;
            self.done = false;
        }
        ctrl
    }
}

impl RegisterBus for SoftKernel {
    fn read(&mut self, offset: u32) -> DeviceResult<u32> {
        match decode(offset).ok_or(DeviceError::InvalidOffset(offset))? {
            Register::Ctrl => Ok(self.read_ctrl()),
            Register::Gie => Ok(self.gie),
            Register::Ier => Ok(self.ier),
            Register::Isr => Ok(self.isr),
            Register::Input(port) => Ok(self.inputs[port.index()]),
            Register::Output(port) => Ok(self.outputs[port.index()]),
            Register::OutputValid(port) => {
                let v = self.valid[port.index()];
                self.valid[port.index()] = false;
                Ok(v as u32)
            }
        }
    }

    fn write(&mut self, offset: u32, value: u32) -> DeviceResult<()> {
        match decode(offset).ok_or(DeviceError::InvalidOffset(offset))? {
            Register::Ctrl => {
                if value & AP_START != 0 {
                    self.start();
                }
                Ok(())
            }
            Register::Gie => {
                self.gie = value;
                Ok(())
            }
            Register::Ier => {
                self.ier = value;
                Ok(())
            }
            Register::Isr => {
                self.isr = value;
                Ok(())
            }
            Register::Input(port) => {
                self.inputs[port.index()] = value;
                Ok(())
            }
            Register::Output(_) | Register::OutputValid(_) => Err(DeviceError::ReadOnly(offset)),
        }
    }
}
