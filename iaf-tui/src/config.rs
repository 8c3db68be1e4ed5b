// Run configuration: TOML file merged with command-line overrides.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use iaf_core::{NeuronParameters, NeuronState};
use iaf_hw::{Pulse, PulseTrain, REFERENCE_BASE_CURRENT, REFERENCE_PULSES};

/// Which evaluation path drives the neuron.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Direct call into the kernel
    Software,
    /// Through the control registers of the accelerator model
    #[default]
    Registers,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NeuronSection {
    pub leak_reversal: f32,
    pub threshold: f32,
    pub reset_potential: f32,
    pub tau_membrane: f32,
    pub tau_excitatory: f32,
    pub tau_inhibitory: f32,
    pub membrane_capacitance: f32,
    pub refractory_duration: f32,
}

impl Default for NeuronSection {
    fn default() -> Self {
        let p = NeuronParameters::default();
        Self {
            leak_reversal: p.leak_reversal,
            threshold: p.threshold,
            reset_potential: p.reset_potential,
            tau_membrane: p.tau_membrane,
            tau_excitatory: p.tau_excitatory,
            tau_inhibitory: p.tau_inhibitory,
            membrane_capacitance: p.membrane_capacitance,
            refractory_duration: p.refractory_duration,
        }
    }
}

impl From<NeuronSection> for NeuronParameters {
    fn from(s: NeuronSection) -> Self {
        Self {
            leak_reversal: s.leak_reversal,
            threshold: s.threshold,
            reset_potential: s.reset_potential,
            tau_membrane: s.tau_membrane,
            tau_excitatory: s.tau_excitatory,
            tau_inhibitory: s.tau_inhibitory,
            membrane_capacitance: s.membrane_capacitance,
            refractory_duration: s.refractory_duration,
        }
    }
}

/// Starting state; `v` defaults to the leak reversal potential.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InitialSection {
    pub v: Option<f32>,
    pub psc_excitatory: f32,
    pub psc_inhibitory: f32,
    pub refractory_remaining: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseSection {
    pub first_step: u64,
    pub last_step: u64,
    pub amplitude: f32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StimulusSection {
    pub base_current: f32,
    pub pulses: Vec<PulseSection>,
}

impl Default for StimulusSection {
    fn default() -> Self {
        Self {
            base_current: REFERENCE_BASE_CURRENT,
            pulses: REFERENCE_PULSES
                .iter()
                .map(|p| PulseSection {
                    first_step: p.first_step,
                    last_step: p.last_step,
                    amplitude: p.amplitude,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimConfig {
    pub steps: u64,
    /// Step size (ms)
    pub dt: f32,
    pub backend: BackendKind,
    pub neuron: NeuronSection,
    pub initial: InitialSection,
    pub stimulus: StimulusSection,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            steps: 2001,
            dt: 0.1,
            backend: BackendKind::default(),
            neuron: NeuronSection::default(),
            initial: InitialSection::default(),
            stimulus: StimulusSection::default(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn params(&self) -> NeuronParameters {
        self.neuron.into()
    }

    pub fn initial_state(&self) -> NeuronState {
        let params = self.params();
        NeuronState {
            v: self.initial.v.unwrap_or(params.leak_reversal),
            psc_excitatory: self.initial.psc_excitatory,
            psc_inhibitory: self.initial.psc_inhibitory,
            refractory_remaining: self.initial.refractory_remaining,
        }
    }

    pub fn pulse_train(&self) -> Result<PulseTrain> {
        let mut train = PulseTrain::constant(self.stimulus.base_current);
        for p in &self.stimulus.pulses {
            let pulse = Pulse::new(p.first_step, p.last_step, p.amplitude)
                .with_context(|| format!("pulse {}..={}", p.first_step, p.last_step))?;
            train.push(pulse).context("too many stimulus pulses")?;
        }
        Ok(train)
    }

    /// Checks everything a run depends on before it starts.
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            bail!("steps must be at least 1");
        }
        self.params().validate(self.dt).context("neuron parameters")?;
        if self.initial.refractory_remaining < 0.0 {
            bail!("initial refractory_remaining must not be negative");
        }
        self.pulse_train()?;
        Ok(())
    }
}
