// Backend abstraction for the TUI so the software and register paths are interchangeable.

use anyhow::Result;

use iaf_core::NeuronParameters;
use iaf_hw::{KernelDriver, Session, SoftKernel, SoftwareBackend, StepBackend, TraceRow};

use crate::config::{BackendKind, SimConfig};

/// Common interface for anything that can drive the view.
pub trait SimBackend {
    /// Advance one step and return its sample.
    fn step(&mut self) -> Result<TraceRow>;
    fn label(&self) -> &'static str;
    fn params(&self) -> NeuronParameters;
    fn steps_taken(&self) -> u64;
    fn spike_count(&self) -> u64;
}

impl<K: StepBackend> SimBackend for Session<K> {
    fn step(&mut self) -> Result<TraceRow> {
        Ok(self.advance()?)
    }

    fn label(&self) -> &'static str {
        self.backend().name()
    }

    fn params(&self) -> NeuronParameters {
        *Session::params(self)
    }

    fn steps_taken(&self) -> u64 {
        self.step_count()
    }

    fn spike_count(&self) -> u64 {
        Session::spike_count(self)
    }
}

impl<T: SimBackend + ?Sized> SimBackend for Box<T> {
    fn step(&mut self) -> Result<TraceRow> {
        (**self).step()
    }

    fn label(&self) -> &'static str {
        (**self).label()
    }

    fn params(&self) -> NeuronParameters {
        (**self).params()
    }

    fn steps_taken(&self) -> u64 {
        (**self).steps_taken()
    }

    fn spike_count(&self) -> u64 {
        (**self).spike_count()
    }
}

/// Build the session described by `cfg` on the selected backend.
pub fn open(cfg: &SimConfig) -> Result<Box<dyn SimBackend>> {
    let params = cfg.params();
    let stimulus = cfg.pulse_train()?;
    let initial = cfg.initial_state();
    let backend: Box<dyn SimBackend> = match cfg.backend {
        BackendKind::Software => Box::new(
            Session::new(SoftwareBackend, params, cfg.dt, stimulus)?.with_initial_state(initial),
        ),
        BackendKind::Registers => {
            let driver = KernelDriver::new(SoftKernel::new());
            Box::new(Session::new(driver, params, cfg.dt, stimulus)?.with_initial_state(initial))
        }
    };
    log::info!("{} backend ready, {} steps at dt = {} ms", backend.label(), cfg.steps, cfg.dt);
    Ok(backend)
}
