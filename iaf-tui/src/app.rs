// Application state for the TUI: sliding windows of V and I plus a spike raster row.

use std::collections::VecDeque;

use anyhow::Result;

use iaf_hw::TraceRow;

use crate::backend::SimBackend;

pub struct App<B: SimBackend> {
    pub backend: B,
    pub width: usize,             // number of columns (time window)
    pub window: VecDeque<TraceRow>,
    pub raster: Vec<char>,        // circular, one column per step
    pub trace: Vec<TraceRow>,     // everything so far, for export
    pub max_steps: u64,
    pub running: bool,
    pub message: Option<String>,
}

impl<B: SimBackend> App<B> {
    pub fn new(backend: B, width: usize, max_steps: u64) -> Self {
        Self {
            backend,
            width,
            window: VecDeque::with_capacity(width),
            raster: vec![' '; width],
            trace: Vec::new(),
            max_steps,
            running: false,
            message: None,
        }
    }

    pub fn toggle_running(&mut self) {
        self.running = !self.running;
    }

    pub fn finished(&self) -> bool {
        self.backend.steps_taken() >= self.max_steps
    }

    pub fn last(&self) -> Option<&TraceRow> {
        self.trace.last()
    }

    /// Advance the simulation by one step and update the windows.
    pub fn step(&mut self) -> Result<()> {
        if self.finished() {
            self.running = false;
            self.message = Some(format!("run complete after {} steps", self.max_steps));
            return Ok(());
        }
        let row = self.backend.step()?;

        if self.window.len() == self.width {
            self.window.pop_front();
        }
        self.window.push_back(row);

        let col = (row.step as usize) % self.width;
        self.raster[col] = if row.spiked { '|' } else { ' ' };

        self.trace.push(row);
        Ok(())
    }

    /// Membrane potential window scaled for a sparkline (0.1 mV per unit above `floor`).
    pub fn v_series(&self, floor: f32) -> Vec<u64> {
        self.window
            .iter()
            .map(|r| ((r.v - floor).max(0.0) * 10.0) as u64)
            .collect()
    }

    /// Injected current window, clipped at zero.
    pub fn current_series(&self) -> Vec<u64> {
        self.window.iter().map(|r| r.current.max(0.0) as u64).collect()
    }
}
