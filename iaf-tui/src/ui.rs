// TUI rendering: membrane potential and current sparklines, spike raster, status panel.

use std::io::Stdout;

use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Sparkline},
    Terminal,
};

use crate::app::App;
use crate::backend::SimBackend;

/// Draws the UI each frame:
/// - V sparkline over the sliding window, threshold in the title
/// - I_e sparkline
/// - Spike raster (time on X, circular)
/// - Status including step, time, V, spike count, run state, controls
pub fn draw<B: SimBackend>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &App<B>,
) -> anyhow::Result<()> {
    let params = app.backend.params();
    // Leave some room under reset so hyperpolarization is visible
    let floor = params.reset_potential.min(params.leak_reversal) - 5.0;
    let v_data = app.v_series(floor);
    let v_max = ((params.threshold - floor) * 10.0).max(1.0) as u64;
    let i_data = app.current_series();

    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(
                [
                    Constraint::Percentage(40),
                    Constraint::Percentage(25),
                    Constraint::Length(3),
                    Constraint::Min(3),
                ]
                .as_ref(),
            )
            .split(f.size());

        let v_title = format!(
            "Membrane potential  (floor {:.0} mV, V_th {:.0} mV)",
            floor, params.threshold
        );
        let v_widget = Sparkline::default()
            .block(Block::default().title(v_title).borders(Borders::ALL))
            .data(&v_data)
            .max(v_max)
            .style(Style::default().fg(Color::Green));
        f.render_widget(v_widget, chunks[0]);

        let i_widget = Sparkline::default()
            .block(Block::default().title("Injected current (pA)").borders(Borders::ALL))
            .data(&i_data)
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(i_widget, chunks[1]);

        let raster: String = app.raster.iter().collect();
        let raster_widget = Paragraph::new(raster)
            .block(Block::default().title("Spikes  (time →)").borders(Borders::ALL))
            .style(Style::default().fg(Color::White));
        f.render_widget(raster_widget, chunks[2]);

        let (step, t, v) = match app.last() {
            Some(r) => (r.step + 1, r.time_ms, r.v),
            None => (0, 0.0, f32::NAN),
        };
        let mut status = format!(
            "Backend: {} | Step: {}/{} | t: {:.1} ms | V: {:.2} mV | Spikes: {} | Running: {}\n\
             Controls: [s] Step  [r] Run/Pause  [c] Write CSV  [q] Quit",
            app.backend.label(),
            step,
            app.max_steps,
            t,
            v,
            app.backend.spike_count(),
            if app.running { "yes" } else { "no" }
        );
        if let Some(msg) = &app.message {
            status.push('\n');
            status.push_str(msg);
        }
        let status_widget = Paragraph::new(status)
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().title("Status").borders(Borders::ALL));
        f.render_widget(status_widget, chunks[3]);
    })?;
    Ok(())
}
