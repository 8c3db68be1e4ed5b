//! Single-neuron IAF-PSC-EXP runner.
//! Interactive: V / I_e sparklines and a spike raster.
//! Controls: [s] Step, [r] Run/Pause, [c] CSV, [q] Quit
//! Headless (`--headless`): runs the whole protocol and optionally writes the trace as CSV.

mod app;
mod backend;
mod config;
mod export;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event as CEvent, KeyCode},
    execute, terminal,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::{BackendKind, SimConfig};
use ui::draw;

#[derive(Parser, Debug)]
#[command(name = "iaf-tui", version, about = "Drive one IAF-PSC-EXP neuron step by step")]
struct Cli {
    /// TOML run configuration (defaults to the reference pulse protocol)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluation path, overrides the file
    #[arg(short, long, value_enum)]
    backend: Option<BackendKind>,

    /// Number of steps, overrides the file
    #[arg(short = 'n', long)]
    steps: Option<u64>,

    /// Run to completion without the terminal UI
    #[arg(long)]
    headless: bool,

    /// Write the trace (step,I,V,S) to this file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn restore_terminal() -> Result<()> {
    terminal::disable_raw_mode()?;
    // Leave alternate screen and show cursor
    execute!(io::stdout(), terminal::LeaveAlternateScreen)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut cfg = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(b) = cli.backend {
        cfg.backend = b;
    }
    if let Some(n) = cli.steps {
        cfg.steps = n;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run_headless(cfg: &SimConfig, csv: Option<&PathBuf>) -> Result<()> {
    let mut sim = backend::open(cfg)?;
    let mut out = csv.map(|path| export::TraceWriter::create(path)).transpose()?;

    let t0 = Instant::now();
    export::stream_run(&mut sim, cfg.steps, out.as_mut())?;
    let elapsed = t0.elapsed();

    let spikes = sim.spike_count();
    let seconds = (cfg.steps as f64 * cfg.dt as f64 / 1000.0).max(1e-9);
    log::info!(
        "ran {} steps in {:.6} s: {} spikes, {:.1} Hz",
        cfg.steps,
        elapsed.as_secs_f64(),
        spikes,
        spikes as f64 / seconds
    );

    if let (Some(out), Some(path)) = (out, csv) {
        out.finish()?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_interactive(cfg: &SimConfig, csv: Option<PathBuf>) -> Result<()> {
    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Ensure terminal is restored on panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        default_hook(panic_info);
    }));

    let result = event_loop(&mut terminal, cfg, csv);

    // Cleanup
    restore_terminal()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: &SimConfig,
    csv: Option<PathBuf>,
) -> Result<()> {
    let mut app = App::new(backend::open(cfg)?, 120, cfg.steps); // window width (steps)
    let tick_rate = Duration::from_millis(20);
    let mut last_tick = Instant::now();

    loop {
        draw(terminal, &app)?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_millis(0));

        if event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('s') => app.step()?,
                    KeyCode::Char('r') => app.toggle_running(),
                    KeyCode::Char('c') => {
                        app.message = Some(match &csv {
                            Some(path) => match export::write_trace_file(path, &app.trace) {
                                Ok(()) => {
                                    format!("wrote {} rows to {}", app.trace.len(), path.display())
                                }
                                Err(e) => format!("export failed: {:#}", e),
                            },
                            None => "no --csv path given".to_string(),
                        });
                    }
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if app.running {
                app.step()?;
            }
            last_tick = Instant::now();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging would tear the alternate screen, so it stays off unless asked for
    let default_filter = if cli.headless { "info" } else { "off" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let cfg = load_config(&cli)?;
    if cli.headless {
        run_headless(&cfg, cli.csv.as_ref())
    } else {
        run_interactive(&cfg, cli.csv)
    }
}
