//! Race Strategy - Pit Strategy Prediction Client
//!
//! A terminal client that collects race conditions from the operator,
//! submits them to a prediction service and shows the predicted number of
//! pit stops with the lap and tyre compound of each stop.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use race_strategy::application::{App, AppMode};
use race_strategy::infrastructure::{
    init_logging, load_settings, HttpPredictionService, ReferenceRepository,
};
use race_strategy::presentation::{render_ui, InputHandler};

/// How long the event loop waits for a key before checking on the
/// in-flight request again.
const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "race_strategy", about = "Terminal client for pit strategy predictions")]
struct Cli {
    /// Config file (defaults to race_strategy.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Prediction endpoint URL
    #[arg(long)]
    endpoint: Option<String>,
    /// JSON file with tracks, teams and drivers
    #[arg(long)]
    lists: Option<PathBuf>,
    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Entry point for the race strategy client.
///
/// Loads settings, starts logging, reads the reference lists, sets up the
/// terminal and runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the log file cannot
/// be opened, or terminal setup fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint = endpoint;
    }
    if let Some(lists) = cli.lists {
        settings.lists_path = Some(lists);
    }
    if let Some(log_file) = cli.log_file {
        settings.log_file = log_file;
    }

    init_logging(&settings)?;
    tracing::info!(endpoint = %settings.endpoint, "starting race strategy client");

    let options = ReferenceRepository::load(settings.lists_path.as_deref());
    let service = HttpPredictionService::new(settings.endpoint.clone())?;
    let mut app = App::new(options, Arc::new(service));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.is_submitting() {
        tracing::info!("exiting with a prediction request still in flight");
    }

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal error");
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Applies finished requests, redraws, and dispatches key presses.
/// Continues running until the user presses 'q' in normal mode.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.poll_submission();
        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
