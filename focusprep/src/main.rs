//! `FocusPrep`: terminal study planner.
//!
//! Launches the TUI with a kanban board and a focus timer. State is saved
//! as JSON blobs in the data directory. Configuration via CLI flags,
//! environment variables, or config file (`~/.config/focusprep/config.toml`).
//!
//! ```bash
//! # Default data directory
//! cargo run --bin focusprep
//!
//! # Throwaway session, nothing written to disk
//! cargo run --bin focusprep -- --in-memory --focus-minutes 45 --theme light
//!
//! # Or via environment variables
//! FOCUSPREP_DATA_DIR=/tmp/prep FOCUSPREP_LOG=debug cargo run
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing_appender::non_blocking::WorkerGuard;

use focusprep::app::{App, SharedClock};
use focusprep::clock::SystemClock;
use focusprep::config::{AppConfig, CliArgs};
use focusprep::store::{FileStore, KeyValueStore, MemoryStore};
use focusprep::ui;

fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            AppConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("focusprep starting");

    let store = open_store(&config);

    // The timer ticker runs on the runtime; the UI loop stays on this thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let _runtime_guard = runtime.enter();

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, store, &config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("focusprep exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("focusprep.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Opens the file store in the data directory, or an in-memory store when
/// none is configured or the directory is unusable.
fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let Some(dir) = &config.data_dir else {
        tracing::info!("no data directory, state will not be saved");
        return Arc::new(MemoryStore::new());
    };
    match FileStore::open(dir) {
        Ok(store) => {
            tracing::info!(dir = %store.dir().display(), "saving state to data directory");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "data directory unusable, keeping state in memory");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: Arc<dyn KeyValueStore>,
    config: &AppConfig,
) -> io::Result<()> {
    let clock: SharedClock = Arc::new(SystemClock);
    let mut app = App::new(config, store, clock);

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Apply timer events and expire notifications.
        app.tick();

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key_event(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
