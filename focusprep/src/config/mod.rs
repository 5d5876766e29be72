//! Startup settings for `FocusPrep`.
//!
//! Where the board and session log are saved, how often the focus timer
//! re-checks the clock, and a few display knobs. Each value comes from the
//! first source that sets it: command line (or its `FOCUSPREP_*` variable),
//! then `config.toml` with its `[storage]`, `[timer]` and `[ui]` tables,
//! then the compiled default. User preferences such as theme and break
//! lengths live in the saved app state instead, see [`crate::state`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use focusprep_proto::settings::ThemeMode;
use focusprep_proto::task::MAX_TASK_TITLE_LENGTH;

/// Hard upper bound for a configured title length.
pub const TITLE_LENGTH_CEILING: usize = 256;

/// Shortest tick interval accepted from configuration.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// A `config.toml` that exists but could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file named by `--config` is missing, or a file could not be read.
    #[error("cannot read {path}: {source}")]
    ReadFile {
        /// File that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The file is not valid TOML or has a value of the wrong type.
    #[error("invalid settings in {path}: {source}")]
    ParseToml {
        /// File that was parsed.
        path: PathBuf,
        /// Parser diagnostic, with line and column.
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// config.toml tables; an absent key leaves the default in place
// ---------------------------------------------------------------------------

/// The whole `config.toml`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    timer: TimerFileConfig,
    ui: UiFileConfig,
}

/// `[storage]`: where saved tasks, sessions and blockers go.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
}

/// `[timer]`: focus timer cadence and starting length.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TimerFileConfig {
    tick_interval_ms: Option<u64>,
    focus_minutes: Option<u32>,
}

/// `[ui]`: terminal loop and board display.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    due_soon_hours: Option<i64>,
    max_task_title_len: Option<usize>,
}

// ---------------------------------------------------------------------------
// Settings the app runs with
// ---------------------------------------------------------------------------

/// Startup settings after the command line, file and defaults are merged.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Storage --
    /// Directory for saved state. `None` means keep everything in memory.
    pub data_dir: Option<PathBuf>,

    // -- Timer --
    /// How often a running timer is re-evaluated.
    pub tick_interval: Duration,
    /// Initial focus session length in minutes, when no saved setting exists.
    pub focus_minutes: Option<u32>,

    // -- UI --
    /// Theme forced from the command line, overriding the saved one.
    pub theme: Option<ThemeMode>,
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Tasks due within this window are highlighted.
    pub due_soon_window: TimeDelta,
    /// Maximum task title length in characters.
    pub max_task_title_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tick_interval: Duration::from_secs(1),
            focus_minutes: None,
            theme: None,
            poll_timeout: Duration::from_millis(50),
            due_soon_window: TimeDelta::hours(24),
            max_task_title_len: MAX_TASK_TITLE_LENGTH,
        }
    }
}

impl AppConfig {
    /// Reads `config.toml` (the `--config` path, else
    /// [`default_config_path`]) and merges it under the command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicit `--config` file is missing,
    /// or when any existing file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Command line over file over default. `--in-memory` wins over any
    /// data directory; nonsensical numbers fall back or are clamped.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        let data_dir = if cli.in_memory {
            None
        } else {
            cli.data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone())
                .or(defaults.data_dir)
        };

        Self {
            data_dir,
            tick_interval: file
                .timer
                .tick_interval_ms
                .map_or(defaults.tick_interval, Duration::from_millis)
                .max(MIN_TICK_INTERVAL),
            focus_minutes: cli
                .focus_minutes
                .or(file.timer.focus_minutes)
                .filter(|m| *m > 0),
            theme: cli.theme,
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            due_soon_window: file
                .ui
                .due_soon_hours
                .filter(|h| *h > 0)
                .and_then(TimeDelta::try_hours)
                .unwrap_or(defaults.due_soon_window),
            max_task_title_len: file
                .ui
                .max_task_title_len
                .unwrap_or(defaults.max_task_title_len)
                .clamp(1, TITLE_LENGTH_CEILING),
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal study planner: kanban board and focus timer")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/focusprep/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for saved tasks, sessions and settings.
    #[arg(long, env = "FOCUSPREP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep all state in memory; nothing is read from or written to disk.
    #[arg(long)]
    pub in_memory: bool,

    /// Focus session length in minutes.
    #[arg(long)]
    pub focus_minutes: Option<u32>,

    /// Theme (light, dark, system).
    #[arg(long, value_parser = parse_theme)]
    pub theme: Option<ThemeMode>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "FOCUSPREP_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/focusprep.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_theme(raw: &str) -> Result<ThemeMode, String> {
    raw.parse()
}

/// `<data dir>/focusprep`, if the platform has a data directory.
fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("focusprep"))
}

/// `<config dir>/focusprep/config.toml`, if the platform has a config
/// directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("focusprep").join("config.toml"))
}

/// An explicit path has to exist; the default one may be absent, which
/// reads as an empty file.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(path) = explicit_path {
        return parse_config(path, fs::read_to_string(path));
    }
    let Some(path) = default_config_path() else {
        return Ok(ConfigFile::default());
    };
    match fs::read_to_string(&path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        read => parse_config(&path, read),
    }
}

fn parse_config(path: &Path, read: io::Result<String>) -> Result<ConfigFile, ConfigError> {
    let contents = read.map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}
