//! user-manager binary entry point.
//!
//! Loads settings, sets up file logging and the async runtime, then runs the
//! TUI event loop and restores the terminal state on exit.
//!
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use user_manager::api::HttpUserApi;
use user_manager::app::keymap::Keymap;
use user_manager::app::update::Tasks;
use user_manager::app::{self, AppState, Screen, Theme};
use user_manager::config::{Settings, config_file_path};
use user_manager::storage::LocalStore;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> std::io::Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> anyhow::Result<WorkerGuard> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,user_manager=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();
    Ok(guard)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let settings = Settings::parse();
    let _guard = init_logging(&settings.log_file())?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting user-manager");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build async runtime")?;

    let endpoints = settings.endpoints();
    if endpoints.email_api_key.is_none() || endpoints.phone_api_key.is_none() {
        tracing::warn!("validation API keys are not set; add and edit will fail validation");
    }
    let api = Arc::new(HttpUserApi::new(endpoints));
    let storage = LocalStore::new(settings.data_file());
    let start = if settings.skip_login { Screen::Users } else { Screen::Login };
    let mut state = AppState::new(api, storage, start)
        .with_theme(Theme::load_or_init(&config_file_path("theme.conf")))
        .with_keymap(Keymap::load_or_init(&config_file_path("keybinds.conf")))
        .with_fetch_limit(settings.fetch_limit);
    let mut tasks = Tasks::new(runtime.handle().clone());

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, &mut state, &mut tasks);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err}");
    }
    runtime.shutdown_background();
    Ok(())
}
