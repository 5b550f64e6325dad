// avalanche-topology - Avalanche network topology in the terminal
// Radial hub/satellite view of chains with animated transaction particles

mod api;
mod app;
mod poller;
mod random;
mod scheduler;
mod theme;
mod topology;
mod ui;

use anyhow::{Context, Result};
use api::HttpMetricsSource;
use app::config::{
    AppConfig, RefreshConfig, DEFAULT_API_URL, DEFAULT_FRAME_MS, DEFAULT_REFRESH_SECS,
    STARTUP_GRACE,
};
use app::{event::handle_key_event, AppState};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use random::{RandomSource, SeededRandom};
use ratatui::{backend::CrosstermBackend, Terminal};
use scheduler::{SystemClock, TimerScheduler};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(author, version, about = "Avalanche network topology dashboard", long_about = None)]
struct Cli {
    /// Base URL of the metrics API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Chain list refresh interval in seconds
    #[arg(long, default_value_t = DEFAULT_REFRESH_SECS)]
    refresh_secs: u64,

    /// Seed for layout jitter and particle spawning
    #[arg(long)]
    seed: Option<u64>,

    /// UI frame interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_FRAME_MS)]
    frame_ms: u64,

    /// Write tracing output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level used with --log-file
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        AppConfig {
            api_url: self.api_url.clone(),
            refresh: RefreshConfig::new(self.refresh_secs, self.frame_ms),
            seed: self.seed,
            ..AppConfig::default()
        }
    }
}

/// Route tracing to a file; the terminal belongs to the TUI
fn init_logging(cli: &Cli) -> Result<()> {
    let Some(path) = &cli.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(cli.log_level)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = cli.app_config();
    let source = HttpMetricsSource::new(&config.api_url)
        .with_context(|| format!("invalid metrics API URL {}", config.api_url))?;
    tracing::info!(api_url = %config.api_url, seed = ?config.seed, "Starting topology view");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, config, Arc::new(source));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Topology view exited with an error");
        println!("Error: {:?}", err);
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: AppConfig,
    source: Arc<HttpMetricsSource>,
) -> Result<()> {
    let rng: Box<dyn RandomSource> = match config.seed {
        Some(seed) => Box::new(SeededRandom::seeded(seed)),
        None => Box::new(SeededRandom::from_entropy()),
    };
    let ui_interval = config.refresh.ui_interval();
    let mut app = AppState::new(
        config,
        source,
        Box::new(TimerScheduler::new(SystemClock)),
        rng,
    );

    app.mount();
    // Give the first fetch a moment so the first frame isn't a loading screen
    app.wait_for_poll(STARTUP_GRACE);

    let result = loop {
        app.on_tick();
        app.update_frame_time();
        if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
            break Err(e.into());
        }

        if !app.running {
            break Ok(());
        }

        match event::poll(ui_interval) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_key_event(&mut app, key.code);
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
    };

    app.teardown();
    result
}
