//! # Dirac Monitor Entry Point
//!
//! Terminal console for DIRAC monitors: pick filters on the left, browse the
//! matching rows on the right.
//!
//! ## Usage
//!
//! ```bash
//! # Request monitor against a portal
//! dirac-monitor --base-url https://dirac.example.org/DIRAC/ --user alice --group dirac_user
//!
//! # Administrators see every owner
//! dirac-monitor --property NormalUser --property JobAdministrator
//!
//! # Another monitor described in JSON
//! dirac-monitor --monitor-file ./monitors/pilots.json
//!
//! # Print the selector options and exit
//! dirac-monitor --dump-options
//! ```
//!
//! ## Startup
//!
//! 1. **Config**: `~/.config/dirac-monitor/config.json`, overridden by flags
//! 2. **Profile**: the panel and column state saved when the monitor was last closed
//! 3. **UI**: options load in the background; a restored panel submits once they arrive
//!
//! Key bindings are listed in [`dirac_monitor::ui::input`].

use dirac_monitor::grid::HttpGridSource;
use dirac_monitor::logging;
use dirac_monitor::monitor::MonitorDefinition;
use dirac_monitor::profile::{ApplicationProfile, FileProfileStore};
use dirac_monitor::selector::{HttpOptionsSource, OptionsSource};
use dirac_monitor::session::Session;
use dirac_monitor::ui::{self, config::Config, theme::Theme, App, AppEvent, EffectRunner};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::collections::BTreeMap;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_appender::non_blocking::WorkerGuard;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(
                event::read().context("Failed to read keyboard event")?,
            ))
        } else {
            Ok(None)
        }
    }
}

/// Terminal console for DIRAC monitors
#[derive(Parser, Debug)]
#[command(name = "dirac-monitor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse DIRAC monitors from the terminal", long_about = None)]
struct Args {
    /// Root URL of the web portal (defaults to `base_url` in the config file)
    #[arg(short, long, value_name = "URL")]
    base_url: Option<String>,

    /// JSON monitor definition to use instead of the request monitor
    #[arg(short, long, value_name = "FILE")]
    monitor_file: Option<PathBuf>,

    /// User name shown in the header (defaults to $USER)
    #[arg(short, long)]
    user: Option<String>,

    /// Group the user is acting as
    #[arg(short, long)]
    group: Option<String>,

    /// Group property held by the user; repeat for several
    #[arg(short, long = "property", value_name = "PROPERTY")]
    properties: Vec<String>,

    /// Directory for log files
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Color theme: "Catppuccin Mocha", "Nord" or "Solarized Dark" (overrides the config file)
    #[arg(long)]
    theme: Option<String>,

    /// HTTP timeout in seconds (overrides the config file)
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Print the selector options as JSON and exit
    #[arg(long)]
    dump_options: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    let _ = panic::take_hook();

    result
}

async fn run_application(args: Args) -> Result<()> {
    let (_log_guard, config) = init_logging_and_config(args.log_dir.as_deref(), Config::load);

    let monitor = match &args.monitor_file {
        Some(path) => MonitorDefinition::load_from(path)?,
        None => MonitorDefinition::request_monitor(),
    };

    let base_url = args
        .base_url
        .or_else(|| config.base_url.clone())
        .context("No server configured: pass --base-url or set base_url in the config file")?;
    let user = args
        .user
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "anonymous".to_string());
    let mut session = Session::new(&base_url, user)?.with_properties(args.properties);
    if let Some(group) = args.group {
        session = session.with_group(group);
    }

    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(config.timeout_secs));
    let options_source =
        HttpOptionsSource::new(&session, monitor.selector.options_url(), timeout)
            .context("Failed to set up the options client")?;

    if args.dump_options {
        return dump_options(&options_source).await;
    }

    let grid_source = HttpGridSource::new(&session, &monitor.data_url, timeout)
        .context("Failed to set up the data client")?;

    let theme = Theme::resolve(args.theme.as_deref().unwrap_or(&config.theme)).clone();

    let store = FileProfileStore::open_default()?;
    let profile_key = monitor.name.clone();
    let profile = ApplicationProfile::load(&store, &profile_key);

    let mut app = App::new(monitor, session, theme).context("Invalid monitor definition")?;
    app.grid.set_page_size(config.page_size);
    app.start(profile.as_ref());

    let (mut runner, mut events) = EffectRunner::new(
        Arc::new(options_source),
        Arc::new(grid_source),
        Box::new(store),
        profile_key,
    );

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Run the app and ensure cleanup happens even on error
    let mut event_reader = CrosstermEventReader;
    let run_result = run_app(
        &mut terminal,
        &mut app,
        &mut runner,
        &mut events,
        &mut event_reader,
    )
    .await;

    runner.shutdown();

    // Restore terminal (always runs, even if run_app failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    run_result?;
    cleanup_result?;

    Ok(())
}

/// Install logging, then load the config so its warnings reach the log.
fn init_logging_and_config(
    log_dir: Option<&Path>,
    load_config: impl FnOnce() -> Config,
) -> (Option<WorkerGuard>, Config) {
    let guard = match logging::init_logging(log_dir) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: logging disabled: {:#}", err);
            None
        }
    };
    (guard, load_config())
}

async fn dump_options(source: &dyn OptionsSource) -> Result<()> {
    let response = source
        .fetch_options()
        .await
        .context("Failed to load selector options")?;

    let fields: BTreeMap<&str, Vec<(&str, &str)>> = response
        .fields
        .iter()
        .map(|(key, options)| {
            let pairs = options
                .iter()
                .map(|o| (o.value.as_str(), o.label.as_str()))
                .collect();
            (key.as_str(), pairs)
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&fields).context("Failed to serialize options")?
    );
    Ok(())
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut EffectRunner,
    events: &mut UnboundedReceiver<AppEvent>,
    event_reader: &mut dyn EventReader,
) -> Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }
        runner.run_all(app.take_effects());

        if app.should_quit {
            return Ok(());
        }

        terminal
            .draw(|f| ui::render(f, app))
            .map_err(|err| anyhow::anyhow!("Failed to draw terminal UI: {err}"))?;

        if let Some(Event::Key(key)) = event_reader.read_event(POLL_INTERVAL)? {
            ui::handle_key(app, key);
        }

        // Let request tasks make progress on single-threaded runtimes
        tokio::task::yield_now().await;
    }
}
