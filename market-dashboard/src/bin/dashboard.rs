/// Market Dashboard
///
/// Terminal view of a simulated stock market: overview, macro indicators,
/// stock table, top businesses and the live transaction feed. Prices drift on
/// a fast cycle, the whole board re-renders on a slow cycle, and `r` runs a
/// manual refresh that may also synthesize a trade.
use std::{
    error::Error,
    fs::OpenOptions,
    io,
    sync::Mutex as StdMutex,
    time::{Duration, Instant},
};

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use market_dashboard::{render_dashboard, Controller, DashboardConfig, MarketStore, ViewBoard};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

/// Get log file path from DASHBOARD_LOG env var (default: market-dashboard.log)
fn get_log_path() -> String {
    std::env::var("DASHBOARD_LOG").unwrap_or_else(|_| "market-dashboard.log".to_string())
}

/// Log to a file so the alternate screen stays clean
fn init_logging() -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(get_log_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(StdMutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = DashboardConfig::from_env()?;

    let mut print_config = false;
    let mut rejected = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--print-config" => print_config = true,
            _ => rejected.push(arg),
        }
    }

    if print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    init_logging()?;
    for arg in &rejected {
        warn!(%arg, "ignoring unknown argument");
    }

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let store = MarketStore::with_sample_data(&config, Utc::now());
    let controller = Controller::new(store, ViewBoard::full(), config);

    let started = Instant::now();
    let applied = controller.render_initial().await;
    info!(
        applied,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "initial render complete"
    );
    let cycles = controller.start();

    let result = run_app(&mut terminal, &controller).await;

    cycles.shutdown().await;

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("dashboard closed");
    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    controller: &Controller<ViewBoard>,
) -> Result<(), Box<dyn Error>> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let surface = controller.surface();

    loop {
        let board = surface.lock().await.clone();
        terminal.draw(|f| render_dashboard(f, f.area(), &board))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        // Ignored by the controller while a refresh is running
                        controller.trigger_refresh();
                    }
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}
