//! Courtroom trial game TUI.
//!
//! The player sits as judge in the trial of INDUS-07, questions three
//! characters before the clock runs out, and delivers a verdict.

mod app;
mod events;
mod ui;

use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use trial_core::{spawn_backend_worker, ProxyDialogue, ProxySpeech, Session};

use app::App;
use events::{handle_event, EventResult};
use ui::render;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let proxy = match apiproxy::ApiProxy::from_env() {
        Ok(proxy) => proxy,
        Err(_) => {
            eprintln!("Error: OPENAI_API_KEY environment variable not set.");
            eprintln!("Please set it in .env file or with: export OPENAI_API_KEY=your_key_here");
            std::process::exit(1);
        }
    };

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let session = Session::new(event_tx.clone());
    let command_tx = spawn_backend_worker(
        Arc::new(ProxyDialogue::new(proxy.clone())),
        Arc::new(ProxySpeech::new(proxy)),
        event_tx,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(session, command_tx, event_rx));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> std::io::Result<()> {
    loop {
        terminal.draw(|f| render(f, &app))?;

        // Poll for input with a short timeout so reveals and the countdown
        // keep animating between keystrokes.
        if event::poll(Duration::from_millis(50))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev, Instant::now()) {
                EventResult::Quit => return Ok(()),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        }

        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}
