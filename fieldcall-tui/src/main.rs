//! FIELDCALL terminal client entry point.

use fieldcall_core::constants::SEARCH_DEBOUNCE_MS;
use fieldcall_storage::{AuthGateway, DataStore};
use fieldcall_tui::api_client::RestClient;
use fieldcall_tui::config::TuiConfig;
use fieldcall_tui::error::TuiError;
use fieldcall_tui::events::TuiEvent;
use fieldcall_tui::keys::map_key;
use fieldcall_tui::persistence;
use fieldcall_tui::state::App;
use fieldcall_tui::tasks::TaskRunner;
use fieldcall_tui::telemetry;
use fieldcall_tui::views::render_view;
use chrono::Utc;
use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    telemetry::init(&config.log)?;
    tracing::info!(api = %config.api_base_url, "Starting fieldcall");

    let client = Arc::new(RestClient::new(&config)?);
    let store: Arc<dyn DataStore> = client.clone();
    let auth: Arc<dyn AuthGateway> = client;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let runner = TaskRunner::new(
        store,
        auth,
        event_tx.clone(),
        Duration::from_millis(SEARCH_DEBOUNCE_MS),
    );

    let mut app = App::new(config, runner);
    match persistence::load(&app.config.persistence_path) {
        Ok(Some(state)) => app.restore(state),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "Ignoring unreadable UI state"),
    }

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    spawn_input_reader(event_tx);
    app.start();

    let mut ticker = tokio::time::interval(Duration::from_millis(app.config.tick_rate_ms));

    while !app.should_quit {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => app.on_tick(Utc::now()),
            Some(event) = event_rx.recv() => handle_event(&mut app, event),
        }
    }

    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted()) {
        tracing::warn!(error = %err, "Failed to save UI state");
    }
    tracing::info!("Exiting fieldcall");

    Ok(())
}

fn handle_event(app: &mut App, event: TuiEvent) {
    match event {
        TuiEvent::Input(key) => {
            if let Some(action) = map_key(key) {
                app.handle_action(action);
            }
        }
        TuiEvent::Data(data) => app.apply(data),
        TuiEvent::Tick => app.on_tick(Utc::now()),
        TuiEvent::Resize { .. } => {}
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            let sent = match event::read() {
                Ok(CrosstermEvent::Key(key)) => sender.blocking_send(TuiEvent::Input(key)),
                Ok(CrosstermEvent::Resize(width, height)) => {
                    sender.blocking_send(TuiEvent::Resize { width, height })
                }
                _ => Ok(()),
            };
            if sent.is_err() {
                break;
            }
        }
    });
}
