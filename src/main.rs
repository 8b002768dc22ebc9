mod audio;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

#[cfg(test)]
mod test_support;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::PreviewPlayer;
use config::Config;
use controller::AppController;
use model::{AppModel, ItunesClient, PlaybackSession, SessionSnapshot};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = match logging::init_logging(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== tunes-rs Starting ===");
    config.log_load_notes();
    tracing::debug!(?config, "Configuration loaded");

    let engine = PreviewPlayer::new(&config)?;
    let catalog = ItunesClient::new(&config)?;

    let (session, engine_events) = PlaybackSession::start(Box::new(engine));
    let app_model = AppModel::new(session);
    let snapshots = app_model.subscribe();
    let model = Arc::new(Mutex::new(app_model));

    let controller = AppController::new(model.clone(), Arc::new(catalog), config);
    let listener = controller.start_player_event_listener(engine_events);
    let poller = controller.start_position_poller();
    controller.submit_startup_search();

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model.clone(), snapshots, controller.clone()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = ?err, "Application error");
    }

    // Release the engine on every exit path
    controller.shutdown().await;
    let _ = tokio::time::timeout(Duration::from_secs(2), async {
        let _ = listener.await;
        let _ = poller.await;
    })
    .await;

    tracing::info!("tunes-rs shutting down");
    res.map_err(Into::into)
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    mut snapshots: watch::Receiver<SessionSnapshot>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        let (ui_state, should_quit) = {
            let model_guard = model.lock().await;
            (model_guard.ui_state(), model_guard.should_quit())
        };

        if should_quit {
            break;
        }

        let snapshot = snapshots.borrow_and_update().clone();

        terminal.draw(|f| {
            AppView::render(f, &snapshot, &ui_state);
        })?;

        // Short poll keeps the progress gauge moving between samples
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
