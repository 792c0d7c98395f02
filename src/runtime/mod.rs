use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::TrackList;
use crate::catalog::spawn_chart_fetch;
use crate::events::EventBus;
use crate::playback::{LoopTimers, PlaybackController, RodioBackend};

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();

    let log_path = startup::init_logging(&settings.log);
    if let Some(msg) = config_problem {
        warn!("{msg}");
    }
    if let Some(p) = &log_path {
        info!("encore {} starting, logging to {}", env!("CARGO_PKG_VERSION"), p.display());
    }

    // The list publishes selections; the event loop drains them into the player.
    let mut bus = EventBus::new();
    let selections = bus.subscribe();
    let mut list = TrackList::new(bus);
    let mut player =
        PlaybackController::new(RodioBackend::new(), LoopTimers::new(), &settings.playback);

    let (catalog_tx, catalog_rx) = mpsc::channel();
    let (cover_tx, cover_rx) = mpsc::channel();
    spawn_chart_fetch(settings.catalog.clone(), catalog_tx.clone());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let channels = event_loop::Channels {
            catalog_tx,
            catalog_rx,
            cover_tx,
            cover_rx,
            selections,
        };
        let mut state = event_loop::EventLoopState::default();

        event_loop::run(
            &mut terminal,
            &settings,
            &mut list,
            &mut player,
            &channels,
            &mut state,
        )
    })();

    player.teardown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("encore exiting");
    run_result
}
