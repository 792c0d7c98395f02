use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use log::{debug, info};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{ListDiff, TrackList};
use crate::catalog::{CatalogUpdate, spawn_chart_fetch};
use crate::config;
use crate::cover::{CoverUpdate, spawn_cover_load};
use crate::events::AppEvent;
use crate::playback::{LoopTimers, MediaBackend, PlaybackController, RodioBackend, TimerHost};
use crate::ui;

type Player = PlaybackController<RodioBackend, LoopTimers>;

/// Longest we block waiting for input; keeps background results flowing in.
const MAX_POLL: Duration = Duration::from_millis(50);

/// Channels feeding background results and selections into the loop.
pub struct Channels {
    pub catalog_tx: Sender<CatalogUpdate>,
    pub catalog_rx: Receiver<CatalogUpdate>,
    pub cover_tx: Sender<CoverUpdate>,
    pub cover_rx: Receiver<CoverUpdate>,
    pub selections: Receiver<AppEvent>,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// First `g` of a `gg` was pressed.
    pending_gg: bool,
    /// First `z` of a `zz` was pressed.
    pending_zz: bool,
}

/// Main terminal event loop: handles input, UI drawing, background results
/// and sampler ticks. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    list: &mut TrackList,
    player: &mut Player,
    channels: &Channels,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(update) = channels.catalog_rx.try_recv() {
            let diff = list.apply_update(update);
            if !diff.is_empty() {
                info!(
                    "chart changed: {} new, {} gone",
                    diff.inserted.len(),
                    diff.removed.len()
                );
            }
            if settings.ui.show_covers {
                request_covers(list, &diff, &channels.cover_tx);
            }
        }

        while let Ok(update) = channels.cover_rx.try_recv() {
            list.set_cover(update);
        }

        while let Ok(event) = channels.selections.try_recv() {
            match event {
                AppEvent::TrackSelected(track) => {
                    // Failures leave the player idle and are shown in the transport box.
                    let _ = player.select(track);
                }
            }
        }

        player.pump();
        for token in player.timers_mut().due(Instant::now()) {
            player.on_tick(token);
        }

        let view = player.view();
        terminal.draw(|f| {
            ui::draw(
                f,
                list,
                view.as_ref(),
                player.current_track_id(),
                player.last_error(),
                &settings.ui,
            )
        })?;

        if event::poll(poll_timeout(player.timers().next_deadline(), Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, list, player, channels, state) {
                    info!("quit requested");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// How long to wait for input before the next sampler deadline.
fn poll_timeout(next_deadline: Option<Instant>, now: Instant) -> Duration {
    match next_deadline {
        Some(deadline) => deadline.saturating_duration_since(now).min(MAX_POLL),
        None => MAX_POLL,
    }
}

/// Start a cover load for every row that just appeared.
fn request_covers(list: &TrackList, diff: &ListDiff, tx: &Sender<CoverUpdate>) {
    for id in &diff.inserted {
        if let Some(track) = list.tracks().iter().find(|t| t.id == *id) {
            debug!("loading cover of album {} for track {id}", track.album.id);
            spawn_cover_load(*id, track.album.cover_small.clone(), tx.clone());
        }
    }
}

/// Handle one key press. Returns true when the app should quit.
fn handle_key_event<B: MediaBackend, T: TimerHost>(
    key: KeyEvent,
    settings: &config::Settings,
    list: &mut TrackList,
    player: &mut PlaybackController<B, T>,
    channels: &Channels,
    state: &mut EventLoopState,
) -> bool {
    // Two-key prefixes reset on any other key.
    let was_gg = std::mem::take(&mut state.pending_gg);
    let was_zz = std::mem::take(&mut state.pending_zz);

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => list.next(),
        KeyCode::Char('k') | KeyCode::Up => list.prev(),
        KeyCode::Char('g') => {
            if was_gg {
                list.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => list.last(),
        KeyCode::Char('z') => {
            if was_zz {
                if let Some(id) = player.current_track_id() {
                    list.select_id(id);
                }
            } else {
                state.pending_zz = true;
            }
        }
        KeyCode::Enter => {
            list.activate();
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => player.toggle(),
        KeyCode::Char('r') => {
            list.mark_loading();
            spawn_chart_fetch(settings.catalog.clone(), channels.catalog_tx.clone());
        }
        _ => {}
    }

    false
}
