use std::iter;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::catalog::Track;
use crate::config::PlaybackSettings;
use crate::format::{format_clock, format_remaining, progress_ratio};

use super::media::{MediaBackend, MediaHandle};
use super::timers::{TimerHost, TimerToken};
use super::types::{MediaError, MediaStatus, PlaybackState};

/// State of the currently loaded track.
pub struct PlaybackSession<H> {
    pub track: Arc<Track>,
    pub is_playing: bool,
    pub elapsed_secs: f64,
    /// NaN until the media header resolves (or forever, if the length is unknown).
    pub duration_secs: f64,
    pub progress: f64,
    /// Set once the stream played to its end.
    pub finished: bool,
    sampler: Option<TimerToken>,
    handle: H,
}

/// What the transport box shows. Built fresh on every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportView {
    pub state: PlaybackState,
    pub is_playing: bool,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub elapsed_label: String,
    pub end_label: String,
    pub remaining_label: String,
    pub progress: f64,
}

/// Owns the one audio session and drives it through
/// `Idle -> Loading -> Playing <-> Paused`.
pub struct PlaybackController<B: MediaBackend, T: TimerHost> {
    backend: B,
    timers: T,
    session: Option<PlaybackSession<B::Handle>>,
    state: PlaybackState,
    sample_interval: Duration,
    autoplay: bool,
    last_error: Option<MediaError>,
}

impl<B: MediaBackend, T: TimerHost> PlaybackController<B, T> {
    pub fn new(backend: B, timers: T, settings: &PlaybackSettings) -> Self {
        Self {
            backend,
            timers,
            session: None,
            state: PlaybackState::Idle,
            sample_interval: Duration::from_millis(settings.sample_interval_ms.max(1)),
            autoplay: settings.autoplay_on_select,
            last_error: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> Option<&PlaybackSession<B::Handle>> {
        self.session.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_playing)
    }

    /// Id of the loaded track, if any.
    pub fn current_track_id(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.track.id)
    }

    /// The most recent media failure, cleared by the next successful select.
    pub fn last_error(&self) -> Option<&MediaError> {
        self.last_error.as_ref()
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }

    /// Load `track`, superseding whatever was loaded before.
    ///
    /// The previous sampler is cancelled and its handle stopped before the new
    /// stream is opened. On failure the controller is left `Idle`.
    pub fn select(&mut self, track: Arc<Track>) -> Result<(), MediaError> {
        let play = self.autoplay;
        self.load(track, play)
    }

    fn load(&mut self, track: Arc<Track>, play: bool) -> Result<(), MediaError> {
        self.teardown_session();

        let mut handle = match self.backend.open(&track.preview) {
            Ok(h) => h,
            Err(e) => {
                warn!("cannot open preview for track {}: {e}", track.id);
                self.state = PlaybackState::Idle;
                self.last_error = Some(e.clone());
                return Err(e);
            }
        };

        if play {
            handle.play();
        } else {
            handle.pause();
        }

        let sampler = self.timers.start_repeating(self.sample_interval);
        info!("loading preview for {} ({})", track.display(), track.id);
        self.session = Some(PlaybackSession {
            track,
            is_playing: play,
            elapsed_secs: 0.0,
            duration_secs: f64::NAN,
            progress: 0.0,
            finished: false,
            sampler: Some(sampler),
            handle,
        });
        self.state = PlaybackState::Loading;
        self.last_error = None;
        Ok(())
    }

    /// Flip between playing and paused. After the track ended this replays it.
    pub fn toggle(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.finished {
            let track = session.track.clone();
            // Failure is already logged and recorded in `last_error`.
            let _ = self.load(track, true);
            return;
        }

        if session.is_playing {
            session.handle.pause();
        } else {
            session.handle.play();
        }
        session.is_playing = !session.is_playing;

        if self.state != PlaybackState::Loading {
            self.state = if session.is_playing {
                PlaybackState::Playing
            } else {
                PlaybackState::Paused
            };
        }
        debug!("playback toggled, now {:?}", self.state);
    }

    /// Apply pending media status changes. Called once per event-loop turn.
    pub fn pump(&mut self) {
        let statuses: Vec<MediaStatus> = match self.session.as_mut() {
            Some(s) => iter::from_fn(|| s.handle.poll_status()).collect(),
            None => return,
        };

        for status in statuses {
            match status {
                MediaStatus::Ready { duration_secs } => self.on_ready(duration_secs),
                MediaStatus::Failed(e) => {
                    warn!("preview failed to load: {e}");
                    self.last_error = Some(e);
                    self.teardown();
                    return;
                }
                MediaStatus::Finished => self.on_finished(),
            }
        }
    }

    fn on_ready(&mut self, duration_secs: f64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.duration_secs = duration_secs;
        if self.state == PlaybackState::Loading {
            self.state = if session.is_playing {
                PlaybackState::Playing
            } else {
                PlaybackState::Paused
            };
            info!(
                "preview ready ({}), {:?}",
                format_clock(duration_secs),
                self.state
            );
        }
    }

    fn on_finished(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(tok) = session.sampler.take() {
            self.timers.cancel(tok);
        }
        session.finished = true;
        session.is_playing = false;
        session.elapsed_secs = if session.duration_secs.is_finite() {
            session.duration_secs
        } else {
            session.handle.position()
        };
        session.progress = 1.0;
        self.state = PlaybackState::Paused;
        debug!("preview for track {} finished", session.track.id);
    }

    /// Sampler tick: refresh elapsed time and progress from the player clock.
    pub fn on_tick(&mut self, token: TimerToken) {
        let Some(session) = self.session.as_mut() else {
            debug!("tick {token:?} with no session loaded");
            return;
        };
        if session.sampler != Some(token) {
            debug!("ignoring stale tick {token:?}");
            return;
        }
        // Paused clocks do not move; nothing to recompute.
        if session.handle.is_paused() {
            return;
        }

        session.elapsed_secs = session.handle.position();
        if let Some(p) = progress_ratio(session.elapsed_secs, session.duration_secs) {
            session.progress = p;
        }
    }

    /// Stop playback and drop the session; the controller returns to `Idle`.
    pub fn teardown(&mut self) {
        self.teardown_session();
        self.state = PlaybackState::Idle;
    }

    fn teardown_session(&mut self) {
        if let Some(mut old) = self.session.take() {
            if let Some(tok) = old.sampler.take() {
                self.timers.cancel(tok);
            }
            old.handle.stop();
        }
    }

    /// Labels and progress for the transport box, or `None` when nothing is loaded.
    pub fn view(&self) -> Option<TransportView> {
        let s = self.session.as_ref()?;
        Some(TransportView {
            state: self.state,
            is_playing: s.is_playing,
            title: s.track.title.clone(),
            artist: s.track.artist.name.clone(),
            album: s.track.album.title.clone(),
            elapsed_label: format_clock(s.elapsed_secs),
            end_label: format_clock(s.duration_secs),
            remaining_label: format_remaining(s.elapsed_secs, s.duration_secs),
            progress: s.progress,
        })
    }
}
