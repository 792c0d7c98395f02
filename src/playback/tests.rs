use super::*;
use crate::catalog::{Album, Artist, Track, decode_chart};
use crate::config::PlaybackSettings;
use crate::format::PLACEHOLDER;
use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// One stream opened through `FakeBackend`.
#[derive(Debug)]
struct FakeMedia {
    url: String,
    paused: bool,
    position: f64,
    pending: VecDeque<MediaStatus>,
    stopped: bool,
}

#[derive(Default)]
struct World {
    fail_next_open: Option<MediaError>,
    handles: Vec<Rc<RefCell<FakeMedia>>>,
}

impl World {
    fn live_handles(&self) -> usize {
        self.handles.iter().filter(|h| !h.borrow().stopped).count()
    }

    fn last(&self) -> Rc<RefCell<FakeMedia>> {
        self.handles.last().cloned().unwrap()
    }
}

struct FakeBackend {
    world: Rc<RefCell<World>>,
}

struct FakeHandle {
    media: Rc<RefCell<FakeMedia>>,
}

impl MediaBackend for FakeBackend {
    type Handle = FakeHandle;

    fn open(&mut self, url: &str) -> Result<FakeHandle, MediaError> {
        let mut world = self.world.borrow_mut();
        if let Some(e) = world.fail_next_open.take() {
            return Err(e);
        }
        let media = Rc::new(RefCell::new(FakeMedia {
            url: url.to_string(),
            paused: true,
            position: 0.0,
            pending: VecDeque::new(),
            stopped: false,
        }));
        world.handles.push(media.clone());
        Ok(FakeHandle { media })
    }
}

impl MediaHandle for FakeHandle {
    fn play(&mut self) {
        self.media.borrow_mut().paused = false;
    }

    fn pause(&mut self) {
        self.media.borrow_mut().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.media.borrow().paused
    }

    fn position(&self) -> f64 {
        self.media.borrow().position
    }

    fn poll_status(&mut self) -> Option<MediaStatus> {
        self.media.borrow_mut().pending.pop_front()
    }

    fn stop(&mut self) {
        let mut m = self.media.borrow_mut();
        m.stopped = true;
        m.paused = true;
    }
}

/// Timer host that only counts what is active; ticks are delivered by hand.
#[derive(Default)]
struct CountingTimers {
    next_id: u64,
    active: BTreeSet<u64>,
    intervals: Vec<Duration>,
}

impl CountingTimers {
    fn active_tokens(&self) -> Vec<TimerToken> {
        self.active.iter().map(|&id| TimerToken(id)).collect()
    }

    fn only_token(&self) -> TimerToken {
        let tokens = self.active_tokens();
        assert_eq!(tokens.len(), 1, "expected exactly one active sampler");
        tokens[0]
    }
}

impl TimerHost for CountingTimers {
    fn start_repeating(&mut self, interval: Duration) -> TimerToken {
        self.next_id += 1;
        self.active.insert(self.next_id);
        self.intervals.push(interval);
        TimerToken(self.next_id)
    }

    fn cancel(&mut self, token: TimerToken) {
        self.active.remove(&token.0);
    }
}

type Controller = PlaybackController<FakeBackend, CountingTimers>;

fn controller_with(settings: PlaybackSettings) -> (Controller, Rc<RefCell<World>>) {
    let world = Rc::new(RefCell::new(World::default()));
    let backend = FakeBackend {
        world: world.clone(),
    };
    (
        PlaybackController::new(backend, CountingTimers::default(), &settings),
        world,
    )
}

fn controller() -> (Controller, Rc<RefCell<World>>) {
    controller_with(PlaybackSettings::default())
}

fn track(id: u64) -> Arc<Track> {
    Arc::new(Track {
        id,
        title: format!("Song {id}"),
        preview: format!("http://x/{id}.mp3"),
        artist: Artist {
            name: format!("Artist {id}"),
        },
        album: Album {
            id: 9,
            title: "Alb".into(),
            cover_small: "http://x/c.jpg".into(),
        },
    })
}

fn resolve(world: &Rc<RefCell<World>>, duration_secs: f64) {
    world
        .borrow()
        .last()
        .borrow_mut()
        .pending
        .push_back(MediaStatus::Ready { duration_secs });
}

fn set_position(world: &Rc<RefCell<World>>, secs: f64) {
    world.borrow().last().borrow_mut().position = secs;
}

#[test]
fn selecting_a_fetched_track_goes_idle_loading_playing() {
    let body = br#"{"data":[{"id":1,"title":"A","preview":"http://x/a.mp3","artist":{"name":"Artist1"},"album":{"id":9,"title":"Alb","cover_small":"http://x/a.jpg"}}]}"#;
    let tracks = decode_chart(body, &["/data".to_string()]).unwrap();
    let (mut c, world) = controller();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.view().is_none());

    c.select(Arc::new(tracks[0].clone())).unwrap();
    assert_eq!(c.state(), PlaybackState::Loading);
    assert!(c.is_playing());
    let view = c.view().unwrap();
    assert_eq!(view.title, "A");
    assert_eq!(view.artist, "Artist1");
    assert_eq!(view.album, "Alb");
    assert_eq!(view.elapsed_label, "00:00:00");
    assert_eq!(view.end_label, PLACEHOLDER);
    assert_eq!(view.progress, 0.0);
    assert_eq!(world.borrow().last().borrow().url, "http://x/a.mp3");
    assert!(!world.borrow().last().borrow().paused);
    assert_eq!(c.timers().intervals, vec![Duration::from_millis(500)]);

    resolve(&world, 30.0);
    c.pump();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.view().unwrap().end_label, "00:00:30");
}

#[test]
fn selecting_again_leaves_exactly_one_sampler_and_handle() {
    let (mut c, world) = controller();

    c.select(track(1)).unwrap();
    resolve(&world, 30.0);
    c.pump();
    let first = world.borrow().last();

    c.select(track(2)).unwrap();
    c.select(track(3)).unwrap();

    assert_eq!(c.timers().active_tokens().len(), 1);
    assert_eq!(world.borrow().live_handles(), 1);
    assert!(first.borrow().stopped);
    assert_eq!(c.current_track_id(), Some(3));
    assert_eq!(c.state(), PlaybackState::Loading);
}

#[test]
fn stale_tick_from_superseded_track_is_ignored() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();
    let old = c.timers().only_token();

    c.select(track(2)).unwrap();
    set_position(&world, 12.0);

    c.on_tick(old);
    assert_eq!(c.session().unwrap().elapsed_secs, 0.0);

    c.on_tick(c.timers().only_token());
    assert_eq!(c.session().unwrap().elapsed_secs, 12.0);
}

#[test]
fn ticks_update_elapsed_and_clamped_progress() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();
    resolve(&world, 30.0);
    c.pump();
    let tok = c.timers().only_token();

    set_position(&world, 15.0);
    c.on_tick(tok);
    let view = c.view().unwrap();
    assert_eq!(view.elapsed_label, "00:00:15");
    assert_eq!(view.remaining_label, "-00:00:15");
    assert_eq!(view.progress, 0.5);

    set_position(&world, 31.5);
    c.on_tick(tok);
    assert_eq!(c.view().unwrap().progress, 1.0);
}

#[test]
fn unknown_duration_shows_placeholder_and_freezes_progress() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();
    resolve(&world, f64::NAN);
    c.pump();
    assert_eq!(c.state(), PlaybackState::Playing);

    set_position(&world, 4.0);
    c.on_tick(c.timers().only_token());
    let view = c.view().unwrap();
    assert_eq!(view.end_label, PLACEHOLDER);
    assert_eq!(view.remaining_label, PLACEHOLDER);
    assert_eq!(view.elapsed_label, "00:00:04");
    assert_eq!(view.progress, 0.0);
}

#[test]
fn zero_duration_does_not_update_progress() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();
    resolve(&world, 0.0);
    c.pump();

    set_position(&world, 2.0);
    c.on_tick(c.timers().only_token());
    assert_eq!(c.view().unwrap().progress, 0.0);
}

#[test]
fn toggling_twice_restores_play_state_and_elapsed() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();
    resolve(&world, 30.0);
    c.pump();
    set_position(&world, 7.0);
    c.on_tick(c.timers().only_token());

    let before = c.is_playing();
    let elapsed = c.session().unwrap().elapsed_secs;

    c.toggle();
    assert_eq!(c.state(), PlaybackState::Paused);
    assert!(world.borrow().last().borrow().paused);
    // The paused clock does not move, so ticks keep the same elapsed.
    c.on_tick(c.timers().only_token());
    assert_eq!(c.session().unwrap().elapsed_secs, elapsed);

    c.toggle();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.is_playing(), before);
    assert_eq!(c.session().unwrap().elapsed_secs, elapsed);
    assert!(!world.borrow().last().borrow().paused);
}

#[test]
fn toggle_while_loading_keeps_loading_and_resolves_paused() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();

    c.toggle();
    assert_eq!(c.state(), PlaybackState::Loading);
    assert!(!c.is_playing());

    resolve(&world, 30.0);
    c.pump();
    assert_eq!(c.state(), PlaybackState::Paused);
}

#[test]
fn toggle_without_track_is_a_no_op() {
    let (mut c, _world) = controller();
    c.toggle();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(!c.is_playing());
}

#[test]
fn open_failure_reverts_to_idle_without_sampler() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();

    world.borrow_mut().fail_next_open = Some(MediaError::Output("no device".into()));
    let err = c.select(track(2)).unwrap_err();

    assert_eq!(err, MediaError::Output("no device".into()));
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.session().is_none());
    assert!(c.timers().active_tokens().is_empty());
    assert_eq!(world.borrow().live_handles(), 0);
    assert_eq!(c.last_error(), Some(&MediaError::Output("no device".into())));

    c.select(track(3)).unwrap();
    assert!(c.last_error().is_none());
}

#[test]
fn async_load_failure_reverts_to_idle() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();
    world
        .borrow()
        .last()
        .borrow_mut()
        .pending
        .push_back(MediaStatus::Failed(MediaError::Decode("not audio".into())));

    c.pump();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.timers().active_tokens().is_empty());
    assert_eq!(world.borrow().live_handles(), 0);
    assert!(matches!(c.last_error(), Some(MediaError::Decode(_))));
}

#[test]
fn finishing_pauses_at_the_end_and_toggle_replays() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();
    resolve(&world, 30.0);
    world
        .borrow()
        .last()
        .borrow_mut()
        .pending
        .push_back(MediaStatus::Finished);
    c.pump();

    assert_eq!(c.state(), PlaybackState::Paused);
    assert!(c.timers().active_tokens().is_empty());
    let view = c.view().unwrap();
    assert_eq!(view.elapsed_label, "00:00:30");
    assert_eq!(view.progress, 1.0);

    c.toggle();
    assert_eq!(c.state(), PlaybackState::Loading);
    assert!(c.is_playing());
    assert_eq!(world.borrow().handles.len(), 2);
    assert_eq!(world.borrow().live_handles(), 1);
    assert_eq!(c.timers().active_tokens().len(), 1);
    assert_eq!(c.view().unwrap().elapsed_label, "00:00:00");
}

#[test]
fn teardown_cancels_everything() {
    let (mut c, world) = controller();
    c.select(track(1)).unwrap();
    resolve(&world, 30.0);
    c.pump();

    c.teardown();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.session().is_none());
    assert!(c.timers().active_tokens().is_empty());
    assert_eq!(world.borrow().live_handles(), 0);

    // Late ticks after teardown do nothing.
    c.on_tick(TimerToken(1));
    assert!(c.view().is_none());
}

#[test]
fn autoplay_off_loads_paused() {
    let (mut c, world) = controller_with(PlaybackSettings {
        sample_interval_ms: 250,
        autoplay_on_select: false,
    });
    c.select(track(1)).unwrap();
    assert!(!c.is_playing());
    assert!(world.borrow().last().borrow().paused);
    assert_eq!(c.timers().intervals, vec![Duration::from_millis(250)]);

    resolve(&world, 30.0);
    c.pump();
    assert_eq!(c.state(), PlaybackState::Paused);
}

#[test]
fn controller_works_with_loop_timers() {
    let world = Rc::new(RefCell::new(World::default()));
    let mut c = PlaybackController::new(
        FakeBackend {
            world: world.clone(),
        },
        LoopTimers::new(),
        &PlaybackSettings::default(),
    );

    c.select(track(1)).unwrap();
    c.select(track(2)).unwrap();

    set_position(&world, 1.0);
    let later = std::time::Instant::now() + Duration::from_secs(1);
    let due = c.timers_mut().due(later);
    assert_eq!(due.len(), 1);
    for tok in due {
        c.on_tick(tok);
    }
    assert_eq!(c.session().unwrap().elapsed_secs, 1.0);

    c.teardown();
    assert!(c.timers().next_deadline().is_none());
}
