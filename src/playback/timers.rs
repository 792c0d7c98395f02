//! Repeating timers driven by the event loop.

use std::time::{Duration, Instant};

/// Identifies one repeating timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Where the playback controller schedules its progress sampler.
pub trait TimerHost {
    fn start_repeating(&mut self, interval: Duration) -> TimerToken;
    /// Cancel `token`. Cancelling an unknown token is a no-op.
    fn cancel(&mut self, token: TimerToken);
}

struct Repeating {
    token: TimerToken,
    interval: Duration,
    next_due: Instant,
}

/// Timer host polled by the terminal event loop.
#[derive(Default)]
pub struct LoopTimers {
    next_id: u64,
    active: Vec<Repeating>,
}

impl LoopTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens of every timer that came due by `now`. A timer that missed
    /// several intervals fires once and is rescheduled after `now`.
    pub fn due(&mut self, now: Instant) -> Vec<TimerToken> {
        let mut fired = Vec::new();
        for t in &mut self.active {
            if t.next_due <= now {
                fired.push(t.token);
                while t.next_due <= now {
                    t.next_due += t.interval;
                }
            }
        }
        fired
    }

    /// Earliest upcoming deadline, used to bound the input poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.iter().map(|t| t.next_due).min()
    }
}

impl TimerHost for LoopTimers {
    fn start_repeating(&mut self, interval: Duration) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken(self.next_id);
        let interval = interval.max(Duration::from_millis(1));
        self.active.push(Repeating {
            token,
            interval,
            next_due: Instant::now() + interval,
        });
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.active.retain(|t| t.token != token);
    }
}
