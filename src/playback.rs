//! Preview playback: the controller state machine and its collaborators.
//!
//! `PlaybackController` owns the single playback session. It talks to audio
//! through the `MediaBackend`/`MediaHandle` traits (implemented with `rodio`
//! in `playback::sink`) and samples progress through a `TimerHost`.

mod controller;
mod media;
mod sink;
mod timers;
mod types;

pub use controller::*;
pub use media::*;
pub use sink::RodioBackend;
pub use timers::*;
pub use types::*;

#[cfg(test)]
mod tests;
