use super::types::{MediaError, MediaStatus};

/// An opened, playable stream.
pub trait MediaHandle {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Current playback position in seconds. Does not advance while paused.
    fn position(&self) -> f64;
    /// Next pending status change, if any. Called from the event loop.
    fn poll_status(&mut self) -> Option<MediaStatus>;
    /// Stop output for good; the handle is dropped right after.
    fn stop(&mut self);
}

/// Something that can turn a URL into a [`MediaHandle`].
///
/// `open` returns immediately; the stream resolves later through
/// [`MediaHandle::poll_status`].
pub trait MediaBackend {
    type Handle: MediaHandle;

    fn open(&mut self, url: &str) -> Result<Self::Handle, MediaError>;
}
