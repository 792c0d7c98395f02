//! Playback-related small types.
//!
//! This module defines the controller states, the media status notifications
//! and the errors reported by the media backend.

use thiserror::Error;

/// The playback state of the controller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// No track loaded.
    #[default]
    Idle,
    /// A track was selected and its media header has not resolved yet.
    Loading,
    Playing,
    Paused,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("failed to download preview: {0}")]
    Download(String),

    #[error("failed to decode preview: {0}")]
    Decode(String),

    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// Asynchronous news from an open media handle. Each variant is reported at most once.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaStatus {
    /// The stream is decodable; `duration_secs` is NaN when the length is unknown.
    Ready { duration_secs: f64 },
    /// The stream could not be opened.
    Failed(MediaError),
    /// Playback reached the end of the stream.
    Finished,
}
