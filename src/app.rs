//! Application module: exposes the track list presenter used by the TUI and runtime.
//!
//! The `TrackList` model lives in `app::model` and holds the fetched chart,
//! its display rows and the cursor.

mod model;

pub use model::*;
