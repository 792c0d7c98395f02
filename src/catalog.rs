//! Chart catalog: the track model and the fetcher that fills it.
//!
//! `catalog::model` holds the decoded `Track` records, `catalog::fetch`
//! talks to the chart endpoint and hands results back to the event loop.

mod fetch;
mod model;

pub use fetch::*;
pub use model::*;
