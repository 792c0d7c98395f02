use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::config::CatalogSettings;

use super::model::Track;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chart endpoint answered with status {0}")]
    Status(u16),

    #[error("failed to decode chart payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no track list found under any of {0:?}")]
    MissingEnvelope(Vec<String>),
}

/// Something that can GET a URL and hand back the body.
///
/// The real implementation is [`HttpTransport`]; tests plug in canned bodies.
pub trait ChartTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking `reqwest` client used from the fetch thread.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("encore/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl ChartTransport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.bytes()?.to_vec())
    }
}

/// A finished chart fetch, delivered to the event loop.
#[derive(Debug, Default)]
pub struct CatalogUpdate {
    pub tracks: Vec<Arc<Track>>,
    /// Set when the fetch failed; `tracks` is empty in that case.
    pub failure: Option<String>,
}

/// Full chart URL from `base_url` + `chart_path`, tolerating slashes on either side.
pub fn chart_url(settings: &CatalogSettings) -> String {
    format!(
        "{}/{}",
        settings.base_url.trim_end_matches('/'),
        settings.chart_path.trim_start_matches('/')
    )
}

/// Decode a chart body, looking for the track array under each pointer in `envelope`.
///
/// The first pointer that resolves to an array wins.
pub fn decode_chart(body: &[u8], envelope: &[String]) -> Result<Vec<Track>, FetchError> {
    let root: serde_json::Value = serde_json::from_slice(body)?;

    let items = envelope
        .iter()
        .filter_map(|pointer| root.pointer(pointer))
        .find(|v| v.is_array())
        .ok_or_else(|| FetchError::MissingEnvelope(envelope.to_vec()))?;

    Ok(Vec::<Track>::deserialize(items)?)
}

/// Fetch and decode the chart, surfacing failures.
pub fn try_fetch_chart(
    transport: &impl ChartTransport,
    settings: &CatalogSettings,
) -> Result<Vec<Track>, FetchError> {
    let url = chart_url(settings);
    info!("fetching chart from {url}");
    let body = transport.get(&url)?;
    let tracks = decode_chart(&body, &settings.envelope)?;
    info!("chart fetched: {} tracks", tracks.len());
    Ok(tracks)
}

/// Fetch the chart; any network or decode failure yields an empty list.
pub fn fetch_chart(transport: &impl ChartTransport, settings: &CatalogSettings) -> Vec<Track> {
    try_fetch_chart(transport, settings).unwrap_or_else(|e| {
        warn!("chart fetch failed: {e}");
        Vec::new()
    })
}

/// Run one chart fetch on a background thread and send the outcome to `tx`.
///
/// If the receiver is gone by the time the fetch finishes the result is dropped.
pub fn spawn_chart_fetch(settings: CatalogSettings, tx: Sender<CatalogUpdate>) -> JoinHandle<()> {
    thread::spawn(move || {
        let outcome = HttpTransport::new().and_then(|t| try_fetch_chart(&t, &settings));
        let update = match outcome {
            Ok(tracks) => CatalogUpdate {
                tracks: tracks.into_iter().map(Arc::new).collect(),
                failure: None,
            },
            Err(e) => {
                warn!("chart fetch failed: {e}");
                CatalogUpdate {
                    tracks: Vec::new(),
                    failure: Some(e.to_string()),
                }
            }
        };
        let _ = tx.send(update);
    })
}
