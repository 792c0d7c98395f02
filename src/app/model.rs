//! The track list presenter: rows, cursor and activation.
//!
//! `TrackList` turns the fetched chart into display rows, keeps the cursor
//! stable across refreshes and publishes `AppEvent::TrackSelected` when a
//! row is activated.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::info;

use crate::catalog::{CatalogUpdate, Track};
use crate::cover::{CoverUpdate, Rgb};
use crate::events::{AppEvent, EventBus};

/// Where the chart currently stands, as far as the list is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    /// The last fetch failed; the list is empty and a retry is possible.
    Unavailable(String),
}

/// One rendered list row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: u64,
    pub title: String,
    pub artist: String,
    /// Average cover colour once the thumbnail arrived; `None` until then or on failure.
    pub cover: Option<Rgb>,
}

/// What changed between two applied track sequences, by id.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListDiff {
    /// Ids that were not shown before, in list order. These need a cover load.
    pub inserted: Vec<u64>,
    /// Ids that are no longer shown.
    pub removed: Vec<u64>,
}

impl ListDiff {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.removed.is_empty()
    }
}

pub struct TrackList {
    tracks: Vec<Arc<Track>>,
    rows: Vec<Row>,
    pub selected: usize,
    pub status: CatalogStatus,
    bus: EventBus<AppEvent>,
}

impl TrackList {
    /// Create an empty list that publishes selections on `bus`.
    pub fn new(bus: EventBus<AppEvent>) -> Self {
        Self {
            tracks: Vec::new(),
            rows: Vec::new(),
            selected: 0,
            status: CatalogStatus::Loading,
            bus,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn tracks(&self) -> &[Arc<Track>] {
        &self.tracks
    }

    /// Flag that a fetch is in flight.
    pub fn mark_loading(&mut self) {
        self.status = CatalogStatus::Loading;
    }

    /// Apply a finished fetch: record its status and show its tracks.
    pub fn apply_update(&mut self, update: CatalogUpdate) -> ListDiff {
        self.status = match update.failure {
            Some(reason) => CatalogStatus::Unavailable(reason),
            None => CatalogStatus::Ready,
        };
        self.apply(update.tracks)
    }

    /// Replace the shown tracks with `tracks`, diffing by id.
    ///
    /// Rows whose id survives keep their cover; the cursor stays on the same id
    /// when possible. Applying the same sequence twice is a no-op.
    pub fn apply(&mut self, tracks: Vec<Arc<Track>>) -> ListDiff {
        let selected_id = self.rows.get(self.selected).map(|r| r.id);

        let old_ids: HashSet<u64> = self.rows.iter().map(|r| r.id).collect();
        let new_ids: HashSet<u64> = tracks.iter().map(|t| t.id).collect();
        let covers: HashMap<u64, Option<Rgb>> =
            self.rows.iter().map(|r| (r.id, r.cover)).collect();

        let mut diff = ListDiff::default();
        let mut seen: HashSet<u64> = HashSet::new();
        for t in &tracks {
            if !old_ids.contains(&t.id) && seen.insert(t.id) {
                diff.inserted.push(t.id);
            }
        }
        let mut seen: HashSet<u64> = HashSet::new();
        for r in &self.rows {
            if !new_ids.contains(&r.id) && seen.insert(r.id) {
                diff.removed.push(r.id);
            }
        }

        self.rows = tracks
            .iter()
            .map(|t| Row {
                id: t.id,
                title: t.title.clone(),
                artist: t.artist.name.clone(),
                cover: covers.get(&t.id).copied().flatten(),
            })
            .collect();
        self.tracks = tracks;

        self.selected = selected_id
            .and_then(|id| self.rows.iter().position(|r| r.id == id))
            .unwrap_or_else(|| self.selected.min(self.rows.len().saturating_sub(1)));

        diff
    }

    /// Store a finished cover load. Returns false when the row is gone.
    pub fn set_cover(&mut self, update: CoverUpdate) -> bool {
        let mut found = false;
        for row in self.rows.iter_mut().filter(|r| r.id == update.id) {
            row.cover = update.colour;
            found = true;
        }
        found
    }

    pub fn selected_track(&self) -> Option<&Arc<Track>> {
        self.tracks.get(self.selected)
    }

    /// Publish the highlighted track as selected. Returns it when there was one.
    pub fn activate(&mut self) -> Option<Arc<Track>> {
        let track = self.selected_track()?.clone();
        info!("track selected: {} ({})", track.display(), track.id);
        self.bus.publish(AppEvent::TrackSelected(track.clone()));
        Some(track)
    }

    /// Move the cursor down, wrapping to the top.
    pub fn next(&mut self) {
        if !self.rows.is_empty() {
            self.selected = (self.selected + 1) % self.rows.len();
        }
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        if !self.rows.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.rows.len() - 1);
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
    }

    /// Move the cursor onto the row showing `id`, if any.
    pub fn select_id(&mut self, id: u64) {
        if let Some(pos) = self.rows.iter().position(|r| r.id == id) {
            self.selected = pos;
        }
    }
}
