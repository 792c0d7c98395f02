//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{CatalogStatus, Row, TrackList};
use crate::config::{TimeField, UiSettings};
use crate::playback::{MediaError, PlaybackState, TransportView};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("zz", "jump to playing");
    map.insert("enter", "play selected preview");
    map.insert("space/p", "play/pause");
    map.insert("r", "refresh chart");
    map.insert("q", "quit");
    map
});

/// Render the controls help text.
fn controls_text() -> String {
    // Keep the rendered order stable and human-friendly.
    let order = ["j/k", "gg/G", "zz", "enter", "space/p", "r", "q"];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Build the transport time text (elapsed/total/remaining) per `UiSettings`.
fn time_text(view: &TransportView, ui: &UiSettings) -> String {
    ui.time_fields
        .iter()
        .map(|f| match f {
            TimeField::Elapsed => view.elapsed_label.as_str(),
            TimeField::Total => view.end_label.as_str(),
            TimeField::Remaining => view.remaining_label.as_str(),
        })
        .collect::<Vec<&str>>()
        .join(&ui.time_separator)
}

fn state_glyph(view: &TransportView) -> &'static str {
    match (view.state, view.is_playing) {
        (PlaybackState::Loading, _) => "…",
        (_, true) => "▶",
        (_, false) => "⏸",
    }
}

fn list_title(list: &TrackList) -> String {
    match &list.status {
        CatalogStatus::Loading => " chart (loading…) ".to_string(),
        CatalogStatus::Ready => format!(" chart ({}) ", list.rows().len()),
        CatalogStatus::Unavailable(_) => " chart unavailable (r to retry) ".to_string(),
    }
}

fn row_item(row: &Row, playing_id: Option<u64>) -> ListItem<'_> {
    let swatch = match row.cover {
        Some(c) => Span::styled("██ ", Style::default().fg(Color::Rgb(c.0, c.1, c.2))),
        None => Span::raw("   "),
    };
    let mut spans = vec![swatch];
    if row.artist.trim().is_empty() {
        spans.push(Span::raw(row.title.as_str()));
    } else {
        spans.push(Span::raw(format!("{} - {}", row.artist.trim(), row.title)));
    }
    if playing_id == Some(row.id) {
        spans.push(Span::raw(" ♪").bold());
    }
    ListItem::new(Line::from(spans))
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    list: &TrackList,
    transport: Option<&TransportView>,
    playing_id: Option<u64>,
    media_error: Option<&MediaError>,
    ui_settings: &UiSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Transport box
    let transport_block = Block::bordered()
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
        .title(" now playing ");
    let inner = transport_block.inner(chunks[1]);
    frame.render_widget(transport_block, chunks[1]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    match transport {
        Some(view) => {
            let song = Line::from(vec![
                Span::raw(format!("{} ", state_glyph(view))),
                Span::raw(view.title.as_str()).bold(),
                Span::raw(format!(" · {}", view.artist)),
                Span::raw(format!(" · {}", view.album)).italic(),
            ]);
            frame.render_widget(Paragraph::new(song), rows[0]);

            let gauge = Gauge::default()
                .gauge_style(Style::default().add_modifier(Modifier::REVERSED))
                .ratio(view.progress.clamp(0.0, 1.0))
                .label(time_text(view, ui_settings));
            frame.render_widget(gauge, rows[1]);
        }
        None => {
            let text = match media_error {
                Some(e) => format!("Could not play preview: {e}"),
                None => "Nothing playing. Pick a track and press enter.".to_string(),
            };
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
        }
    }

    // Main list
    {
        // Center the selected item when possible by creating a visible window.
        // Important: only build ListItems for the visible window (avoid allocating the entire list).
        let all = list.rows();
        let total = all.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = list.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = all[start..end]
            .iter()
            .map(|row| row_item(row, playing_id))
            .collect();

        let widget = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(list_title(list)))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(widget, chunks[2], &mut state);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
