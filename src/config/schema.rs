use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// API root, e.g. `https://api.deezer.com`.
    pub base_url: String,
    /// Path of the chart resource under `base_url`.
    pub chart_path: String,
    /// JSON pointers tried in order to locate the track array in the response.
    ///
    /// Example: ["/tracks/data", "/data"]
    pub envelope: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.deezer.com".to_string(),
            chart_path: "chart".to_string(),
            envelope: vec!["/tracks/data".to_string(), "/data".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often the progress sampler refreshes elapsed time (milliseconds).
    pub sample_interval_ms: u64,
    /// Whether selecting a track starts playing it right away.
    pub autoplay_on_select: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 500,
            autoplay_on_select: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which time fields to show in the transport box, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub time_fields: Vec<TimeField>,

    /// Separator used to join `time_fields`.
    pub time_separator: String,

    /// Whether to fetch album covers and show their colour swatch next to each row.
    pub show_covers: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Today's chart, thirty seconds at a time ~ ".to_string(),
            time_fields: vec![TimeField::Elapsed, TimeField::Total],
            time_separator: " / ".to_string(),
            show_covers: true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    #[serde(alias = "duration", alias = "end")]
    Total,
    Remaining,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter directives, e.g. `info` or `encore=debug`.
    pub level: String,
    /// Log file path. Defaults to `$XDG_STATE_HOME/encore/encore.log`.
    pub file: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
