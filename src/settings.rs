//! Flat JSON settings blob (theme and chart preferences).
//!
//! Keys this module does not know about are kept as-is and written back on
//! save.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::SettingsError;

const THEME_KEY: &str = "is_dark_theme";
const CHART_KEY: &str = "chart_settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    #[serde(alias = "Лінійний")]
    Line,
    #[serde(alias = "Баровий")]
    Bar,
    #[serde(alias = "Точечний")]
    Point,
    #[serde(alias = "Діаграмма розбросу")]
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSettings {
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default)]
    pub show_sma: bool,
    #[serde(default = "default_line_color")]
    pub line_color: String,
}

fn default_true() -> bool {
    true
}

fn default_line_color() -> String {
    "#2d78d8".to_string()
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            chart_type: ChartType::default(),
            show_grid: true,
            show_sma: false,
            line_color: default_line_color(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    blob: Map<String, Value>,
}

impl SettingsStore {
    /// Read `path`. A missing file gives an empty blob.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let blob = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw)? {
                Value::Object(map) => map,
                _ => return Err(SettingsError::NotAnObject),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Map::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, blob })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.blob
    }

    pub fn is_dark_theme(&self) -> bool {
        self.blob
            .get(THEME_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_dark_theme(&mut self, dark: bool) -> Result<(), SettingsError> {
        self.blob.insert(THEME_KEY.to_string(), Value::Bool(dark));
        self.save()
    }

    /// Stored chart settings, or the defaults when absent or unreadable.
    pub fn chart_settings(&self) -> ChartSettings {
        let Some(raw) = self.blob.get(CHART_KEY) else {
            return ChartSettings::default();
        };
        match serde_json::from_value(raw.clone()) {
            Ok(cs) => cs,
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring malformed chart settings: {e}");
                ChartSettings::default()
            }
        }
    }

    pub fn set_chart_settings(&mut self, chart: &ChartSettings) -> Result<(), SettingsError> {
        self.blob
            .insert(CHART_KEY.to_string(), serde_json::to_value(chart)?);
        self.save()
    }

    /// Write the blob with 4-space indentation, creating parent directories.
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.blob.serialize(&mut ser)?;
        fs::write(&self.path, out)?;
        Ok(())
    }
}
