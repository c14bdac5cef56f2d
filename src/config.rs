use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::geometry::{CrsChoice, GeometryBuilder, DEFAULT_SEGMENTS_PER_QUADRANT};
use crate::models::RadiusBounds;
use crate::source::{ColumnNames, SourceLocation, DEFAULT_SOURCE_URL};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub radius: RadiusBounds,
    pub geometry: GeometryConfig,
    pub interactive: InteractiveConfig,
    pub static_map: StaticMapConfig,
    pub export: ExportConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    /// HTTP(S) URL, file:// URL or local path of the campus CSV
    pub url: String,
    pub columns: ColumnNames,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            columns: ColumnNames::default(),
        }
    }
}

impl SourceConfig {
    pub fn location(&self) -> Result<SourceLocation> {
        self.url
            .parse()
            .with_context(|| format!("Invalid campus source: {}", self.url))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeometryConfig {
    pub crs: CrsChoice,
    pub segments_per_quadrant: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            crs: CrsChoice::default(),
            segments_per_quadrant: DEFAULT_SEGMENTS_PER_QUADRANT,
        }
    }
}

impl GeometryConfig {
    pub fn builder(&self) -> GeometryBuilder {
        GeometryBuilder::new(self.crs, self.segments_per_quadrant)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InteractiveConfig {
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            zoom: 16,
            tile_url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StaticMapConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for StaticMapConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// Headless browser used for PNG capture of the interactive map.
    /// Searched on PATH when unset.
    pub browser: Option<PathBuf>,
    pub capture_delay_secs: u64,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            browser: None,
            capture_delay_secs: 5,
            window_width: 700,
            window_height: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8501".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig =
            toml::from_str(&content).context("Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}
