// config.rs — 应用配置：默认值 <- JSON 文件 <- 命令行

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graticule::GraticuleSettings;
use crate::projector::{Orientation, ViewportConfig};
use crate::tile::{GeoLocation, DEFAULT_ENDPOINT};

#[derive(Parser, Debug, Default)]
#[command(name = "streetview_viewer", about = "Click-to-recenter street-level panorama viewer")]
#[command(version)]
pub struct Cli {
    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// UI language (en, zh-Hans, ...)
    #[arg(long, env = "STREETVIEW_LANG")]
    pub lang: Option<String>,

    /// Viewport width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Horizontal field of view in degrees
    #[arg(long)]
    pub fov: Option<f64>,

    /// Initial heading in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub heading: Option<f64>,

    /// Initial pitch in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub pitch: Option<f64>,

    /// Panorama location as "lat,lng"
    #[arg(long, allow_hyphen_values = true)]
    pub location: Option<GeoLocation>,

    /// Street View Static API key
    #[arg(long, env = "STREETVIEW_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: u32,
    pub height: u32,
    pub fov: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fov: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewport: ViewportSettings,
    pub location: GeoLocation,
    pub start: Orientation,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub lang: String,
    pub graticule: GraticuleSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportSettings::default(),
            location: GeoLocation::default(),
            start: Orientation::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            lang: "en".to_string(),
            graticule: GraticuleSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Loads the `--config` file if given, then applies the remaining flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                log::info!("loading settings from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(lang) = &cli.lang {
            self.lang = lang.clone();
        }
        if let Some(w) = cli.width {
            self.viewport.width = w;
        }
        if let Some(h) = cli.height {
            self.viewport.height = h;
        }
        if let Some(fov) = cli.fov {
            self.viewport.fov = fov;
        }
        if let Some(heading) = cli.heading {
            self.start.heading = heading;
        }
        if let Some(pitch) = cli.pitch {
            self.start.pitch = pitch;
        }
        if let Some(location) = cli.location {
            self.location = location;
        }
        if let Some(key) = &cli.api_key {
            self.api_key = Some(key.clone());
        }
    }

    pub fn viewport_config(&self) -> Result<ViewportConfig> {
        ViewportConfig::new(self.viewport.width, self.viewport.height, self.viewport.fov)
    }
}
