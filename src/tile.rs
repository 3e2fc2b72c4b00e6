// tile.rs — 全景图块请求与 Street View Static API 图源
//
// Fetching and decoding the bitmap happens outside this crate; a source only
// learns which view to show next.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::projector::{Orientation, ViewportConfig};

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/streetview";

/// Largest edge the Static API serves.
pub const MAX_TILE_SIZE: u32 = 640;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
}

impl GeoLocation {
    /// Latitude in [-90, 90], longitude in [-180, 180].
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(ViewerError::InvalidLocation(format!("{},{}", lat, lng)));
        }
        Ok(Self { lat, lng })
    }
}

// Unchecked wire form; config files go through `GeoLocation::new`.
#[derive(Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawLocation> for GeoLocation {
    type Error = ViewerError;

    fn try_from(raw: RawLocation) -> Result<Self> {
        Self::new(raw.lat, raw.lng)
    }
}

impl Default for GeoLocation {
    fn default() -> Self {
        Self {
            lat: 40.457375,
            lng: -80.009353,
        }
    }
}

impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for GeoLocation {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ViewerError::InvalidLocation(s.to_string());

        let (lat, lng) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

        Self::new(lat, lng).map_err(|_| invalid())
    }
}

/// Everything an image collaborator needs to produce one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    pub width: u32,
    pub height: u32,
    pub fov_degrees: f64,
    pub orientation: Orientation,
    pub location: GeoLocation,
}

impl TileRequest {
    pub fn new(config: &ViewportConfig, orientation: Orientation, location: GeoLocation) -> Self {
        Self {
            width: config.width(),
            height: config.height(),
            fov_degrees: config.fov_degrees(),
            orientation,
            location,
        }
    }
}

/// Image retrieval collaborator, told to show a new view.
pub trait TileSource {
    fn refresh(&mut self, request: &TileRequest) -> Result<()>;
}

/// Rounds to the URL precision before wrapping, so nothing can print as 360.
fn normalize_heading(heading: f64) -> f64 {
    let rounded = (heading * 1e4).round() / 1e4;
    rounded.rem_euclid(360.0)
}

/// Formats an angle with at most four decimals and no trailing zeros.
fn format_angle(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Builds Street View Static API URLs and remembers the last one.
#[derive(Debug, Clone)]
pub struct StreetViewSource {
    endpoint: String,
    api_key: Option<String>,
    last_url: Option<String>,
}

impl Default for StreetViewSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, None)
    }
}

impl StreetViewSource {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            last_url: None,
        }
    }

    pub fn url_for(&self, request: &TileRequest) -> Result<String> {
        if !request.orientation.is_finite() {
            return Err(ViewerError::Tile(format!(
                "non-finite orientation {:?}",
                request.orientation
            )));
        }
        if request.width > MAX_TILE_SIZE || request.height > MAX_TILE_SIZE {
            return Err(ViewerError::TileTooLarge {
                width: request.width,
                height: request.height,
                max: MAX_TILE_SIZE,
            });
        }

        let mut url = format!(
            "{}?location={}&size={}x{}&fov={}&heading={}&pitch={}",
            self.endpoint,
            request.location,
            request.width,
            request.height,
            format_angle(request.fov_degrees),
            format_angle(normalize_heading(request.orientation.heading)),
            format_angle(request.orientation.pitch),
        );
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        Ok(url)
    }

    pub fn last_url(&self) -> Option<&str> {
        self.last_url.as_deref()
    }
}

impl TileSource for StreetViewSource {
    fn refresh(&mut self, request: &TileRequest) -> Result<()> {
        let url = self.url_for(request)?;
        log::debug!("tile url: {}", url);
        self.last_url = Some(url);
        Ok(())
    }
}
