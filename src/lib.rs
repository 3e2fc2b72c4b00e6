// lib.rs — 街景全景的点击回中几何

pub mod config;
pub mod error;
pub mod graticule;
pub mod i18n;
pub mod overlay;
pub mod panorama;
pub mod projector;
pub mod tile;

pub use error::{Result, ViewerError};
pub use panorama::{ClickTrace, PanoramaViewer};
pub use projector::{Orientation, PixelCoordinate, Projector, ViewportConfig};
pub use tile::{GeoLocation, StreetViewSource, TileRequest, TileSource};
