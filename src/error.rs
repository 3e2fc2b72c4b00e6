use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Invalid viewport dimensions: {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("Field of view must lie strictly between 0 and 180 degrees, got {0}")]
    InvalidFieldOfView(f64),

    #[error("Click at ({u}, {v}) does not map to a finite orientation")]
    DegenerateClick { u: f64, v: f64 },

    #[error("Tile request rejected: {0}")]
    Tile(String),

    #[error("Tile size {width}x{height} exceeds the {max}px limit")]
    TileTooLarge { width: u32, height: u32, max: u32 },

    #[error("Invalid location {0:?}, expected \"lat,lng\"")]
    InvalidLocation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
