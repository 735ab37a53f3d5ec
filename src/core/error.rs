use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Invalid map dimensions: {width} x {height} hexes")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Invalid hex name: {0}")]
    InvalidHexName(String),

    #[error("Point ({0}, {1}) is outside the map grid")]
    OutOfBounds(i32, i32),

    #[error("Terrain catalog error: {0}")]
    Catalog(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MapError>;
