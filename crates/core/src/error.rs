use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrbitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageEncode(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for OrbitError {
    fn from(e: image::ImageError) -> Self {
        OrbitError::ImageEncode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrbitError>;
