use thiserror::Error;

pub type OverlayResult<T> = Result<T, OverlayError>;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("degenerate face box: {0}")]
    DegenerateBox(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("detection error: {0}")]
    Detection(String),
}

impl From<image::ImageError> for OverlayError {
    fn from(value: image::ImageError) -> Self {
        OverlayError::Decode(value.to_string())
    }
}
