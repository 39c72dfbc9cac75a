//! Error types for qrforge operations

use thiserror::Error;

/// Result type alias using qrforge's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for qrforge operations
#[derive(Error, Debug)]
pub enum Error {
    /// QR code encoding failed
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// Canvas or path construction failed while rendering
    #[error("Render error: {0}")]
    Render(String),

    /// Font lookup or parsing failed
    #[error("Font error: {0}")]
    Font(String),

    /// Invalid color literal
    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    /// Content analysis request failed
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File watching failed
    #[error("Watch error: {0}")]
    Watch(String),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Analysis(e.to_string())
    }
}

impl From<qrcode::types::QrError> for Error {
    fn from(e: qrcode::types::QrError) -> Self {
        Error::QrEncode(e.to_string())
    }
}

impl From<notify::Error> for Error {
    fn from(e: notify::Error) -> Self {
        Error::Watch(e.to_string())
    }
}
