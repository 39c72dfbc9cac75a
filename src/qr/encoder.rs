//! QR code encoder

use crate::error::Result;
use crate::qr::{ErrorCorrection, ModuleMatrix};
use qrcode::QrCode;

/// QR code encoder producing bare module matrices for the styled renderer
pub struct QrEncoder {
    /// Error correction level
    level: ErrorCorrection,
}

impl QrEncoder {
    /// Create a new QR encoder with default settings (Medium ECC)
    pub fn new() -> Self {
        Self {
            level: ErrorCorrection::Medium,
        }
    }

    /// Create a new QR encoder with a specific error correction level
    pub fn with_level(level: ErrorCorrection) -> Self {
        Self { level }
    }

    /// Error correction level used for encoding
    pub fn level(&self) -> ErrorCorrection {
        self.level
    }

    /// Encode text into a module matrix
    pub fn encode_str(&self, data: &str) -> Result<ModuleMatrix> {
        self.encode_bytes(data.as_bytes())
    }

    /// Encode raw bytes into a module matrix
    pub fn encode_bytes(&self, data: &[u8]) -> Result<ModuleMatrix> {
        let code = QrCode::with_error_correction_level(data, self.level.into())?;

        let size = code.width();
        let cells = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect();

        tracing::debug!(
            modules = size,
            level = ?self.level,
            bytes = data.len(),
            "Encoded QR matrix"
        );

        ModuleMatrix::from_cells(size, cells)
    }
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_encode_string() {
        let encoder = QrEncoder::new();
        let matrix = encoder.encode_str("Hello, qrforge!").unwrap();
        assert_eq!(matrix.size() % 2, 1);
        // Version 1 is 21 modules wide.
        assert!(matrix.size() >= 21);
    }

    #[test]
    fn test_finder_corner_is_dark() {
        let matrix = QrEncoder::new().encode_str("finder").unwrap();
        let n = matrix.size();
        for (row, col) in [(0, 0), (0, n - 1), (n - 1, 0), (3, 3)] {
            assert!(matrix.is_dark(row, col), "({row}, {col}) should be dark");
        }
        // Separator ring around the top-left finder is light.
        assert!(!matrix.is_dark(7, 0));
        assert!(!matrix.is_dark(0, 7));
    }

    #[test]
    fn test_higher_level_never_shrinks_matrix() {
        let text = "https://example.com/some/reasonably/long/path?with=query";
        let low = QrEncoder::with_level(ErrorCorrection::Low)
            .encode_str(text)
            .unwrap();
        let high = QrEncoder::with_level(ErrorCorrection::High)
            .encode_str(text)
            .unwrap();
        assert!(high.size() >= low.size());
    }

    #[test]
    fn test_oversized_payload_fails() {
        let huge = "x".repeat(8000);
        let result = QrEncoder::with_level(ErrorCorrection::High).encode_str(&huge);
        assert!(matches!(result, Err(Error::QrEncode(_))));
    }
}
