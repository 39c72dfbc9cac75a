//! QR code encoding and decoding
//!
//! Encoding produces a bare [`ModuleMatrix`] for the styled renderer; decoding
//! finds codes in images and reports where they are.

mod decoder;
mod encoder;
mod matrix;

pub use decoder::{Corner, QrDecoder, ScanResult};
pub use encoder::QrEncoder;
pub use matrix::{FINDER_SIZE, ModuleMatrix, in_finder_zone};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// QR error-correction level, ordered from least to most redundant
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    /// ~7% recovery
    Low,
    /// ~15% recovery
    #[default]
    Medium,
    /// ~25% recovery
    Quartile,
    /// ~30% recovery
    High,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => qrcode::EcLevel::L,
            ErrorCorrection::Medium => qrcode::EcLevel::M,
            ErrorCorrection::Quartile => qrcode::EcLevel::Q,
            ErrorCorrection::High => qrcode::EcLevel::H,
        }
    }
}

impl ErrorCorrection {
    /// Level from the two format-information bits a decoder reports.
    pub fn from_format_bits(bits: u16) -> Option<Self> {
        match bits {
            0b01 => Some(Self::Low),
            0b00 => Some(Self::Medium),
            0b11 => Some(Self::Quartile),
            0b10 => Some(Self::High),
            _ => None,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Self::Low),
            "m" | "medium" => Ok(Self::Medium),
            "q" | "quartile" => Ok(Self::Quartile),
            "h" | "high" => Ok(Self::High),
            _ => Err(format!(
                "Unsupported error correction level '{value}', expected low/medium/quartile/high"
            )),
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Quartile => "quartile",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

/// A decoded QR code payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    /// The raw decoded data
    pub data: Vec<u8>,
    /// String representation if valid UTF-8
    pub text: Option<String>,
}

impl QrPayload {
    /// Create a new QR payload from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let text = String::from_utf8(data.clone()).ok();
        Self { data, text }
    }

    /// Create a new QR payload from a string
    pub fn from_string(s: String) -> Self {
        Self {
            data: s.as_bytes().to_vec(),
            text: Some(s),
        }
    }

    /// Get the payload as a string, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_payload_from_string() {
        let payload = QrPayload::from_string("hello world".to_string());
        assert_eq!(payload.as_str(), Some("hello world"));
        assert_eq!(payload.as_bytes(), b"hello world");
    }

    #[test]
    fn test_qr_payload_from_bytes() {
        let payload = QrPayload::from_bytes(vec![0xFF, 0xFE]);
        assert!(payload.as_str().is_none());
        assert_eq!(payload.as_bytes(), &[0xFF, 0xFE]);
    }

    #[test]
    fn test_error_correction_parse_and_order() {
        assert_eq!("H".parse::<ErrorCorrection>(), Ok(ErrorCorrection::High));
        assert_eq!(
            "quartile".parse::<ErrorCorrection>(),
            Ok(ErrorCorrection::Quartile)
        );
        assert!("max".parse::<ErrorCorrection>().is_err());
        assert!(ErrorCorrection::Low < ErrorCorrection::Medium);
        assert!(ErrorCorrection::Quartile < ErrorCorrection::High);
    }

    #[test]
    fn test_error_correction_defaults_to_medium() {
        assert_eq!(ErrorCorrection::default(), ErrorCorrection::Medium);
    }

    #[test]
    fn test_error_correction_from_format_bits() {
        assert_eq!(ErrorCorrection::from_format_bits(1), Some(ErrorCorrection::Low));
        assert_eq!(ErrorCorrection::from_format_bits(2), Some(ErrorCorrection::High));
        assert_eq!(ErrorCorrection::from_format_bits(7), None);
    }
}
