//! QR code decoder using rqrr

use crate::error::{Error, Result};
use crate::qr::{ErrorCorrection, QrPayload};
use image::{DynamicImage, GrayImage};
use serde::Serialize;

/// A pixel coordinate in the scanned image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Corner {
    /// Horizontal pixel position
    pub x: i32,
    /// Vertical pixel position
    pub y: i32,
}

/// A decoded code together with where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Decoded payload
    pub payload: QrPayload,
    /// Corner points in image pixels: top-left, top-right, bottom-right, bottom-left
    pub corners: [Corner; 4],
    /// QR version (1..=40)
    pub version: usize,
    /// Raw ECC level bits as reported by the decoder
    pub ecc_level: u16,
}

impl ScanResult {
    /// Error-correction level, when the reported bits are valid.
    pub fn error_correction(&self) -> Option<ErrorCorrection> {
        ErrorCorrection::from_format_bits(self.ecc_level)
    }
}

/// QR code decoder
pub struct QrDecoder {}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {}
    }

    /// Decode the first QR code found in an image
    pub fn decode(&self, img: &DynamicImage) -> Result<ScanResult> {
        self.decode_gray(img.to_luma8())
    }

    /// Decode the first QR code found in a grayscale image
    pub fn decode_gray(&self, img: GrayImage) -> Result<ScanResult> {
        let mut prepared = rqrr::PreparedImage::prepare(img);
        let grids = prepared.detect_grids();

        if grids.is_empty() {
            return Err(Error::NoQrCodeFound);
        }

        let mut last_error = None;
        for grid in &grids {
            let mut data = Vec::new();
            match grid.decode_to(&mut data) {
                Ok(meta) => {
                    tracing::debug!(
                        "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                        meta.version,
                        meta.ecc_level,
                        data.len()
                    );
                    return Ok(scan_result(meta, &grid.bounds, data));
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(Error::QrDecode(format!("Decode failed: {:?}", last_error)))
    }

    /// Decode every QR code found in an image
    pub fn decode_all(&self, img: &DynamicImage) -> Result<Vec<ScanResult>> {
        let mut prepared = rqrr::PreparedImage::prepare(img.to_luma8());
        let grids = prepared.detect_grids();

        if grids.is_empty() {
            return Err(Error::NoQrCodeFound);
        }

        let mut results = Vec::new();

        for grid in grids {
            let mut data = Vec::new();
            match grid.decode_to(&mut data) {
                Ok(meta) => results.push(scan_result(meta, &grid.bounds, data)),
                Err(e) => {
                    tracing::warn!("Failed to decode one QR code: {:?}", e);
                }
            }
        }

        if results.is_empty() {
            return Err(Error::QrDecode("No QR codes could be decoded".to_string()));
        }

        Ok(results)
    }
}

/// Payload bytes are kept raw; text is derived only when they are UTF-8.
fn scan_result(meta: rqrr::MetaData, bounds: &[rqrr::Point; 4], data: Vec<u8>) -> ScanResult {
    ScanResult {
        payload: QrPayload::from_bytes(data),
        corners: bounds.map(|p| Corner { x: p.x, y: p.y }),
        version: meta.version.0,
        ecc_level: meta.ecc_level,
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn blank_image_has_no_code() {
        let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 200, Luma([255])));
        let decoder = QrDecoder::new();
        assert!(matches!(decoder.decode(&blank), Err(Error::NoQrCodeFound)));
        assert!(matches!(decoder.decode_all(&blank), Err(Error::NoQrCodeFound)));
    }

    #[test]
    fn decodes_plain_code_with_corners() {
        let code = qrcode::QrCode::new(b"corner check").unwrap();
        let img = code
            .render::<Luma<u8>>()
            .min_dimensions(300, 300)
            .build();
        let (w, h) = img.dimensions();

        let scan = QrDecoder::new()
            .decode(&DynamicImage::ImageLuma8(img))
            .unwrap();

        assert_eq!(scan.payload.as_str(), Some("corner check"));
        assert_eq!(scan.version, 1);
        for corner in scan.corners {
            assert!(corner.x >= 0 && corner.x <= w as i32);
            assert!(corner.y >= 0 && corner.y <= h as i32);
        }
        // Top-left corner sits above and left of the bottom-right one.
        assert!(scan.corners[0].x < scan.corners[2].x);
        assert!(scan.corners[0].y < scan.corners[2].y);
    }

    #[test]
    fn binary_payload_keeps_raw_bytes() {
        let bytes = [0xFF, 0xFE, 0x00, 0x80, 0x10];
        let code = qrcode::QrCode::new(bytes).unwrap();
        let img = code
            .render::<Luma<u8>>()
            .min_dimensions(300, 300)
            .build();

        let scan = QrDecoder::new()
            .decode(&DynamicImage::ImageLuma8(img))
            .unwrap();

        assert!(scan.payload.as_str().is_none());
        assert_eq!(scan.payload.as_bytes(), &bytes);
    }
}
