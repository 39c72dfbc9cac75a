//! qrforge - styled QR code generation and scanning
//!
//! This library renders QR codes with custom module and finder shapes,
//! solid or gradient fills, a centered logo and a text label, and decodes
//! codes back out of images.
//!
//! # Features
//!
//! - **Styled rendering**: eight module shapes, four eye shapes, linear and radial gradients
//! - **Logos and labels**: centered logo with an automatic error-correction bump, scaled text label
//! - **Content templates**: WiFi, email, vCard, URL and free text payloads
//! - **Scanning**: payload, corners, version and error-correction level via `rqrr`
//! - **Async-first**: asset loading, debounced re-rendering of watched files and content analysis on Tokio
//!
//! # Example
//!
//! ```no_run
//! use qrforge::render::{RenderAssets, render};
//! use qrforge::style::{ModuleShape, EyeShape};
//! use qrforge::RenderConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RenderConfig {
//!         module_shape: ModuleShape::Dots,
//!         eye_shape: EyeShape::Rounded,
//!         ..RenderConfig::with_content("https://example.com")
//!     };
//!
//!     let assets = RenderAssets::load(&config).await;
//!     if let Some(image) = render(&config, &assets)? {
//!         image.save_png("example.png".as_ref())?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod qr;
pub mod render;
pub mod scheduler;
pub mod style;
pub mod template;
pub mod watch;

// Re-exports for convenience
pub use error::{Error, Result};

pub use analysis::{AnalysisResult, Analyzer, GeminiAnalyzer, SafetyRating};
pub use config::{
    AnalysisOptions, LogRotation, LoggingOptions, QrforgeConfig, RenderFile, WatchOptions,
};
pub use qr::{ErrorCorrection, QrDecoder, QrEncoder, QrPayload, ScanResult};
pub use render::{RenderAssets, RenderedImage, render};
pub use scheduler::{RenderOutcome, RenderScheduler};
pub use style::{Color, Fill, RenderConfig};
pub use template::ContentTemplate;
pub use watch::FileWatcher;
