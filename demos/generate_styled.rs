//! Render a gallery of styled QR codes and scan each one back
//!
//! Usage: cargo run --example generate_styled

use qrforge::render::{RenderAssets, render};
use qrforge::style::{
    Color, EyeShape, Fill, GradientDirection, LabelOptions, LabelPosition, ModuleShape,
};
use qrforge::template::{ContentTemplate, WifiNetwork};
use qrforge::{QrDecoder, RenderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let wifi = ContentTemplate::Wifi(WifiNetwork {
        ssid: "Home".to_string(),
        password: "secret1".to_string(),
        encryption: "WPA".to_string(),
        hidden: false,
    });

    let styles = [
        ("plain", ModuleShape::Square, EyeShape::Square, Fill::solid(Color::BLACK)),
        (
            "dots",
            ModuleShape::Dots,
            EyeShape::Circle,
            Fill::gradient(
                Color::rgb(0x4f, 0x46, 0xe5),
                Color::rgb(0xdb, 0x27, 0x77),
                GradientDirection::Diagonal,
            ),
        ),
        (
            "rounded",
            ModuleShape::Rounded,
            EyeShape::Leaf,
            Fill::gradient(
                Color::rgb(0x06, 0x5f, 0x46),
                Color::rgb(0x1e, 0x3a, 0x8a),
                GradientDirection::Radial,
            ),
        ),
    ];

    let decoder = QrDecoder::new();
    for (name, module_shape, eye_shape, foreground) in styles {
        let config = RenderConfig {
            module_shape,
            eye_shape,
            foreground,
            label: Some(LabelOptions {
                text: format!("{name} style"),
                position: LabelPosition::Bottom,
                ..LabelOptions::default()
            }),
            ..RenderConfig::with_content(wifi.to_content())
        };

        let report = config.contrast();
        let assets = RenderAssets::load(&config).await;
        let Some(image) = render(&config, &assets)? else {
            continue;
        };

        let path = format!("qr_{name}.png");
        image.save_png(path.as_ref())?;
        println!("✓ {path} ({}x{}, contrast {:.1})", image.width(), image.height(), report.ratio);

        match decoder.decode(&image::DynamicImage::ImageRgba8(image.to_rgba_image())) {
            Ok(scanned) => println!("  Scanned back: {:?}", scanned.payload.as_str()),
            Err(e) if !eye_shape.reliably_scannable() => {
                println!("  {eye_shape:?} eyes not read back by rqrr: {e}")
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
