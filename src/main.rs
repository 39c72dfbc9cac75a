//! qrforge command-line entrypoint

use clap::{Args, Parser, Subcommand};
use qrforge::analysis::{Analyzer, GeminiAnalyzer};
use qrforge::config::RenderFile;
use qrforge::output::{RenderedScan, render_scans};
use qrforge::render::{RenderAssets, RenderedImage};
use qrforge::scheduler::{RenderOutcome, RenderScheduler};
use qrforge::style::{
    Color, EyeShape, Fill, GradientDirection, LabelOptions, LabelPosition, LogoOptions, LogoShape,
    ModuleShape,
};
use qrforge::template::{ContentTemplate, EmailMessage, WifiNetwork};
use qrforge::watch::FileWatcher;
use qrforge::{Error, ErrorCorrection, QrDecoder, QrforgeConfig, RenderConfig, Result, logging};
use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "qrforge",
    version,
    about = "Styled QR code generator and scanner"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrforge.{toml,yaml} in cwd/XDG config.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a styled QR code to a PNG file
    Generate(GenerateArgs),
    /// Decode QR codes from an image file
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Render description (toml/yaml) used as the starting point
    #[arg(long, value_name = "PATH")]
    render: Option<PathBuf>,

    /// Free text to encode
    #[arg(long, conflicts_with_all = ["url", "wifi_ssid", "email_to"])]
    text: Option<String>,

    /// URL to encode
    #[arg(long, conflicts_with_all = ["wifi_ssid", "email_to"])]
    url: Option<String>,

    /// WiFi network name
    #[arg(long, value_name = "SSID", conflicts_with = "email_to")]
    wifi_ssid: Option<String>,

    /// WiFi passphrase
    #[arg(long, value_name = "PASSWORD", requires = "wifi_ssid")]
    wifi_password: Option<String>,

    /// WiFi encryption (WPA, WEP or none)
    #[arg(long, value_name = "TYPE", requires = "wifi_ssid")]
    wifi_encryption: Option<String>,

    /// Mark the WiFi network as hidden
    #[arg(long, requires = "wifi_ssid")]
    wifi_hidden: bool,

    /// Email recipient
    #[arg(long, value_name = "ADDRESS")]
    email_to: Option<String>,

    /// Email subject
    #[arg(long, requires = "email_to")]
    email_subject: Option<String>,

    /// Email body
    #[arg(long, requires = "email_to")]
    email_body: Option<String>,

    /// Width of the code region in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Data module shape
    #[arg(long)]
    module_shape: Option<ModuleShape>,

    /// Finder pattern shape
    #[arg(long)]
    eye_shape: Option<EyeShape>,

    /// Foreground color (#rgb, #rrggbb or #rrggbbaa)
    #[arg(long, value_name = "COLOR")]
    fg: Option<Color>,

    /// Second foreground color; turns the foreground into a gradient
    #[arg(long, value_name = "COLOR")]
    fg_to: Option<Color>,

    /// Foreground gradient direction
    #[arg(long, value_name = "DIRECTION", requires = "fg_to")]
    gradient: Option<GradientDirection>,

    /// Background color
    #[arg(long, value_name = "COLOR")]
    bg: Option<Color>,

    /// Logo image placed in the center
    #[arg(long, value_name = "PATH")]
    logo: Option<PathBuf>,

    /// Logo mask shape
    #[arg(long)]
    logo_shape: Option<LogoShape>,

    /// Label text
    #[arg(long)]
    label: Option<String>,

    /// Label placement (top or bottom)
    #[arg(long)]
    label_position: Option<LabelPosition>,

    /// Label font size at a 300px code
    #[arg(long)]
    label_size: Option<f32>,

    /// Label font file
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Error-correction level (low, medium, quartile, high)
    #[arg(long)]
    ec: Option<ErrorCorrection>,

    /// Output PNG path, `-` for stdout
    #[arg(short, long, default_value = "qrcode.png")]
    out: PathBuf,

    /// Re-render whenever the --render file changes
    #[arg(long, requires = "render")]
    watch: bool,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Image to scan
    image: PathBuf,

    /// Report every code in the image instead of the first
    #[arg(long)]
    all: bool,

    /// Ask the analysis service to describe each payload
    #[arg(long)]
    analyze: bool,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = QrforgeConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    match cli.command {
        Command::Generate(args) => handle_generate(&config, &args).await,
        Command::Scan(args) => handle_scan(&config, &args).await,
    }
}

async fn handle_generate(config: &QrforgeConfig, args: &GenerateArgs) -> Result<()> {
    if args.watch {
        if let Some(path) = args.render.as_deref() {
            return watch_render_file(config, args, path).await;
        }
    }

    let render_config = resolve_render_config(config, args)?;
    warn_on_low_contrast(&render_config);
    warn_on_styled_eyes(&render_config);

    let assets = RenderAssets::load(&render_config).await;
    match qrforge::render::render(&render_config, &assets)? {
        Some(image) => write_image(&image, &args.out),
        None => {
            warn!("Nothing to encode; pass --text, --url, --wifi-ssid, --email-to or --render");
            Ok(())
        }
    }
}

fn resolve_render_config(config: &QrforgeConfig, args: &GenerateArgs) -> Result<RenderConfig> {
    let base = match args.render.as_deref() {
        Some(path) => RenderFile::load(path)?.into_render_config(),
        None => config.render_defaults(),
    };
    Ok(apply_cli_overrides(base, args))
}

fn apply_cli_overrides(mut render: RenderConfig, args: &GenerateArgs) -> RenderConfig {
    if let Some(template) = template_from_args(args) {
        render.content = template.to_content();
    }

    if let Some(size) = args.size {
        render.size = size;
    }
    if let Some(shape) = args.module_shape {
        render.module_shape = shape;
    }
    if let Some(shape) = args.eye_shape {
        render.eye_shape = shape;
    }

    let primary = args.fg.unwrap_or(render.foreground.primary);
    match args.fg_to {
        Some(secondary) => {
            let direction = args.gradient.unwrap_or(render.foreground.direction);
            render.foreground = Fill::gradient(primary, secondary, direction);
        }
        None if args.fg.is_some() => render.foreground = Fill::solid(primary),
        None => {}
    }
    if let Some(bg) = args.bg {
        render.background = Fill::solid(bg);
    }

    if let Some(path) = &args.logo {
        let shape = args
            .logo_shape
            .or(render.logo.as_ref().map(|logo| logo.shape))
            .unwrap_or_default();
        render.attach_logo(LogoOptions {
            path: path.clone(),
            shape,
        });
    } else if let (Some(shape), Some(logo)) = (args.logo_shape, render.logo.as_mut()) {
        logo.shape = shape;
    }

    if let Some(text) = &args.label {
        let label = render.label.get_or_insert_with(LabelOptions::default);
        label.text = text.clone();
    }
    if let Some(label) = render.label.as_mut() {
        if let Some(position) = args.label_position {
            label.position = position;
        }
        if let Some(font_size) = args.label_size {
            label.font_size = font_size;
        }
        if let Some(font) = &args.font {
            label.font_path = Some(font.clone());
        }
    }

    // An explicit level wins over the logo policy.
    if let Some(level) = args.ec {
        render.error_correction = level;
        render.auto_error_correction = false;
    }

    render
}

fn template_from_args(args: &GenerateArgs) -> Option<ContentTemplate> {
    if let Some(text) = &args.text {
        return Some(ContentTemplate::Text { text: text.clone() });
    }
    if let Some(url) = &args.url {
        return Some(ContentTemplate::Url { url: url.clone() });
    }
    if let Some(ssid) = &args.wifi_ssid {
        return Some(ContentTemplate::Wifi(WifiNetwork {
            ssid: ssid.clone(),
            password: args.wifi_password.clone().unwrap_or_default(),
            encryption: args
                .wifi_encryption
                .clone()
                .unwrap_or_else(|| "WPA".to_string()),
            hidden: args.wifi_hidden,
        }));
    }
    args.email_to.as_ref().map(|address| {
        ContentTemplate::Email(EmailMessage {
            address: address.clone(),
            subject: args.email_subject.clone().unwrap_or_default(),
            body: args.email_body.clone().unwrap_or_default(),
        })
    })
}

fn warn_on_low_contrast(render: &RenderConfig) {
    let report = render.contrast();
    if report.low_contrast {
        warn!(
            ratio = f64::from(report.ratio),
            "Low contrast between foreground and background; scanners may struggle"
        );
    }
}

fn warn_on_styled_eyes(render: &RenderConfig) {
    if !render.eye_shape.reliably_scannable() {
        warn!(
            eye_shape = ?render.eye_shape,
            "Non-square eyes are not located by every scanner; check the output before printing"
        );
    }
}

fn write_image(image: &RenderedImage, out: &Path) -> Result<()> {
    if out == Path::new("-") {
        let png = image.to_png()?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&png)?;
        stdout.flush()?;
        return Ok(());
    }

    image.save_png(out)?;
    info!(
        width = image.width(),
        height = image.height(),
        path = %out.display(),
        "Wrote QR code"
    );
    Ok(())
}

async fn watch_render_file(
    config: &QrforgeConfig,
    args: &GenerateArgs,
    path: &Path,
) -> Result<()> {
    let debounce = Duration::from_millis(config.watch.debounce_ms);
    let (scheduler, mut outcomes) = RenderScheduler::spawn(debounce);
    let mut watcher = FileWatcher::spawn(path)?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(path = %path.display(), out = %args.out.display(), "Watching render file, Ctrl-C to stop");
    submit_render_file(config, args, path, &scheduler).await?;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(()) = watcher.changed() => {
                submit_render_file(config, args, path, &scheduler).await?;
            }
            Some(outcome) = outcomes.recv() => write_outcome(outcome, &args.out),
        }
    }

    scheduler.shutdown().await;
    Ok(())
}

async fn submit_render_file(
    config: &QrforgeConfig,
    args: &GenerateArgs,
    path: &Path,
    scheduler: &RenderScheduler,
) -> Result<()> {
    match resolve_render_config(config, args) {
        Ok(render) => {
            warn_on_low_contrast(&render);
            warn_on_styled_eyes(&render);
            scheduler.submit(render).await?;
        }
        Err(err) => warn!("Ignoring change to {}: {err}", path.display()),
    }
    Ok(())
}

fn write_outcome(outcome: RenderOutcome, out: &Path) {
    match outcome.result {
        Ok(Some(image)) => {
            if let Err(err) = write_image(&image, out) {
                warn!(generation = outcome.generation, "Failed to write QR code: {err}");
            }
        }
        Ok(None) => info!(generation = outcome.generation, "Render file has no content"),
        // Already logged by the scheduler.
        Err(_) => {}
    }
}

async fn handle_scan(config: &QrforgeConfig, args: &ScanArgs) -> Result<()> {
    let image = image::open(&args.image)?;
    let all = args.all;
    let decoded = tokio::task::spawn_blocking(move || {
        let decoder = QrDecoder::new();
        if all {
            decoder.decode_all(&image)
        } else {
            decoder.decode(&image).map(|scan| vec![scan])
        }
    })
    .await
    .map_err(|e| Error::Other(format!("decoder task failed: {e}")))?;

    let scans = match decoded {
        Ok(scans) => scans,
        Err(err) => {
            if args.json {
                let payload = json!({ "error": err.to_string() });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            return Err(err);
        }
    };
    info!(count = scans.len(), image = %args.image.display(), "Decoded QR codes");

    let analyzer = if args.analyze {
        Some(GeminiAnalyzer::new(config.analysis.clone())?)
    } else {
        None
    };

    let mut results = Vec::with_capacity(scans.len());
    for scan in scans {
        let analysis = match (&analyzer, scan.payload.as_str()) {
            (Some(analyzer), Some(text)) => analyzer.analyze(text).await,
            _ => None,
        };
        results.push((scan, analysis));
    }

    emit(&render_scans(&results), args.json)
}

fn emit(rendered: &RenderedScan, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }
    Ok(())
}
