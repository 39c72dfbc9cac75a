//! qrforge runtime configuration handling

use crate::error::{Error, Result};
use crate::qr::ErrorCorrection;
use crate::style::{Color, EyeShape, Fill, ModuleShape, RenderConfig};
use crate::template::ContentTemplate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrforgeConfig {
    /// Logging configuration
    pub logging: LoggingOptions,
    /// Defaults for `generate`
    pub render: RenderConfig,
    /// Content analysis service
    pub analysis: AnalysisOptions,
    /// `generate --watch` behaviour
    pub watch: WatchOptions,
}

impl QrforgeConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrforge.toml / qrforge.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrforge.toml", "qrforge.yaml", "qrforge.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrforge");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Render defaults for `generate`, with any configured logo run through
    /// [`RenderConfig::attach_logo`].
    pub fn render_defaults(&self) -> RenderConfig {
        let mut render = self.render.clone();
        if let Some(logo) = render.logo.take() {
            render.attach_logo(logo);
        }
        render
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        read_document(path)
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary `QRFORGE_*` lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.logging.apply_overrides(&lookup);
        apply_render_overrides(&mut self.render, &lookup);
        self.analysis.apply_overrides(&lookup);
        self.watch.apply_overrides(&lookup);
    }
}

/// Parse a TOML or YAML file, chosen by extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "toml" => toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))),
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))),
        other => Err(Error::Config(format!(
            "Unsupported config format '{}', expected toml/yaml",
            other
        ))),
    }
}

/// A standalone render description, as read by `generate --render`.
///
/// Holds every [`RenderConfig`] field plus an optional content template that,
/// when present, replaces `content`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderFile {
    /// Render settings
    #[serde(flatten)]
    pub config: RenderConfig,
    /// Structured content
    #[serde(default)]
    pub template: Option<ContentTemplate>,
}

impl RenderFile {
    /// Read a render file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        read_document(path)
    }

    /// Resolve into a render configuration.
    ///
    /// A logo named in the file goes through [`RenderConfig::attach_logo`] so
    /// the error-correction policy applies.
    pub fn into_render_config(self) -> RenderConfig {
        let mut config = self.config;
        if let Some(template) = self.template {
            config.content = template.to_content();
        }
        if let Some(logo) = config.logo.take() {
            config.attach_logo(logo);
        }
        config
    }
}

fn apply_render_overrides<F>(render: &mut RenderConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(size) = lookup("QRFORGE_SIZE") {
        match size.parse::<u32>() {
            Ok(value) => render.size = value,
            Err(_) => tracing::warn!("Ignoring QRFORGE_SIZE={size}: not a pixel count"),
        }
    }
    override_parsed(lookup, "QRFORGE_MODULE_SHAPE", |v: ModuleShape| {
        render.module_shape = v
    });
    override_parsed(lookup, "QRFORGE_EYE_SHAPE", |v: EyeShape| render.eye_shape = v);
    override_parsed(lookup, "QRFORGE_ERROR_CORRECTION", |v: ErrorCorrection| {
        render.error_correction = v
    });
    override_parsed(lookup, "QRFORGE_FOREGROUND", |v: Color| {
        render.foreground = Fill::solid(v)
    });
    override_parsed(lookup, "QRFORGE_BACKGROUND", |v: Color| {
        render.background = Fill::solid(v)
    });
}

fn override_parsed<F, T, A>(lookup: &F, key: &str, apply: A)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
    A: FnOnce(T),
{
    if let Some(raw) = lookup(key) {
        match raw.parse::<T>() {
            Ok(value) => apply(value),
            Err(e) => tracing::warn!("Ignoring {key}={raw}: {e}"),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRFORGE_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stderr logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("QRFORGE_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(file) = lookup("QRFORGE_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Some(color) = lookup("QRFORGE_LOG_COLOR").as_deref().and_then(parse_flag) {
            self.color = color;
        }
        if let Some(rotation) = lookup("QRFORGE_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::parse(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

/// Content analysis service settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// API key; analysis is skipped without one
    pub api_key: Option<String>,
    /// Model name used in the request path
    pub model: String,
    /// Base URL of the generative language API
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 20,
        }
    }
}

impl std::fmt::Debug for AnalysisOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AnalysisOptions {
    pub(crate) fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("QRFORGE_ANALYSIS_API_KEY") {
            self.api_key = if key.trim().is_empty() {
                None
            } else {
                Some(key)
            };
        }
        if let Some(model) = lookup("QRFORGE_ANALYSIS_MODEL") {
            self.model = model;
        }
        if let Some(endpoint) = lookup("QRFORGE_ANALYSIS_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(timeout) = lookup("QRFORGE_ANALYSIS_TIMEOUT_SECS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.timeout_secs = value.max(1);
            }
        }
    }
}

/// Settings for re-rendering on file changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    /// Quiet period after the last change before rendering
    pub debounce_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

impl WatchOptions {
    pub(crate) fn apply_overrides<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("QRFORGE_WATCH_DEBOUNCE_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.debounce_ms = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::LogoShape;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_toml_with_nested_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qrforge.toml");
        fs::write(
            &path,
            r##"
[logging]
level = "debug"
rotation = "daily"

[render]
size = 640
module_shape = "dots"
foreground = { mode = "gradient", primary = "#ff0000", secondary = "#0000ff", direction = "radial" }

[analysis]
model = "gemini-test"

[watch]
debounce_ms = 100
"##,
        )
        .unwrap();

        let config = QrforgeConfig::from_file(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.rotation, Some(LogRotation::Daily));
        assert_eq!(config.render.size, 640);
        assert_eq!(config.render.module_shape, ModuleShape::Dots);
        assert_eq!(config.render.foreground.secondary, Color::rgb(0, 0, 255));
        assert_eq!(config.analysis.model, "gemini-test");
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn loads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qrforge.yml");
        fs::write(&path, "render:\n  eye_shape: leaf\n  size: 300\n").unwrap();
        let config = QrforgeConfig::from_file(&path).unwrap();
        assert_eq!(config.render.eye_shape, EyeShape::Leaf);
        assert_eq!(config.render.size, 300);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qrforge.ini");
        fs::write(&path, "size=1").unwrap();
        assert!(matches!(
            QrforgeConfig::from_file(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let mut config = QrforgeConfig::default();
        config.apply_overrides(lookup(&[
            ("QRFORGE_LOG_LEVEL", "trace"),
            ("QRFORGE_LOG_COLOR", "off"),
            ("QRFORGE_SIZE", "not-a-number"),
            ("QRFORGE_MODULE_SHAPE", "extra_rounded"),
            ("QRFORGE_ERROR_CORRECTION", "q"),
            ("QRFORGE_FOREGROUND", "#123456"),
            ("QRFORGE_ANALYSIS_API_KEY", "k"),
            ("QRFORGE_WATCH_DEBOUNCE_MS", "40"),
        ]));

        assert_eq!(config.logging.level, "trace");
        assert!(!config.logging.color);
        assert_eq!(config.render.size, 512);
        assert_eq!(config.render.module_shape, ModuleShape::ExtraRounded);
        assert_eq!(config.render.error_correction, ErrorCorrection::Quartile);
        assert_eq!(config.render.foreground, Fill::solid(Color::rgb(0x12, 0x34, 0x56)));
        assert_eq!(config.analysis.api_key.as_deref(), Some("k"));
        assert_eq!(config.watch.debounce_ms, 40);
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let options = AnalysisOptions {
            api_key: Some("super-secret".to_string()),
            ..AnalysisOptions::default()
        };
        let debug = format!("{options:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn render_file_applies_template_and_logo_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.toml");
        fs::write(
            &path,
            r#"
size = 400
error_correction = "low"

[template]
kind = "email"
address = "a@b.com"
subject = "Hi"
body = "Yo"

[logo]
path = "logo.png"
shape = "circle"
"#,
        )
        .unwrap();

        let config = RenderFile::load(&path).unwrap().into_render_config();
        assert_eq!(config.content, "mailto:a@b.com?subject=Hi&body=Yo");
        assert_eq!(config.size, 400);
        assert_eq!(config.error_correction, ErrorCorrection::High);
        assert_eq!(config.logo.map(|l| l.shape), Some(LogoShape::Circle));
    }

    #[test]
    fn app_config_logo_raises_error_correction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qrforge.toml");
        fs::write(
            &path,
            r#"
[render]
error_correction = "medium"

[render.logo]
path = "brand.png"
shape = "square"
"#,
        )
        .unwrap();

        let config = QrforgeConfig::from_file(&path).unwrap();
        assert_eq!(config.render.error_correction, ErrorCorrection::Medium);

        let render = config.render_defaults();
        assert_eq!(render.error_correction, ErrorCorrection::High);
        assert_eq!(render.logo.map(|l| l.shape), Some(LogoShape::Square));
    }

    #[test]
    fn app_config_without_logo_keeps_its_level() {
        let mut config = QrforgeConfig::default();
        config.render.error_correction = ErrorCorrection::Low;
        assert_eq!(config.render_defaults().error_correction, ErrorCorrection::Low);
    }
}
