//! Helpers for rendering structured scan output

use crate::analysis::AnalysisResult;
use crate::qr::ScanResult;
use hex::encode as hex_encode;
use serde_json::{Map, Value, json};

/// Combined structured and human-readable representation of a scan
#[derive(Debug, Clone)]
pub struct RenderedScan {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// What a payload appears to be, judged by its prefix.
pub fn content_kind(text: &str) -> &'static str {
    let lower = text.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        "url"
    } else if lower.starts_with("wifi:") {
        "wifi"
    } else if lower.starts_with("mailto:") {
        "email"
    } else if lower.starts_with("begin:vcard") {
        "contact"
    } else {
        "text"
    }
}

/// Render one scan, with its analysis if any, into JSON and human-readable forms.
pub fn render_scan(scan: &ScanResult, analysis: Option<&AnalysisResult>) -> RenderedScan {
    let json = scan_value(scan, analysis);
    let mut human = Vec::new();

    let bytes = scan.payload.as_bytes();
    match scan.payload.as_str() {
        Some(text) => {
            human.push(format!("QR code detected ({})", content_kind(text)));
            human.push(format!("  Content: {}", format_text_snippet(text)));
        }
        None => {
            human.push("QR code detected (binary)".to_string());
            human.push(format!("  Bytes: {}", format_hex_snippet(bytes)));
        }
    }
    human.push(format!("  Version: {}", scan.version));
    human.push(format!("  Error correction: {}", ecc_label(scan)));
    human.push(format!(
        "  Corners: {}",
        scan.corners
            .iter()
            .map(|c| format!("({}, {})", c.x, c.y))
            .collect::<Vec<_>>()
            .join(" ")
    ));

    if let Some(result) = analysis {
        human.push(format!("  Analysis: {}", result.summary));
        human.push(format!("    Safety: {}", result.safety));
        human.push(format!("    Category: {}", result.category));
        for action in &result.actions {
            human.push(format!("    Suggested: {action}"));
        }
    }

    RenderedScan { json, human }
}

/// Render every scan, numbering them when there is more than one.
pub fn render_scans(scans: &[(ScanResult, Option<AnalysisResult>)]) -> RenderedScan {
    if let [(scan, analysis)] = scans {
        return render_scan(scan, analysis.as_ref());
    }

    let mut human = vec![format!("{} QR codes detected", scans.len())];
    let mut values = Vec::with_capacity(scans.len());
    for (index, (scan, analysis)) in scans.iter().enumerate() {
        let rendered = render_scan(scan, analysis.as_ref());
        human.push(format!("[{}]", index + 1));
        human.extend(rendered.human);
        values.push(rendered.json);
    }

    RenderedScan {
        json: json!({ "count": scans.len(), "codes": values }),
        human,
    }
}

/// Produce a structured JSON representation of a scan.
pub fn scan_value(scan: &ScanResult, analysis: Option<&AnalysisResult>) -> Value {
    let bytes = scan.payload.as_bytes();
    let mut root = Map::new();

    if let Some(text) = scan.payload.as_str() {
        root.insert("text".to_string(), Value::String(text.to_string()));
        root.insert("kind".to_string(), Value::String(content_kind(text).to_string()));
    }
    root.insert("byte_length".to_string(), Value::from(bytes.len()));
    root.insert("bytes_hex".to_string(), Value::String(hex_encode(bytes)));
    root.insert("version".to_string(), Value::from(scan.version));
    root.insert(
        "error_correction".to_string(),
        Value::String(ecc_label(scan)),
    );
    root.insert(
        "corners".to_string(),
        Value::Array(
            scan.corners
                .iter()
                .map(|c| json!({ "x": c.x, "y": c.y }))
                .collect(),
        ),
    );
    root.insert(
        "analysis".to_string(),
        analysis.map_or(Value::Null, analysis_value),
    );

    Value::Object(root)
}

fn analysis_value(result: &AnalysisResult) -> Value {
    json!({
        "summary": result.summary,
        "safety": result.safety,
        "category": result.category,
        "actions": result.actions,
    })
}

fn ecc_label(scan: &ScanResult) -> String {
    scan.error_correction()
        .map(|level| level.to_string())
        .unwrap_or_else(|| format!("unknown ({})", scan.ecc_level))
}

fn format_hex_snippet(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "empty".to_string();
    }

    let hex = hex_encode(bytes);
    const MAX: usize = 64;
    if hex.len() > MAX {
        format!("{}... ({} bytes)", &hex[..MAX], bytes.len())
    } else {
        format!("{} ({} bytes)", hex, bytes.len())
    }
}

fn format_text_snippet(text: &str) -> String {
    const MAX: usize = 120;
    let single_line = text.replace('\n', " / ");
    if single_line.chars().count() > MAX {
        let cut: String = single_line.chars().take(MAX).collect();
        format!("{cut}... ({} chars)", text.chars().count())
    } else {
        single_line
    }
}
