//! AI content analysis of scanned payloads
//!
//! Analysis is advisory: every failure path yields `None` and is logged,
//! nothing here ever fails a scan.

use crate::config::AnalysisOptions;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

/// Maximum number of suggested actions kept from a response.
pub const MAX_ACTIONS: usize = 2;

/// Coarse safety verdict for a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyRating {
    /// Looks harmless
    Safe,
    /// Worth a second look before acting on it
    Caution,
    /// No verdict
    Unknown,
}

impl SafetyRating {
    /// Map a free-form label onto a rating; anything unrecognised is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "safe" => Self::Safe,
            "caution" => Self::Caution,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SafetyRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Safe => "safe",
            Self::Caution => "caution",
            Self::Unknown => "unknown",
        })
    }
}

/// Structured analysis of one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One-sentence description
    pub summary: String,
    /// Safety verdict
    pub safety: SafetyRating,
    /// Content category, e.g. `url` or `wifi`
    pub category: String,
    /// One or two suggested next steps
    pub actions: Vec<String>,
}

/// Something that can describe a scanned payload.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyse `content`, or `None` when no analysis is available.
    async fn analyze(&self, content: &str) -> Option<AnalysisResult>;
}

/// Analyzer backed by the Gemini `generateContent` REST API.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    options: AnalysisOptions,
}

impl GeminiAnalyzer {
    /// Build an analyzer; fails only if the HTTP client cannot be constructed.
    pub fn new(options: AnalysisOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs.max(1)))
            .build()?;
        Ok(Self { client, options })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.options.endpoint.trim_end_matches('/'),
            self.options.model
        )
    }

    async fn request(&self, api_key: &str, content: &str) -> Result<Option<AnalysisResult>> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt(content) }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Analysis(format!("service returned {status}")));
        }

        let envelope: Value = response.json().await?;
        let Some(text) = candidate_text(&envelope) else {
            return Err(Error::Analysis("response carried no text".to_string()));
        };
        Ok(parse_analysis_response(text))
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, content: &str) -> Option<AnalysisResult> {
        let Some(api_key) = self.options.api_key.as_deref().filter(|k| !k.is_empty()) else {
            tracing::debug!("No analysis API key configured, skipping analysis");
            return None;
        };
        if content.trim().is_empty() {
            return None;
        }

        match self.request(api_key, content).await {
            Ok(Some(result)) => {
                tracing::debug!(safety = %result.safety, category = %result.category, "Analysis complete");
                Some(result)
            }
            Ok(None) => {
                tracing::warn!("Analysis response was incomplete");
                None
            }
            Err(err) => {
                tracing::warn!("Analysis unavailable: {err}");
                None
            }
        }
    }
}

fn prompt(content: &str) -> String {
    format!(
        "Analyse the following QR code content. Respond with a JSON object with keys \
         \"summary\" (one sentence), \"safety\" (one of \"safe\", \"caution\", \"unknown\"), \
         \"category\" (a single lowercase word such as url, wifi, email, contact, text) and \
         \"actions\" (an array of one or two short suggested actions).\n\nContent:\n{content}"
    )
}

fn candidate_text(envelope: &Value) -> Option<&str> {
    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

/// Parse the model's JSON answer leniently.
///
/// Code fences are stripped, unknown safety labels become
/// [`SafetyRating::Unknown`], and actions beyond [`MAX_ACTIONS`] are dropped.
/// A missing summary or an empty action list yields `None`.
pub fn parse_analysis_response(text: &str) -> Option<AnalysisResult> {
    let value: Value = serde_json::from_str(strip_fences(text)).ok()?;

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())?
        .to_string();

    let safety = value
        .get("safety")
        .and_then(Value::as_str)
        .map(SafetyRating::from_label)
        .unwrap_or(SafetyRating::Unknown);

    let category = value
        .get("category")
        .and_then(Value::as_str)
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let actions: Vec<String> = match value.get("actions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .take(MAX_ACTIONS)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => {
            vec![single.trim().to_string()]
        }
        _ => Vec::new(),
    };
    if actions.is_empty() {
        return None;
    }

    Some(AnalysisResult {
        summary,
        safety,
        category,
        actions,
    })
}

fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_response() {
        let result = parse_analysis_response(
            r#"{"summary":"A link to example.com","safety":"safe","category":"URL","actions":["Open link"]}"#,
        )
        .unwrap();
        assert_eq!(result.summary, "A link to example.com");
        assert_eq!(result.safety, SafetyRating::Safe);
        assert_eq!(result.category, "url");
        assert_eq!(result.actions, vec!["Open link"]);
    }

    #[test]
    fn lenient_about_fences_safety_and_action_count() {
        let text = "```json\n{\"summary\":\"s\",\"safety\":\"DANGEROUS\",\"actions\":[\"a\",\"\",\"b\",\"c\"]}\n```";
        let result = parse_analysis_response(text).unwrap();
        assert_eq!(result.safety, SafetyRating::Unknown);
        assert_eq!(result.category, "unknown");
        assert_eq!(result.actions, vec!["a", "b"]);
    }

    #[test]
    fn incomplete_responses_yield_none() {
        assert!(parse_analysis_response("not json").is_none());
        assert!(parse_analysis_response(r#"{"safety":"safe","actions":["x"]}"#).is_none());
        assert!(parse_analysis_response(r#"{"summary":"s","actions":[]}"#).is_none());
    }

    #[test]
    fn extracts_candidate_text() {
        let envelope = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
        });
        assert_eq!(candidate_text(&envelope), Some("{}"));
        assert_eq!(candidate_text(&json!({ "candidates": [] })), None);
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let analyzer = GeminiAnalyzer::new(AnalysisOptions {
            endpoint: "https://api.test/v1/".to_string(),
            model: "m1".to_string(),
            ..AnalysisOptions::default()
        })
        .unwrap();
        assert_eq!(analyzer.url(), "https://api.test/v1/models/m1:generateContent");
    }

    #[tokio::test]
    async fn missing_api_key_skips_request() {
        let analyzer = GeminiAnalyzer::new(AnalysisOptions {
            // Unroutable; a request would fail rather than hang.
            endpoint: "http://127.0.0.1:9".to_string(),
            ..AnalysisOptions::default()
        })
        .unwrap();
        assert_eq!(analyzer.analyze("https://example.com").await, None);
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_none() {
        let analyzer = GeminiAnalyzer::new(AnalysisOptions {
            api_key: Some("test-key".to_string()),
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..AnalysisOptions::default()
        })
        .unwrap();
        assert_eq!(analyzer.analyze("hello").await, None);
    }
}
