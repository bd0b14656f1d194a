//! OpenAI-compatible wire protocol shared by the built-in adapters.
//!
//! DashScope (compatible mode) and DeepSeek both expose `GET /models` and
//! `POST /chat/completions` with OpenAI-shaped bodies, so listing and the
//! 1-token probe live here. Each adapter supplies its own error-type
//! patterns for classifying non-2xx responses.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroizing;

use super::{Model, ProbeResult, ProbeStatus};

/// Max characters of a raw error body surfaced in a reason.
const MAX_REASON_LEN: usize = 500;

/// Error-type substrings that map a non-2xx response to a status.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPatterns {
    pub denied: &'static [&'static str],
    pub unsupported: &'static [&'static str],
}

impl ErrorPatterns {
    fn classify(&self, error_type: &str) -> ProbeStatus {
        if self.denied.iter().any(|p| error_type.contains(p)) {
            ProbeStatus::Denied
        } else if self.unsupported.iter().any(|p| error_type.contains(p)) {
            ProbeStatus::Unsupported
        } else {
            ProbeStatus::Fail
        }
    }
}

// ── Wire Types ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<ListEntry>,
}

#[derive(Deserialize)]
struct ListEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    owned_by: Option<String>,
}

#[derive(Serialize)]
struct ProbeRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    /// `type` when present, else a string `code` (DashScope reports both).
    fn kind(&self) -> &str {
        match self.error_type.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => self.code.as_ref().and_then(|c| c.as_str()).unwrap_or(""),
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// HTTP client bound to one OpenAI-compatible endpoint and key.
///
/// `reqwest::Client` pools connections internally and is safe to share
/// across concurrent probes.
pub struct CompatClient {
    base_url: String,
    api_key: Zeroizing<String>,
    http: reqwest::Client,
}

impl CompatClient {
    pub fn new(base_url: &str, api_key: Zeroizing<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    /// `GET {base}/models`, dropping entries without an id.
    pub async fn list_models(&self, platform: &str) -> Result<Vec<Model>> {
        let resp = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(self.api_key.as_str())
            .send()
            .await
            .with_context(|| format!("{} list models request failed", platform))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("{} list models: read body", platform))?;

        if status != StatusCode::OK {
            let text = String::from_utf8_lossy(&body);
            let text = text.trim();
            if text.is_empty() {
                anyhow::bail!("{} list models failed: {}", platform, status);
            }
            anyhow::bail!(
                "{} list models failed: {}: {}",
                platform,
                status,
                truncate(text, MAX_REASON_LEN)
            );
        }

        let payload: ListResponse = serde_json::from_slice(&body)
            .with_context(|| format!("{} list models: decode response", platform))?;

        let models: Vec<Model> = payload
            .data
            .into_iter()
            .filter(|entry| !entry.id.is_empty())
            .map(|entry| {
                let mut model = Model::new(entry.id);
                if let Some(owner) = entry.owned_by.filter(|o| !o.is_empty()) {
                    model.meta.insert("owned_by".into(), owner);
                }
                model
            })
            .collect();

        debug!(platform, count = models.len(), "Listed models");
        Ok(models)
    }

    /// Send a 1-token chat completion and classify the outcome. The
    /// listing metadata of `model` is carried into the result.
    pub async fn probe_chat(
        &self,
        platform: &str,
        model: &Model,
        patterns: &ErrorPatterns,
    ) -> ProbeResult {
        let mut result = self.send_probe(platform, model, patterns).await;
        result.meta = model.meta.clone();
        result
    }

    async fn send_probe(&self, platform: &str, model: &Model, patterns: &ErrorPatterns) -> ProbeResult {
        let request = ProbeRequest {
            model: &model.id,
            messages: [ChatMessage { role: "user", content: "ping" }],
            max_tokens: 1,
        };
        let payload = match serde_json::to_vec(&request) {
            Ok(p) => p,
            Err(e) => {
                return ProbeResult::unavailable(platform, &model.id, ProbeStatus::Error, e.to_string())
            }
        };

        let resp = match self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return ProbeResult::unavailable(platform, &model.id, ProbeStatus::Error, e.to_string())
            }
        };

        let status = resp.status();
        if status.is_success() {
            return ProbeResult::ok(platform, &model.id, vec!["chat".to_string()]);
        }

        match resp.text().await {
            Ok(body) => classify_error_response(platform, &model.id, status, &body, patterns),
            Err(e) => ProbeResult::unavailable(platform, &model.id, ProbeStatus::Error, e.to_string()),
        }
    }
}

/// Classify a non-2xx response body into a probe result.
pub fn classify_error_response(
    platform: &str,
    model: &str,
    status: StatusCode,
    body: &str,
    patterns: &ErrorPatterns,
) -> ProbeResult {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error: Some(error) }) => {
            let classified = patterns.classify(error.kind());
            let reason = match error.message {
                Some(msg) if !msg.trim().is_empty() => msg,
                _ => status.to_string(),
            };
            ProbeResult::unavailable(platform, model, classified, reason)
        }
        // A JSON object without an error envelope carries nothing worth quoting.
        Ok(ErrorEnvelope { error: None }) => {
            ProbeResult::unavailable(platform, model, ProbeStatus::Fail, status.to_string())
        }
        Err(_) => {
            let text = body.trim();
            let reason = if text.is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, truncate(text, MAX_REASON_LEN))
            };
            ProbeResult::unavailable(platform, model, ProbeStatus::Fail, reason)
        }
    }
}

/// Char-boundary safe prefix of at most `max` characters.
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
