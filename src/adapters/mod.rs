//! Platform adapter trait: provider-agnostic catalog + probe interface.
//!
//! Every inference platform (DashScope, DeepSeek, ...) implements this
//! trait. The scanner only ever talks to adapters through it; adapters
//! never see the scanner, the filters or the reporter.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod compat;
pub mod dashscope;
pub mod deepseek;

// ── Core Types ──────────────────────────────────────────────────────

/// A model entry discovered from a platform listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), meta: BTreeMap::new() }
    }
}

/// Outcome classification of a single probe.
///
/// The five well-known values cover every built-in adapter. Adapters may
/// report their own values through `Other`; they serialize as the bare
/// string either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProbeStatus {
    Ok,
    Fail,
    Error,
    Denied,
    Unsupported,
    Other(String),
}

impl ProbeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProbeStatus::Ok => "ok",
            ProbeStatus::Fail => "fail",
            ProbeStatus::Error => "error",
            ProbeStatus::Denied => "denied",
            ProbeStatus::Unsupported => "unsupported",
            ProbeStatus::Other(s) => s,
        }
    }
}

impl From<String> for ProbeStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ok" => ProbeStatus::Ok,
            "fail" => ProbeStatus::Fail,
            "error" => ProbeStatus::Error,
            "denied" => ProbeStatus::Denied,
            "unsupported" => ProbeStatus::Unsupported,
            _ => ProbeStatus::Other(s),
        }
    }
}

impl From<&str> for ProbeStatus {
    fn from(s: &str) -> Self {
        ProbeStatus::from(s.to_string())
    }
}

impl From<ProbeStatus> for String {
    fn from(status: ProbeStatus) -> Self {
        match status {
            ProbeStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the report: the classified outcome of probing one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub platform: String,
    pub model: String,
    pub status: ProbeStatus,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl ProbeResult {
    /// A callable model. The only way to build an `available` result.
    pub fn ok(platform: &str, model: &str, capabilities: Vec<String>) -> Self {
        Self {
            platform: platform.to_string(),
            model: model.to_string(),
            status: ProbeStatus::Ok,
            available: true,
            reason: None,
            capabilities,
            meta: BTreeMap::new(),
        }
    }

    /// A model that could not be called, with the reason why.
    pub fn unavailable(
        platform: &str,
        model: &str,
        status: ProbeStatus,
        reason: impl Into<String>,
    ) -> Self {
        let reason = reason.into();
        Self {
            platform: platform.to_string(),
            model: model.to_string(),
            status,
            available: false,
            reason: if reason.is_empty() { None } else { Some(reason) },
            capabilities: Vec::new(),
            meta: BTreeMap::new(),
        }
    }
}

// ── Adapter Trait ───────────────────────────────────────────────────

/// The platform adapter trait.
///
/// Adding a platform = implementing this trait in a new file, then
/// registering it in `config::build_adapter`. Implementations must be
/// safe to probe concurrently; they must not mutate shared state per call.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Stable lowercase platform identifier (e.g. "dashscope").
    fn name(&self) -> &str;

    /// Query the remote catalog. Entries with empty ids are dropped.
    async fn list_models(&self) -> Result<Vec<Model>>;

    /// Issue a minimal synthetic request against one model and classify
    /// the outcome. Never fails: every failure mode becomes a status.
    async fn probe(&self, model: &Model) -> ProbeResult;
}
