//! Command-line surface and the resolved scan configuration.
//!
//! Everything here is validated before any network call: platform name,
//! API key presence, output format and filter expressions.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::adapters::{dashscope, deepseek, PlatformAdapter};
use crate::discovery::exclude::split_excludes;
use crate::filter::{parse_filters, Filter, FilterError};
use crate::output::OutputFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
    #[error("api key missing; provide --api-key or set {0}")]
    MissingApiKey(String),
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid base url {0:?}")]
    InvalidBaseUrl(String),
    #[error(transparent)]
    Filter(#[from] FilterError),
}

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "model-scout", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe every model a platform lists and report which are callable
    Scan(ScanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Platform to scan (dashscope, deepseek)
    #[arg(long)]
    pub platform: String,
    /// API key; falls back to the --key-env variable
    #[arg(long)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key (default depends on platform)
    #[arg(long)]
    pub key_env: Option<String>,
    /// Number of concurrent probe workers
    #[arg(long, default_value_t = 4)]
    pub workers: usize,
    /// Per-request HTTP timeout
    #[arg(long, default_value = "15s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
    /// Overall scan deadline; the scan is cancelled when it elapses
    #[arg(long, value_parser = humantime::parse_duration)]
    pub deadline: Option<Duration>,
    /// Output format: json or yaml
    #[arg(long, default_value = "json")]
    pub out: String,
    /// Write the report here instead of stdout
    #[arg(long)]
    pub output_file: Option<PathBuf>,
    /// Only report available models
    #[arg(long)]
    pub only_ok: bool,
    /// Comma-separated substrings of model ids to skip
    #[arg(long, default_value = "")]
    pub exclude: String,
    /// Result filter, key=v1,v2 or key!=v1,v2 (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<String>,
    /// Override the platform's API base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

// ── Platforms ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    DashScope,
    DeepSeek,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::DashScope => "dashscope",
            Platform::DeepSeek => "deepseek",
        }
    }

    pub fn default_key_env(&self) -> &'static str {
        match self {
            Platform::DashScope => dashscope::DEFAULT_KEY_ENV,
            Platform::DeepSeek => deepseek::DEFAULT_KEY_ENV,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Platform::DashScope => dashscope::DEFAULT_BASE_URL,
            Platform::DeepSeek => deepseek::DEFAULT_BASE_URL,
        }
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashscope" => Ok(Platform::DashScope),
            "deepseek" => Ok(Platform::DeepSeek),
            _ => Err(ConfigError::UnsupportedPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Resolved Config ─────────────────────────────────────────────────

/// Fully validated scan settings.
pub struct ScanConfig {
    pub platform: Platform,
    pub api_key: Zeroizing<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub deadline: Option<Duration>,
    pub workers: usize,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub only_ok: bool,
    pub excludes: Vec<String>,
    pub filters: Vec<Filter>,
}

impl ScanConfig {
    /// Resolve arguments against the process environment.
    pub fn from_args(args: ScanArgs) -> Result<Self, ConfigError> {
        Self::from_args_with_env(args, |name| std::env::var(name).ok())
    }

    /// Resolve arguments, reading environment variables through `env`.
    pub fn from_args_with_env<F>(args: ScanArgs, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let platform: Platform = args.platform.parse()?;

        let key_env = args
            .key_env
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| platform.default_key_env().to_string());
        let api_key = resolve_api_key(args.api_key.as_deref(), &key_env, env)?;

        let format: OutputFormat = args.out.parse().map_err(ConfigError::UnsupportedFormat)?;
        let filters = parse_filters(&args.filters)?;

        let base_url = match args.base_url {
            Some(url) => {
                reqwest::Url::parse(&url).map_err(|_| ConfigError::InvalidBaseUrl(url.clone()))?;
                url
            }
            None => platform.default_base_url().to_string(),
        };

        Ok(Self {
            platform,
            api_key,
            base_url,
            timeout: args.timeout,
            deadline: args.deadline,
            workers: args.workers,
            format,
            output_file: args.output_file,
            only_ok: args.only_ok,
            excludes: split_excludes(&args.exclude),
            filters,
        })
    }
}

/// Explicit key first, then the named environment variable. Both trimmed.
fn resolve_api_key<F>(explicit: Option<&str>, key_env: &str, env: F) -> Result<Zeroizing<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = explicit.map(str::trim).filter(|k| !k.is_empty());
    if let Some(key) = explicit {
        return Ok(Zeroizing::new(key.to_string()));
    }

    let from_env = env(key_env).map(Zeroizing::new);
    match from_env {
        Some(key) if !key.trim().is_empty() => Ok(Zeroizing::new(key.trim().to_string())),
        _ => Err(ConfigError::MissingApiKey(key_env.to_string())),
    }
}

/// Build the adapter for the configured platform.
pub fn build_adapter(config: &ScanConfig) -> Result<Arc<dyn PlatformAdapter>> {
    let key = config.api_key.clone();
    let adapter: Arc<dyn PlatformAdapter> = match config.platform {
        Platform::DashScope => Arc::new(dashscope::DashScopeAdapter::new(&config.base_url, key, config.timeout)?),
        Platform::DeepSeek => Arc::new(deepseek::DeepSeekAdapter::new(&config.base_url, key, config.timeout)?),
    };
    Ok(adapter)
}
