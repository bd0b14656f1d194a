//! DeepSeek adapter: OpenAI-compatible API.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use zeroize::Zeroizing;

use super::compat::{CompatClient, ErrorPatterns};
use super::*;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_KEY_ENV: &str = "DEEPSEEK_API_KEY";

const PATTERNS: ErrorPatterns = ErrorPatterns {
    denied: &["AccessDenied", "Model.AccessDenied"],
    unsupported: &["NotSupported"],
};

pub struct DeepSeekAdapter { client: CompatClient }

impl DeepSeekAdapter {
    pub fn new(base_url: &str, api_key: Zeroizing<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { client: CompatClient::new(base_url, api_key, timeout)? })
    }
}

#[async_trait]
impl PlatformAdapter for DeepSeekAdapter {
    fn name(&self) -> &str { "deepseek" }

    async fn list_models(&self) -> Result<Vec<Model>> {
        self.client.list_models(self.name()).await
    }

    async fn probe(&self, model: &Model) -> ProbeResult {
        self.client.probe_chat(self.name(), model, &PATTERNS).await
    }
}
