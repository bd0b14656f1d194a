//! DashScope adapter: Alibaba Cloud's OpenAI-compatible mode.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use zeroize::Zeroizing;

use super::compat::{CompatClient, ErrorPatterns};
use super::*;

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_KEY_ENV: &str = "DASHSCOPE_API_KEY";

const PATTERNS: ErrorPatterns = ErrorPatterns {
    denied: &["AccessDenied", "Model.AccessDenied"],
    unsupported: &["NotSupported"],
};

pub struct DashScopeAdapter {
    client: CompatClient,
}

impl DashScopeAdapter {
    pub fn new(base_url: &str, api_key: Zeroizing<String>, timeout: Duration) -> Result<Self> {
        Ok(Self { client: CompatClient::new(base_url, api_key, timeout)? })
    }
}

#[async_trait]
impl PlatformAdapter for DashScopeAdapter {
    fn name(&self) -> &str { "dashscope" }

    async fn list_models(&self) -> Result<Vec<Model>> {
        self.client.list_models(self.name()).await
    }

    async fn probe(&self, model: &Model) -> ProbeResult {
        self.client.probe_chat(self.name(), model, &PATTERNS).await
    }
}
