//! Generation backend: the pipeline's single network call.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

/// A text-generation backend the pipeline can call with a prompt.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate raw text for a prompt. Errors are swallowed by the
    /// pipeline, which falls back to fixed templates.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// HTTP generation backend: bearer-token-authenticated JSON POST.
///
/// No retry: a retried call could produce a duplicate post downstream,
/// so failures fall straight through to the template fallback.
pub struct HttpGenerationBackend {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpGenerationBackend {
    pub fn new(url: String, api_key: String, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { client, url, api_key }
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({ "prompt": prompt });

        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("generation request failed")?;

        let status = resp.status();
        let json: serde_json::Value = resp
            .json()
            .await
            .context("generation response parse failed")?;

        if !status.is_success() {
            let msg = json
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            anyhow::bail!("generation backend returned {status}: {msg}");
        }

        json.get("text")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .context("generation response missing text field")
    }
}
