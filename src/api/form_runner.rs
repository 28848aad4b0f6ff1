//! Client for the form runner's publish endpoint, used for previews.

use anyhow::{Context, Result};
use serde_json::{json, Value};

pub struct FormRunnerClient {
    publish_url: String,
    preview_url: String,
    client: reqwest::Client,
}

impl FormRunnerClient {
    pub fn new(publish_base: impl Into<String>, preview_base: impl Into<String>) -> Self {
        Self {
            publish_url: publish_base.into().trim_end_matches('/').to_string(),
            preview_url: preview_base.into().trim_end_matches('/').to_string(),
            client: super::http_client(),
        }
    }

    /// Reads `FORM_RUNNER_INTERNAL_HOST` (publish target) and
    /// `FORM_RUNNER_EXTERNAL_HOST` (browser-facing preview address).
    pub fn from_env() -> Result<Self> {
        let publish = std::env::var("FORM_RUNNER_INTERNAL_HOST")
            .unwrap_or_else(|_| "http://form-runner:3009".to_string());
        let preview = std::env::var("FORM_RUNNER_EXTERNAL_HOST")
            .unwrap_or_else(|_| "http://localhost:3009".to_string());
        Ok(Self::new(publish, preview))
    }

    /// Publish a document under the given runner name and return the
    /// preview URL. Unlike form-store lookups this surfaces failures: a
    /// preview without a published form is useless.
    pub async fn publish(&self, runner_publish_name: &str, document: &Value) -> Result<String> {
        let url = format!("{}/publish", self.publish_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "id": runner_publish_name,
                "configuration": document,
            }))
            .send()
            .await
            .with_context(|| format!("Failed to publish form '{}'", runner_publish_name))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Form runner rejected publish of '{}': status {}",
                runner_publish_name,
                response.status()
            );
        }

        log::info!("Published form '{}' to the form runner", runner_publish_name);
        Ok(format!("{}/{}", self.preview_url, runner_publish_name))
    }
}
