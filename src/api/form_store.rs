//! Client for the form store, which holds published runner documents.
//!
//! Every lookup degrades to an empty result on failure: a broken or absent
//! store must never sink an export, so errors are logged and swallowed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A published form definition as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedForm {
    pub id: Option<String>,
    pub url_path: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishedFormResponse {
    pub id: Option<String>,
    pub url_path: Option<String>,
    pub configuration: Value,
}

pub struct FormStoreClient {
    base_url: String,
    client: reqwest::Client,
}

impl FormStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: super::http_client(),
        }
    }

    /// Reads `FORM_STORE_API_HOST`; the store address is required
    /// configuration even though lookups degrade gracefully.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("FORM_STORE_API_HOST").context("FORM_STORE_API_HOST is not set")?;
        Ok(Self::new(base_url))
    }

    /// All published forms. Failures are logged and return an empty list.
    pub async fn get_published_forms(&self) -> Vec<PublishedForm> {
        match self.fetch_forms().await {
            Ok(forms) => forms.into_iter().filter(|f| f.is_published).collect(),
            Err(err) => {
                log::error!("Error fetching forms from form store: {:#}", err);
                Vec::new()
            }
        }
    }

    /// The published runner document for a form, or None when missing or
    /// the store is unreachable.
    pub async fn get_published_form(&self, url_path: &str) -> Option<Value> {
        let url = format!("{}/{}/published", self.base_url, url_path);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                log::error!("Error fetching form '{}' from form store: {}", url_path, err);
                return None;
            }
        };

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            log::info!("Form '{}' not found in form store", url_path);
            return None;
        }
        if !response.status().is_success() {
            log::error!(
                "Error fetching form '{}' from form store: status {}",
                url_path,
                response.status()
            );
            return None;
        }

        match response.json::<PublishedFormResponse>().await {
            Ok(published) => Some(published.configuration),
            Err(err) => {
                log::error!("Error decoding form '{}' from form store: {}", url_path, err);
                None
            }
        }
    }

    /// The store's display name for a form, or None when it cannot supply
    /// one.
    pub async fn get_display_name(&self, url_path: &str) -> Option<String> {
        self.get_published_forms()
            .await
            .into_iter()
            .find(|form| form.url_path == url_path)
            .and_then(|form| form.display_name)
    }

    async fn fetch_forms(&self) -> Result<Vec<PublishedForm>> {
        let response = self
            .client
            .get(&self.base_url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("Request to form store failed")?;
        let response = response
            .error_for_status()
            .context("Form store returned an error status")?;
        response
            .json::<Vec<PublishedForm>>()
            .await
            .context("Failed to decode form store response")
    }
}
