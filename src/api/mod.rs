//! HTTP collaborators: the form store (published form lookups) and the form
//! runner (publish-for-preview).

pub mod form_runner;
pub mod form_store;

pub use form_runner::FormRunnerClient;
pub use form_store::FormStoreClient;

use std::time::Duration;

/// Shared HTTP client configuration for both collaborators.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent("fab/0.1")
        .build()
        .unwrap_or_default()
}
