//! # Ultra HTTP Client
//!
//! HTTP client wrapper for the quoting/execution service.

use reqwest::Client;

/// HTTP client for the Ultra order/execute/balances API.
pub struct UltraClient {
    pub(crate) http: Client,
    pub(crate) api_base: String,
}

impl UltraClient {
    /// Create a new client with timeout configuration.
    ///
    /// `api_base` is the versioned API root, without a trailing slash
    /// (e.g. `https://lite-api.jup.ag/ultra/v1`).
    pub fn new(api_base: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            api_base: api_base.into(),
        })
    }

    /// The API root this client talks to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}
