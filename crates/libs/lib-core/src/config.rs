//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! Configuration is validated on startup to fail fast if misconfigured, with one
//! deliberate exception: an empty node endpoint list is allowed through so the
//! endpoint pool can report `Config` errors per-call instead of refusing to boot
//! (the UI still works for everything that does not touch the chain).

use lib_utils::envs::get_env_list;
use std::env;

/// The token every sweep converts into by default (JUP).
pub const DEFAULT_TARGET_MINT: &str = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN";

/// Default base URL of the external quoting/execution service.
pub const DEFAULT_ULTRA_API_BASE: &str = "https://lite-api.jup.ag/ultra/v1";

/// Default base URL of the token metadata service.
pub const DEFAULT_TOKEN_API_BASE: &str = "https://lite-api.jup.ag/tokens/v1";

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Ordered node RPC endpoints tried in rotation on failure.
    ///
    /// Comma-separated in `SOLANA_RPC_URLS`. May be empty; every chain call
    /// then fails fast with a configuration error.
    pub rpc_urls: Vec<String>,

    /// Mint all swept balances are converted into (`TARGET_MINT`).
    pub target_mint: String,

    /// Base URL of the quoting/execution service (`ULTRA_API_BASE`).
    pub ultra_api_base: String,

    /// Base URL of the token metadata service (`TOKEN_API_BASE`).
    pub token_api_base: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let rpc_urls = get_env_list("SOLANA_RPC_URLS");

        let target_mint = env::var("TARGET_MINT")
            .unwrap_or_else(|_| DEFAULT_TARGET_MINT.to_string());

        let ultra_api_base = env::var("ULTRA_API_BASE")
            .unwrap_or_else(|_| DEFAULT_ULTRA_API_BASE.to_string());

        let token_api_base = env::var("TOKEN_API_BASE")
            .unwrap_or_else(|_| DEFAULT_TOKEN_API_BASE.to_string());

        Ok(Self {
            rpc_urls,
            target_mint,
            ultra_api_base,
            token_api_base,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.target_mint.trim().is_empty() {
            return Err("TARGET_MINT must not be empty".to_string());
        }

        for base in [&self.ultra_api_base, &self.token_api_base] {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(format!("API base URL must be http(s): {}", base));
            }
        }

        for url in &self.rpc_urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("SOLANA_RPC_URLS entry must be http(s): {}", url));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            rpc_urls: vec!["https://rpc-a.example".into(), "https://rpc-b.example".into()],
            target_mint: DEFAULT_TARGET_MINT.to_string(),
            ultra_api_base: DEFAULT_ULTRA_API_BASE.to_string(),
            token_api_base: DEFAULT_TOKEN_API_BASE.to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_empty_pool() {
        // Empty pool is a per-call failure, not a startup failure
        let mut config = base_config();
        config.rpc_urls.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = base_config();
        config.rpc_urls.push("ws://rpc-c.example".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_target_mint() {
        let mut config = base_config();
        config.target_mint = "  ".into();
        assert!(config.validate().is_err());
    }
}
