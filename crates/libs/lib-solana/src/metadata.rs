//! # Token Metadata Cache
//!
//! Enriches balances with display symbols fetched per-mint from the token
//! metadata service.
//!
//! Refreshes are generation-stamped: each new refresh supersedes the previous
//! one, and a superseded refresh must stop writing into the shared cache —
//! its results describe a balance set that no longer exists. Lookups never
//! block on a refresh; an unknown mint falls back to its abbreviated form.

use lib_core::Result;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Wrapped-SOL mint, displayed as plain SOL.
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Pacing delay between per-mint metadata fetches.
const FETCH_PACING: Duration = Duration::from_millis(100);

/// Cached metadata for one mint.
#[derive(Debug, Clone)]
pub struct TokenMeta {
    pub symbol: String,
    pub decimals: Option<u8>,
}

/// Per-mint response of the token metadata service.
#[derive(Debug, Deserialize)]
struct TokenApiResponse {
    symbol: String,
    decimals: Option<u8>,
    tags: Option<Vec<String>>,
}

/// Mint → display metadata cache with superseding refreshes.
pub struct TokenMetadataCache {
    http: Client,
    api_base: String,
    entries: RwLock<HashMap<String, TokenMeta>>,
    generation: AtomicU64,
}

impl TokenMetadataCache {
    /// Create a cache talking to `api_base` (e.g. `https://lite-api.jup.ag/tokens/v1`).
    pub fn new(api_base: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            http,
            api_base: api_base.into(),
            entries: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        })
    }

    /// Display name for a mint: cached symbol, or the abbreviated mint.
    pub async fn display_name(&self, mint: &str) -> String {
        if mint == WSOL_MINT || mint == "SOL" {
            return "SOL".to_string();
        }
        self.entries
            .read()
            .await
            .get(mint)
            .map(|meta| meta.symbol.clone())
            .unwrap_or_else(|| abbreviate_mint(mint))
    }

    /// Start a new refresh generation, invalidating any refresh in flight.
    ///
    /// Returns the token the new refresh must present when writing.
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Insert `meta` only if `generation` is still the live one.
    async fn insert_if_current(&self, generation: u64, mint: &str, meta: TokenMeta) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        self.entries.write().await.insert(mint.to_string(), meta);
        true
    }

    /// Whether `generation` is still the live refresh.
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Refresh metadata for `mints`, superseding any refresh already running.
    ///
    /// Only `verified`-tagged tokens are admitted to the cache; everything
    /// else keeps the abbreviated-mint fallback. Stops early once a newer
    /// refresh takes over.
    pub async fn refresh(&self, mints: &[String]) -> Result<()> {
        let generation = self.next_generation();

        for mint in mints {
            if !self.is_current(generation) {
                debug!("Metadata refresh superseded after {}", mint);
                break;
            }
            if mint == WSOL_MINT || mint == "SOL" {
                self.insert_if_current(
                    generation,
                    mint,
                    TokenMeta { symbol: "SOL".to_string(), decimals: Some(9) },
                )
                .await;
                continue;
            }

            // Pace requests so a large wallet does not trip provider rate limits
            tokio::time::sleep(FETCH_PACING).await;

            let url = format!("{}/token/{}", self.api_base, mint);
            let response = match self.http.get(&url).send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    debug!("Metadata fetch for {} returned {}", mint, response.status());
                    continue;
                }
                Err(e) => {
                    debug!("Metadata fetch for {} failed: {}", mint, e);
                    continue;
                }
            };

            let token: TokenApiResponse = match response.json().await {
                Ok(token) => token,
                Err(e) => {
                    debug!("Metadata response for {} did not parse: {}", mint, e);
                    continue;
                }
            };

            let verified = token
                .tags
                .as_deref()
                .is_some_and(|tags| tags.iter().any(|t| t == "verified"));
            if !verified {
                continue;
            }

            self.insert_if_current(
                generation,
                mint,
                TokenMeta { symbol: token.symbol, decimals: token.decimals },
            )
            .await;
        }

        Ok(())
    }

    /// Spawn a background refresh over `mints`.
    pub fn refresh_in_background(self: Arc<Self>, mints: Vec<String>) {
        tokio::spawn(async move {
            if let Err(e) = self.refresh(&mints).await {
                tracing::warn!("Metadata refresh failed: {}", e);
            }
        });
    }
}

/// Abbreviate a mint for display: first four and last four characters.
fn abbreviate_mint(mint: &str) -> String {
    if mint.len() <= 8 {
        return mint.to_string();
    }
    format!("{}…{}", &mint[..4], &mint[mint.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate_mint() {
        assert_eq!(
            abbreviate_mint("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN"),
            "JUPy…DvCN"
        );
        assert_eq!(abbreviate_mint("short"), "short");
    }

    #[tokio::test]
    async fn test_display_name_falls_back_to_abbreviation() {
        let cache = TokenMetadataCache::new("http://127.0.0.1:9").unwrap();
        assert_eq!(
            cache.display_name("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN").await,
            "JUPy…DvCN"
        );
    }

    #[tokio::test]
    async fn test_native_names_are_fixed() {
        let cache = TokenMetadataCache::new("http://127.0.0.1:9").unwrap();
        assert_eq!(cache.display_name("SOL").await, "SOL");
        assert_eq!(cache.display_name(WSOL_MINT).await, "SOL");
    }

    #[tokio::test]
    async fn test_superseded_generation_cannot_write() {
        let cache = TokenMetadataCache::new("http://127.0.0.1:9").unwrap();
        let stale = cache.next_generation();
        // A newer refresh takes over
        let live = cache.next_generation();

        let wrote = cache
            .insert_if_current(
                stale,
                "MintA",
                TokenMeta { symbol: "STALE".to_string(), decimals: Some(6) },
            )
            .await;
        assert!(!wrote);
        assert_eq!(cache.display_name("MintA").await, "MintA");

        let wrote = cache
            .insert_if_current(
                live,
                "MintA",
                TokenMeta { symbol: "LIVE".to_string(), decimals: Some(6) },
            )
            .await;
        assert!(wrote);
        assert_eq!(cache.display_name("MintA").await, "LIVE");
    }
}
