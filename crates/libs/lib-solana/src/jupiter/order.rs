//! # Order Creation
//!
//! Requests unsigned swap transactions from the quoting service.

use super::client::UltraClient;
use super::types::{OrderResponse, TakerBalances};
use lib_core::{AppError, Result};
use tracing::debug;

impl UltraClient {
    /// Request an unsigned order transaction for swapping `raw_amount` base
    /// units of `input_mint` into `output_mint` on behalf of `taker`.
    ///
    /// `raw_amount` is a decimal string and is passed through verbatim — it
    /// must never round-trip through a float.
    pub async fn create_order(
        &self,
        taker: &str,
        input_mint: &str,
        output_mint: &str,
        raw_amount: &str,
    ) -> Result<OrderResponse> {
        let url = format!("{}/order", self.api_base);

        debug!(
            "Order request: {} -> {} ({} base units)",
            input_mint, output_mint, raw_amount
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("inputMint", input_mint),
                ("outputMint", output_mint),
                ("amount", raw_amount),
                ("taker", taker),
            ])
            .send()
            .await
            .map_err(|e| AppError::Quote(format!("quote service unreachable: {}", e)))?;

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "order request failed".to_string());
            return Err(AppError::Quote(body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Decoding(format!("order response: {}", e)))
    }

    /// Fetch the provider's view of `taker`'s balances.
    pub async fn fetch_taker_balances(&self, taker: &str) -> Result<TakerBalances> {
        let url = format!("{}/balances/{}", self.api_base, taker);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Quote(format!("balances service unreachable: {}", e)))?;

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "balances request failed".to_string());
            return Err(AppError::Quote(body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Decoding(format!("balances response: {}", e)))
    }
}
