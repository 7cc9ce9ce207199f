//! # Ultra Order Service Client
//!
//! Integration with the external quoting/execution service: order creation,
//! signed-order execution, and the provider's balances view.
//!
//! [`OrderProvider`] is the seam the batch orchestrator depends on, so tests
//! can swap the live client for a scripted one.

// region: --- Modules
pub mod types;
pub mod client;
pub mod order;
pub mod execute;
// endregion: --- Modules

use async_trait::async_trait;
use lib_core::Result;

pub use client::UltraClient;
pub use types::{ExecuteResponse, OrderResponse, TakerBalance, TakerBalances};

/// Order lifecycle operations against the quoting/execution service.
#[async_trait]
pub trait OrderProvider: Send + Sync {
    /// Request an unsigned order transaction plus its request id.
    async fn create_order(
        &self,
        taker: &str,
        input_mint: &str,
        output_mint: &str,
        raw_amount: &str,
    ) -> Result<OrderResponse>;

    /// Submit a signed order and return the on-chain signature.
    async fn execute_order(&self, signed_transaction: &str, request_id: &str) -> Result<String>;
}

#[async_trait]
impl OrderProvider for UltraClient {
    async fn create_order(
        &self,
        taker: &str,
        input_mint: &str,
        output_mint: &str,
        raw_amount: &str,
    ) -> Result<OrderResponse> {
        UltraClient::create_order(self, taker, input_mint, output_mint, raw_amount).await
    }

    async fn execute_order(&self, signed_transaction: &str, request_id: &str) -> Result<String> {
        UltraClient::execute_order(self, signed_transaction, request_id).await
    }
}
