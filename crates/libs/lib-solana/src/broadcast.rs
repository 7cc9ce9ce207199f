//! # Raw Transaction Broadcast
//!
//! Sends locally-constructed signed transactions straight to a node, for
//! operations (account closure) that never touch the quoting service.

use crate::close_account::build_close_account_transaction;
use crate::codec::decode_transaction;
use crate::rotation::RpcEndpointPool;
use async_trait::async_trait;
use lib_core::{AppError, Result};
use std::sync::Arc;
use tracing::debug;

/// Broadcast a base64 signed transaction through the endpoint pool.
///
/// Node rejections (double-submission, stale blockhash, failed simulation)
/// surface as [`AppError::Broadcast`] once the pool is exhausted.
pub async fn broadcast_transaction(
    pool: &RpcEndpointPool,
    signed_transaction: &str,
) -> Result<String> {
    let tx = decode_transaction(signed_transaction)?;

    pool.with_failover(|client| {
        let tx = tx.clone();
        async move {
            client
                .send_transaction(&tx)
                .await
                .map(|signature| signature.to_string())
                .map_err(|e| AppError::Broadcast(format!("send_transaction: {}", e)))
        }
    })
    .await
    .map(|signature| {
        debug!("Broadcast landed: {}", signature);
        signature
    })
}

/// Node-facing operations the batch orchestrator needs for the close-all
/// workflow: building unsigned close transactions and broadcasting their
/// signed counterparts.
#[async_trait]
pub trait TransactionBroadcaster: Send + Sync {
    /// Build an unsigned close-account transaction as a base64 blob.
    async fn build_close_transaction(&self, owner: &str, token_account: &str) -> Result<String>;

    /// Broadcast a base64 signed transaction, returning its signature.
    async fn broadcast(&self, signed_transaction: &str) -> Result<String>;
}

/// [`TransactionBroadcaster`] backed by the real endpoint pool.
pub struct NodeBroadcaster {
    pool: Arc<RpcEndpointPool>,
}

impl NodeBroadcaster {
    pub fn new(pool: Arc<RpcEndpointPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionBroadcaster for NodeBroadcaster {
    async fn build_close_transaction(&self, owner: &str, token_account: &str) -> Result<String> {
        build_close_account_transaction(&self.pool, owner, token_account).await
    }

    async fn broadcast(&self, signed_transaction: &str) -> Result<String> {
        broadcast_transaction(&self.pool, signed_transaction).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_undecodable_blob_fails_before_any_endpoint_attempt() {
        // An empty pool would fail with Config if the blob survived decoding
        let pool = RpcEndpointPool::new(vec![]);
        let result = broadcast_transaction(&pool, "@@garbage@@").await;
        assert!(matches!(result, Err(AppError::Decoding(_))));
    }
}
