//! # Order Execution
//!
//! Submits signed order transactions to the execution endpoint.
//!
//! Execution causes an irreversible on-chain transfer, so a transport error
//! here is NOT a failure: the request may have reached the provider and the
//! order may already be consumed. Such calls surface as
//! [`AppError::AmbiguousExecution`] and are never retried by this client or
//! anything above it.

use super::client::UltraClient;
use super::types::ExecuteResponse;
use lib_core::{AppError, Result};
use serde_json::json;
use tracing::debug;

/// The one status string the execute endpoint uses for a landed order.
const STATUS_SUCCESS: &str = "Success";

impl UltraClient {
    /// Execute a previously-created order.
    ///
    /// `signed_transaction` is the base64 signed counterpart of the order the
    /// provider issued together with `request_id`; the two must be from the
    /// same order response.
    pub async fn execute_order(
        &self,
        signed_transaction: &str,
        request_id: &str,
    ) -> Result<String> {
        let url = format!("{}/execute", self.api_base);

        let response = self
            .http
            .post(&url)
            .json(&json!({
                "signedTransaction": signed_transaction,
                "requestId": request_id,
            }))
            .send()
            .await
            .map_err(|e| {
                AppError::AmbiguousExecution(format!("execute request failed in flight: {}", e))
            })?;

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "execute request rejected".to_string());
            return Err(AppError::Execution { code: None, message: body });
        }

        let exec: ExecuteResponse = response
            .json()
            .await
            .map_err(|e| AppError::Decoding(format!("execute response: {}", e)))?;

        if exec.status != STATUS_SUCCESS {
            return Err(AppError::Execution {
                code: exec.code,
                message: exec
                    .error
                    .unwrap_or_else(|| format!("execution ended with status {}", exec.status)),
            });
        }

        match exec.signature {
            Some(signature) => {
                debug!("Order {} landed: {}", request_id, signature);
                Ok(signature)
            }
            None => Err(AppError::Execution {
                code: exec.code,
                message: "success status carried no signature".to_string(),
            }),
        }
    }
}
