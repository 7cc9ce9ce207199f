//! # Close-Account Transaction Builder
//!
//! Builds the unsigned transaction that closes an emptied token account and
//! returns its rent deposit to the owner. The result is a base64 blob the
//! wallet signs client-side and hands back for raw broadcast.

use crate::codec::encode_transaction;
use crate::rotation::RpcEndpointPool;
use lib_core::{AppError, Result};
use solana_sdk::message::{v0, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use std::str::FromStr;
use tracing::debug;

/// Build an unsigned close-account transaction.
///
/// The owner is fee payer, close authority and rent destination at once; the
/// blockhash comes from whichever endpoint the pool lands on.
pub async fn build_close_account_transaction(
    pool: &RpcEndpointPool,
    owner: &str,
    token_account: &str,
) -> Result<String> {
    let owner_pk = Pubkey::from_str(owner)
        .map_err(|e| AppError::InvalidInput(format!("Invalid owner address: {}", e)))?;
    let account_pk = Pubkey::from_str(token_account)
        .map_err(|e| AppError::InvalidInput(format!("Invalid token account address: {}", e)))?;

    let close_ix = spl_token::instruction::close_account(
        &spl_token::id(),
        &account_pk,
        &owner_pk,
        &owner_pk,
        &[],
    )
    .map_err(|e| AppError::Internal(format!("close instruction: {}", e)))?;

    let blockhash = pool
        .with_failover(|client| async move {
            client
                .get_latest_blockhash()
                .await
                .map_err(|e| AppError::Rpc(format!("get_latest_blockhash: {}", e)))
        })
        .await?;

    let message = v0::Message::try_compile(&owner_pk, &[close_ix], &[], blockhash)
        .map_err(|e| AppError::Internal(format!("compile close message: {}", e)))?;

    // Signature slots stay zeroed; the wallet fills them in
    let tx = VersionedTransaction {
        signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
        message: VersionedMessage::V0(message),
    };

    debug!("Built close transaction for token account {}", token_account);
    encode_transaction(&tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_owner_fails_before_any_endpoint_attempt() {
        let pool = RpcEndpointPool::new(vec![]);
        let result = build_close_account_transaction(&pool, "bogus", "alsobogus").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_valid_addresses_reach_the_pool() {
        // With valid addresses and an empty pool the failure is the pool's
        let pool = RpcEndpointPool::new(vec![]);
        let owner = Pubkey::new_unique().to_string();
        let account = Pubkey::new_unique().to_string();
        let result = build_close_account_transaction(&pool, &owner, &account).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
