//! # Solana Library
//!
//! Node RPC failover, wallet balance reads, the external order service
//! client, broadcast/close-account helpers, token metadata, and the batch
//! signing seam.

pub mod rotation;
pub mod codec;
pub mod balances;
pub mod broadcast;
pub mod close_account;
pub mod jupiter;
pub mod metadata;
pub mod signer;

// Re-export commonly used types from root for convenience
pub use rotation::{RpcEndpointPool, ROTATION_BACKOFF};
pub use balances::{read_balances, BalanceEntry, BalanceMap, BalanceSource, NodeBalanceSource, NATIVE_KEY};
pub use broadcast::{broadcast_transaction, NodeBroadcaster, TransactionBroadcaster};
pub use close_account::build_close_account_transaction;
pub use jupiter::{OrderProvider, OrderResponse, UltraClient};
pub use metadata::TokenMetadataCache;
pub use signer::{BatchSigner, LocalKeypairSigner};
