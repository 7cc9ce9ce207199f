//! # HTTP Request Handlers
//!
//! The internal surface consumed by the UI. Every endpoint takes a JSON body
//! and answers JSON; non-2xx responses carry `{"error": ..., "code": ...}`
//! via the [`lib_core::AppError`] response mapping.
//!
//! ## Handler Modules
//!
//! - **[`balances`]**: `POST /api/balances` — wallet balance map
//! - **[`order`]**: `POST /api/order` — unsigned swap order + request id
//! - **[`execute`]**: `POST /api/execute` — submit a signed order
//! - **[`broadcast`]**: `POST /api/broadcast` — raw signed transaction to a node
//! - **[`close_account`]**: `POST /api/close-account` — unsigned close transaction
//! - **[`transactions`]**: session transaction log (list / clear)

pub mod balances;
pub mod order;
pub mod execute;
pub mod broadcast;
pub mod close_account;
pub mod transactions;
