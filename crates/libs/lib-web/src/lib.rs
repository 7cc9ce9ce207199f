//! # Web Library
//!
//! HTTP handlers, middleware, the batch sweep orchestrator, and server setup.

pub mod handlers;
pub mod middleware;
pub mod services;
pub mod server;
pub mod tx_log;

pub use server::{start_server, AppState, ServerConfig};
pub use services::{SweepConfig, SweepOrchestrator, SweepReport};
pub use tx_log::{TransactionLog, TransactionLogEntry};
