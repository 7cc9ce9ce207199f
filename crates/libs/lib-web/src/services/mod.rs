//! # Services Layer
//!
//! Business logic sitting between the HTTP handlers / CLI and the network
//! clients in `lib-solana`.
//!
//! - [`sweep`] — the batch orchestrator driving sweep-all and close-all

pub mod sweep;

// Re-export services for convenience
pub use sweep::{SweepConfig, SweepOrchestrator, SweepReport};
