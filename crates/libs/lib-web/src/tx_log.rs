//! # Session Transaction Log
//!
//! Append-only record of landed signatures and the display names of the
//! tokens they involved, kept in memory for the lifetime of the session.
//! Cleared only on explicit user action; never persisted.

use chrono::{DateTime, Utc};
use lib_utils::now_utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// One landed transaction and the tokens it involved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionLogEntry {
    pub signature: String,
    /// Display names of the swept/closed tokens.
    pub tokens: Vec<String>,
    pub at: DateTime<Utc>,
}

impl TransactionLogEntry {
    pub fn new(signature: String, tokens: Vec<String>) -> Self {
        Self { signature, tokens, at: now_utc() }
    }
}

/// In-memory, session-scoped transaction history.
#[derive(Default)]
pub struct TransactionLog {
    entries: RwLock<Vec<TransactionLogEntry>>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub async fn append(&self, entry: TransactionLogEntry) {
        self.entries.write().await.push(entry);
    }

    /// Snapshot of all entries, oldest first.
    pub async fn snapshot(&self) -> Vec<TransactionLogEntry> {
        self.entries.read().await.clone()
    }

    /// Drop all entries, returning how many were dropped.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_clear() {
        let log = TransactionLog::new();
        log.append(TransactionLogEntry::new("Sig1".into(), vec!["BONK".into()])).await;
        log.append(TransactionLogEntry::new("Sig2".into(), vec!["WIF".into()])).await;

        let entries = log.snapshot().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].signature, "Sig1");
        assert_eq!(entries[1].tokens, vec!["WIF".to_string()]);

        assert_eq!(log.clear().await, 2);
        assert!(log.snapshot().await.is_empty());
    }
}
