//! Persistence for the seen-set.
//!
//! ## File layout
//!
//! ```text
//! storage/
//! ├── config.toml      # Configuration
//! ├── companies.json   # Source list
//! └── history.json     # Seen-set ledger
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::SeenSet;

// Re-export for convenience
pub use local::LocalLedger;

/// On-disk ledger document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerData {
    /// ISO 8601 timestamp of last save
    pub updated_at: DateTime<Utc>,
    /// Identity count
    pub count: usize,
    /// Identities, sorted
    pub seen: SeenSet,
}

impl LedgerData {
    pub fn new(seen: SeenSet) -> Self {
        Self {
            updated_at: Utc::now(),
            count: seen.len(),
            seen,
        }
    }
}

/// Trait for seen-set backends.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Load the persisted set. Missing or unreadable state loads as empty.
    async fn load(&self) -> SeenSet;

    /// Replace the persisted set.
    async fn save(&self, seen: &SeenSet) -> Result<()>;
}
