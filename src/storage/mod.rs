/// Persistence of analyzed profiles
///
/// The store itself is an external collaborator behind `AnalysisStore`.
/// This module shapes payloads, decides whether a fresh profile is worth
/// writing, and keeps a per-wallet index of what has been written.

pub mod change_detection;
pub mod file_store;
pub mod hash_utils;
pub mod index;
pub mod memory_store;

pub use change_detection::*;
pub use file_store::FileStore;
pub use index::{IndexEntry, WalletIndex};
pub use memory_store::MemoryStore;

use async_trait::async_trait;
use lens_core::StoredAnalysis;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content-addressed store for analyses
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist the payload (any locator on it is ignored) for `epochs`, returning its locator
    async fn put(&self, analysis: &StoredAnalysis, epochs: u32) -> Result<String, StoreError>;

    /// Fetch by locator; the returned analysis carries the locator in its metadata
    async fn get(&self, locator: &str) -> Result<Option<StoredAnalysis>, StoreError>;
}

/// What a backend actually keeps for each analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredBlob {
    pub epochs: u32,
    pub analysis: StoredAnalysis,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}
