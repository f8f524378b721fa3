/// In-process analysis store, used for `backend = "memory"` and in tests

use async_trait::async_trait;
use dashmap::DashMap;
use lens_core::StoredAnalysis;
use tracing::debug;

use super::hash_utils::hex_digest;
use super::{AnalysisStore, StoreError, StoredBlob};

pub const MEMORY_LOCATOR_PREFIX: &str = "mem-";

/// Serialized blobs keyed by `mem-<xxh64>` locators
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn put(&self, analysis: &StoredAnalysis, epochs: u32) -> Result<String, StoreError> {
        let payload = analysis.without_locator();
        let body = serde_json::to_string(&payload)?;
        let locator = format!("{}{}", MEMORY_LOCATOR_PREFIX, hex_digest(body.as_bytes()));

        let blob = serde_json::to_string(&StoredBlob {
            epochs,
            analysis: payload,
        })?;
        self.blobs.insert(locator.clone(), blob);
        debug!("Memory store holds {} blobs", self.blobs.len());

        Ok(locator)
    }

    async fn get(&self, locator: &str) -> Result<Option<StoredAnalysis>, StoreError> {
        let raw = match self.blobs.get(locator) {
            Some(entry) => entry.value().clone(),
            None => return Ok(None),
        };

        let blob: StoredBlob = serde_json::from_str(&raw)?;
        let mut analysis = blob.analysis;
        analysis.metadata.blob_id = Some(locator.to_string());
        Ok(Some(analysis))
    }
}
