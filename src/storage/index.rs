/// Per-wallet index of stored analyses
///
/// Locators are opaque, so the index is how a wallet's previous analysis is
/// found. With a backing file it survives across CLI runs.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use lens_core::StoredAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub timestamp: DateTime<Utc>,
    pub locator: String,
    pub analysis_id: String,
    pub swap_count: usize,
}

impl IndexEntry {
    /// Entry for an analysis the store has already assigned a locator to
    pub fn for_analysis(analysis: &StoredAnalysis) -> Option<Self> {
        Some(Self {
            timestamp: analysis.timestamp,
            locator: analysis.locator()?.to_string(),
            analysis_id: analysis.id.clone(),
            swap_count: analysis.metadata.swap_count,
        })
    }
}

#[derive(Debug, Default)]
pub struct WalletIndex {
    entries: DashMap<String, Vec<IndexEntry>>,
    path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl WalletIndex {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the index at `path`, starting empty when the file does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = DashMap::new();

        match fs::read(&path).await {
            Ok(body) => {
                let saved: BTreeMap<String, Vec<IndexEntry>> = serde_json::from_slice(&body)?;
                for (wallet, list) in saved {
                    entries.insert(wallet, list);
                }
                info!("📇 Loaded wallet index with {} wallets", entries.len());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No wallet index at {}, starting empty", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            entries,
            path: Some(path),
            write_lock: Mutex::new(()),
        })
    }

    /// Add an entry, keeping the wallet's list in chronological order
    ///
    /// With a backing file the entry only becomes visible once it is on disk.
    pub async fn record(&self, wallet: &str, entry: IndexEntry) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut list = self.entries(wallet);
        if list.iter().any(|existing| existing.locator == entry.locator) {
            return Ok(());
        }
        list.push(entry);
        list.sort_by_key(|e| e.timestamp);

        if let Some(path) = &self.path {
            let mut snapshot = self.snapshot();
            snapshot.insert(wallet.to_string(), list.clone());
            write_snapshot(path, &snapshot).await?;
        }

        self.entries.insert(wallet.to_string(), list);
        Ok(())
    }

    pub fn latest(&self, wallet: &str) -> Option<IndexEntry> {
        self.entries
            .get(wallet)
            .and_then(|list| list.last().cloned())
    }

    pub fn entries(&self, wallet: &str) -> Vec<IndexEntry> {
        self.entries
            .get(wallet)
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    pub fn wallets(&self) -> Vec<String> {
        let mut wallets: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        wallets.sort();
        wallets
    }

    fn snapshot(&self) -> BTreeMap<String, Vec<IndexEntry>> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}

async fn write_snapshot(
    path: &Path,
    snapshot: &BTreeMap<String, Vec<IndexEntry>>,
) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(snapshot)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, &body).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(locator: &str, hours: i64) -> IndexEntry {
        IndexEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours),
            locator: locator.to_string(),
            analysis_id: format!("analysis_{}", locator),
            swap_count: hours as usize,
        }
    }

    #[tokio::test]
    async fn test_entries_stay_chronological() {
        let index = WalletIndex::in_memory();
        index.record("0xa", entry("late", 10)).await.unwrap();
        index.record("0xa", entry("early", 1)).await.unwrap();
        index.record("0xa", entry("early", 1)).await.unwrap();

        let entries = index.entries("0xa");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].locator, "early");
        assert_eq!(index.latest("0xa").unwrap().locator, "late");
        assert!(index.latest("0xb").is_none());
        assert!(index.entries("0xb").is_empty());
    }

    #[tokio::test]
    async fn test_index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.json");

        let index = WalletIndex::open(&path).await.unwrap();
        assert!(index.wallets().is_empty());
        index.record("0xb", entry("one", 1)).await.unwrap();
        index.record("0xa", entry("two", 2)).await.unwrap();

        let reopened = WalletIndex::open(&path).await.unwrap();
        assert_eq!(reopened.wallets(), vec!["0xa".to_string(), "0xb".to_string()]);
        assert_eq!(reopened.latest("0xb").unwrap(), entry("one", 1));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_index_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        let index = WalletIndex::open(&path).await.unwrap();
        index.record("0xa", entry("kept", 1)).await.unwrap();

        // a directory squatting on the staging path makes the write fail
        std::fs::create_dir(dir.path().join("index.json.tmp")).unwrap();
        let result = index.record("0xa", entry("lost", 2)).await;
        assert!(matches!(result, Err(StoreError::Io(_))));

        assert_eq!(index.entries("0xa"), vec![entry("kept", 1)]);
        let reopened = WalletIndex::open(&path).await.unwrap();
        assert_eq!(reopened.entries("0xa"), vec![entry("kept", 1)]);
    }
}
