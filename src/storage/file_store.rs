/// Directory-backed analysis store: one `<locator>.json` file per analysis

use async_trait::async_trait;
use lens_core::StoredAnalysis;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::hash_utils::{hex_digest, is_hex_digest};
use super::{AnalysisStore, StoreError, StoredBlob};

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        info!("📁 File store ready at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, locator: &str) -> Result<PathBuf, StoreError> {
        if !is_hex_digest(locator) {
            return Err(StoreError::InvalidLocator(locator.to_string()));
        }
        Ok(self.root.join(format!("{}.json", locator)))
    }
}

#[async_trait]
impl AnalysisStore for FileStore {
    async fn put(&self, analysis: &StoredAnalysis, epochs: u32) -> Result<String, StoreError> {
        let payload = analysis.without_locator();
        let locator = hex_digest(&serde_json::to_vec(&payload)?);
        let path = self.blob_path(&locator)?;

        let body = serde_json::to_vec_pretty(&StoredBlob {
            epochs,
            analysis: payload,
        })?;

        // write-then-rename so readers never see a partial file
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, &body).await?;
        fs::rename(&staging, &path).await?;
        debug!("Wrote {} bytes to {}", body.len(), path.display());

        Ok(locator)
    }

    async fn get(&self, locator: &str) -> Result<Option<StoredAnalysis>, StoreError> {
        let path = self.blob_path(locator)?;
        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let blob: StoredBlob = serde_json::from_slice(&body)?;
        let mut analysis = blob.analysis;
        analysis.metadata.blob_id = Some(locator.to_string());
        Ok(Some(analysis))
    }
}
