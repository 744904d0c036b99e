//! Filesystem-backed content engine.
//!
//! Each content item lives in `<root>/<id>/` as `h5p.json` plus
//! `content.json`. Ids are decimal numbers allocated in increasing order and
//! never reused: the highest id ever issued is kept in `<root>/.last-id`, so
//! deleting the newest item does not hand its id to the next one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::{Error, Result};

use super::{package, Content, ContentEngine, ContentMetadata};

const METADATA_FILE: &str = "h5p.json";
const PARAMETERS_FILE: &str = "content.json";
const LAST_ID_FILE: &str = ".last-id";

/// Content engine storing items as directories.
#[derive(Debug)]
pub struct DirectoryContentEngine {
    root: PathBuf,
    allocation: Mutex<()>,
}

/// Summary of a stored item, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    /// Content id
    pub id: String,
    /// Title, if the metadata has one
    pub title: Option<String>,
    /// Main library machine name
    pub main_library: String,
}

impl DirectoryContentEngine {
    /// Create an engine rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            allocation: Mutex::new(()),
        }
    }

    /// Storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List stored items in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage root cannot be read.
    pub async fn list(&self) -> Result<Vec<ContentSummary>> {
        let mut ids = self.stored_ids().await?;
        ids.sort_unstable();

        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.to_string();
            match self.read_metadata(&id).await {
                Ok(metadata) => summaries.push(ContentSummary {
                    id,
                    title: metadata.title,
                    main_library: metadata.main_library,
                }),
                Err(e) => tracing::warn!("Skipping unreadable content {}: {}", id, e),
            }
        }
        Ok(summaries)
    }

    fn item_dir(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(self.root.join(id))
        } else {
            Err(Error::ContentNotFound(id.to_string()))
        }
    }

    async fn stored_ids(&self) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry.file_name().to_str().and_then(|n| n.parse().ok()) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Issue the next id and record it as the high-water mark.
    ///
    /// Callers hold the allocation lock.
    async fn allocate_id(&self) -> Result<u64> {
        let stored = self.stored_ids().await?.into_iter().max().unwrap_or(0);
        let next = stored.max(self.last_issued_id().await?) + 1;

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(LAST_ID_FILE), next.to_string()).await?;
        Ok(next)
    }

    async fn last_issued_id(&self) -> Result<u64> {
        match tokio::fs::read_to_string(self.root.join(LAST_ID_FILE)).await {
            Ok(text) => Ok(text.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring unreadable id mark in {}", self.root.display());
                0
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_metadata(&self, id: &str) -> Result<ContentMetadata> {
        let path = self.item_dir(id)?.join(METADATA_FILE);
        let bytes = read_existing(&path, id).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_item(
        &self,
        dir: &Path,
        parameters: &serde_json::Value,
        metadata: &ContentMetadata,
    ) -> Result<()> {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(
            dir.join(METADATA_FILE),
            serde_json::to_vec_pretty(metadata)?,
        )
        .await?;
        tokio::fs::write(dir.join(PARAMETERS_FILE), serde_json::to_vec(parameters)?).await?;
        Ok(())
    }
}

async fn read_existing(path: &Path, id: &str) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::ContentNotFound(id.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Fills in `main_library` from a `"<machine name> <version>"` library string.
fn with_main_library(metadata: &ContentMetadata, library: &str) -> ContentMetadata {
    let mut metadata = metadata.clone();
    if metadata.main_library.is_empty() {
        if let Some(machine_name) = library.split_whitespace().next() {
            metadata.main_library = machine_name.to_string();
        }
    }
    metadata
}

#[async_trait]
impl ContentEngine for DirectoryContentEngine {
    async fn get_content(&self, id: &str) -> Result<Content> {
        let metadata = self.read_metadata(id).await?;
        let bytes = read_existing(&self.item_dir(id)?.join(PARAMETERS_FILE), id).await?;
        Ok(Content {
            metadata,
            parameters: serde_json::from_slice(&bytes)?,
        })
    }

    async fn content_exists(&self, id: &str) -> Result<bool> {
        let Ok(dir) = self.item_dir(id) else {
            return Ok(false);
        };
        Ok(tokio::fs::try_exists(dir.join(METADATA_FILE)).await?)
    }

    async fn save_or_update_content(
        &self,
        id: Option<&str>,
        parameters: &serde_json::Value,
        metadata: &ContentMetadata,
        library: &str,
    ) -> Result<String> {
        let metadata = with_main_library(metadata, library);

        if let Some(id) = id {
            let dir = self.item_dir(id)?;
            self.write_item(&dir, parameters, &metadata).await?;
            tracing::debug!("Updated content {}", id);
            return Ok(id.to_string());
        }

        let _allocation = self.allocation.lock().await;
        let id = self.allocate_id().await?.to_string();
        self.write_item(&self.root.join(&id), parameters, &metadata)
            .await?;
        tracing::debug!("Created content {}", id);
        Ok(id)
    }

    async fn upload_package(&self, bytes: &[u8]) -> Result<Content> {
        package::decode(bytes)
    }

    async fn delete_content(&self, id: &str) -> Result<()> {
        let dir = self.item_dir(id)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::debug!("Deleted content {}", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::ContentNotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_package(
        &self,
        id: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<()> {
        let content = self.get_content(id).await?;
        let bytes = package::encode(&content)?;
        sink.write_all(&bytes).await?;
        Ok(())
    }
}
