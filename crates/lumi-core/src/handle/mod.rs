//! File handles and the process-local handle registry.
//!
//! A [`FileHandle`] stands in for a filesystem location the user granted
//! access to, either through a picker or a previous export. The UI only ever
//! sees the opaque `handle_id`; the registry resolves it back to the path.
//! An id, once registered, resolves to the same path for the lifetime of the
//! process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A resolved filesystem location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    /// Opaque identifier handed to the UI
    pub handle_id: String,
    /// Absolute filesystem path
    pub path: PathBuf,
}

impl FileHandle {
    /// Create a handle with a freshly minted id.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            handle_id: Uuid::new_v4().to_string(),
            path: path.into(),
        }
    }

    /// Directory containing the handle's path.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Maps handle ids to paths.
#[derive(Debug, Default)]
pub struct FileHandleRegistry {
    handles: RwLock<HashMap<String, FileHandle>>,
}

impl FileHandleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint and store a handle for `path`.
    pub fn create(&self, path: impl Into<PathBuf>) -> FileHandle {
        let handle = FileHandle::new(path);
        self.write().insert(handle.handle_id.clone(), handle.clone());
        tracing::debug!(
            "Registered file handle {} for {}",
            handle.handle_id,
            handle.path.display()
        );
        handle
    }

    /// Store an externally created handle.
    ///
    /// An id can be registered once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandle`] if the id is already registered.
    pub fn register(&self, handle: FileHandle) -> Result<()> {
        let mut handles = self.write();
        if let Some(existing) = handles.get(&handle.handle_id) {
            return Err(Error::InvalidHandle(format!(
                "{} already resolves to {}",
                handle.handle_id,
                existing.path.display()
            )));
        }
        handles.insert(handle.handle_id.clone(), handle);
        Ok(())
    }

    /// Resolve a handle id.
    pub fn get_by_id(&self, handle_id: &str) -> Option<FileHandle> {
        self.handles
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(handle_id)
            .cloned()
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.handles
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether no handle has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, FileHandle>> {
        self.handles
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
