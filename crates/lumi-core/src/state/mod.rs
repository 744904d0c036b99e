//! Cross-call UI state shared by the controller operations.
//!
//! [`StateStore`] holds the last directory a picker or export touched and the
//! flag telling the UI to block keyboard input while a package is written.
//! The store is passed to the orchestrators explicitly; changes are published
//! on a `watch` channel so the UI layer can mirror them.
//!
//! The block flag is only ever raised through [`StateStore::block_ui`], whose
//! guard lowers it again when dropped. Guards nest: the flag stays raised
//! while any guard is alive.
//!
//! `last_directory` is persisted to a small JSON file when the store was
//! loaded from one, written with `tokio::fs` so callers on the runtime never
//! block. The block flag is never persisted.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

use crate::error::{Error, Result};

/// Current version of the state file format.
const STATE_FILE_VERSION: u32 = 1;

/// Snapshot of the UI state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// Directory most recently chosen or written to
    pub last_directory: Option<PathBuf>,
    /// Whether conflicting keyboard input should be blocked
    pub block_keyboard: bool,
    block_depth: usize,
}

/// On-disk form of the persisted state.
#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    updated_at: DateTime<Utc>,
    last_directory: Option<PathBuf>,
}

/// Holder of [`UiState`].
#[derive(Debug)]
pub struct StateStore {
    state: watch::Sender<UiState>,
    path: Option<PathBuf>,
    saving: Mutex<()>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(UiState::default()),
            path: None,
            saving: Mutex::new(()),
        }
    }

    /// Load the store from a state file, starting empty if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let mut state = UiState::default();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::ConfigError(format!(
                    "Failed to read state file at {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let file: StateFile = serde_json::from_str(&content).map_err(|e| {
                Error::ConfigError(format!(
                    "Failed to parse state file at {}: {}",
                    path.display(),
                    e
                ))
            })?;
            if file.version == STATE_FILE_VERSION {
                state.last_directory = file.last_directory;
            } else {
                tracing::warn!(
                    "Ignoring state file with unknown version {}",
                    file.version
                );
            }
        }

        Ok(Self {
            state: watch::Sender::new(state),
            path: Some(path),
            saving: Mutex::new(()),
        })
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    /// Directory used to seed the next picker.
    ///
    /// Falls back to the user's documents folder, then home, then `.`.
    pub fn last_directory(&self) -> PathBuf {
        if let Some(dir) = self.state.borrow().last_directory.clone() {
            return dir;
        }
        directories::UserDirs::new()
            .map(|dirs| {
                dirs.document_dir()
                    .map_or_else(|| dirs.home_dir().to_path_buf(), Path::to_path_buf)
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Remember `dir` as the last used directory.
    ///
    /// The new value is visible immediately; the state file is written
    /// before this resolves.
    pub async fn set_last_directory(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        tracing::debug!("Last directory is now {}", dir.display());
        self.state.send_modify(|state| state.last_directory = Some(dir));

        if let Err(e) = self.save().await {
            tracing::warn!("Failed to persist UI state: {}", e);
        }
    }

    /// Whether UI input is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.state.borrow().block_keyboard
    }

    /// Raise the block flag until the returned guard is dropped.
    pub fn block_ui(&self) -> UiBlockGuard<'_> {
        self.state.send_modify(|state| {
            state.block_depth += 1;
            state.block_keyboard = true;
        });
        UiBlockGuard { store: self }
    }

    fn release_block(&self) {
        self.state.send_modify(|state| {
            state.block_depth = state.block_depth.saturating_sub(1);
            state.block_keyboard = state.block_depth > 0;
        });
    }

    /// Write the current state. Saves are serialized so the file always ends
    /// up with the latest value.
    async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _saving = self.saving.lock().await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = StateFile {
            version: STATE_FILE_VERSION,
            updated_at: Utc::now(),
            last_directory: self.state.borrow().last_directory.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

/// Keeps the UI block flag raised while alive.
#[derive(Debug)]
#[must_use = "the UI is unblocked as soon as the guard is dropped"]
pub struct UiBlockGuard<'a> {
    store: &'a StateStore,
}

impl Drop for UiBlockGuard<'_> {
    fn drop(&mut self) {
        self.store.release_block();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_block_guard_restores_flag() {
        let store = StateStore::new();
        assert!(!store.is_blocked());

        {
            let _guard = store.block_ui();
            assert!(store.is_blocked());
        }

        assert!(!store.is_blocked());
    }

    #[test]
    fn test_nested_guards() {
        let store = StateStore::new();
        let outer = store.block_ui();
        let inner = store.block_ui();

        drop(inner);
        assert!(store.is_blocked(), "outer guard still holds the flag");

        drop(outer);
        assert!(!store.is_blocked());
    }

    #[test]
    fn test_guard_released_on_panic() {
        let store = StateStore::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.block_ui();
            panic!("write blew up");
        }));

        assert!(result.is_err());
        assert!(!store.is_blocked());
    }

    #[tokio::test]
    async fn test_last_directory_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        let store = StateStore::load_from(path.clone()).unwrap();
        store.set_last_directory("/docs").await;

        let reloaded = StateStore::load_from(path).unwrap();
        assert_eq!(reloaded.last_directory(), PathBuf::from("/docs"));
        assert!(!reloaded.is_blocked());
    }

    #[tokio::test]
    async fn test_block_flag_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        let store = StateStore::load_from(path.clone()).unwrap();
        let _guard = store.block_ui();
        store.set_last_directory("/docs").await;

        let content = fs::read_to_string(path).unwrap();
        assert!(!content.contains("block"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_saves_keep_latest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/state.json");
        let store = std::sync::Arc::new(StateStore::load_from(path.clone()).unwrap());

        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.set_last_directory(format!("/docs/{i}")).await;
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let reloaded = StateStore::load_from(path).unwrap();
        assert_eq!(reloaded.last_directory(), store.last_directory());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = StateStore::new();
        let mut rx = store.subscribe();

        let guard = store.block_ui();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().block_keyboard);

        drop(guard);
        rx.changed().await.unwrap();
        assert!(!rx.borrow().block_keyboard);
    }
}
