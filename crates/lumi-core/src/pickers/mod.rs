//! File dialogs.
//!
//! Dialogs are suspension points: they resolve to `Some` with the chosen
//! path(s) or `None` when the user cancels. Cancellation is never an error at
//! this layer; the controller turns it into
//! [`Error::UserAborted`](crate::Error::UserAborted) where an operation cannot
//! proceed without a file.

mod preset;
mod terminal;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

pub use preset::PresetPickers;
pub use terminal::TerminalPickers;

/// Parameters of a save dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDialog {
    /// Accepted extensions, without dots
    pub extensions: Vec<String>,
    /// Name of the file type filter
    pub format_name: String,
    /// Pre-filled path (last directory joined with the suggested filename)
    pub suggested_path: PathBuf,
    /// Dialog title
    pub title: String,
}

/// Parameters of an open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDialog {
    /// Accepted extensions, without dots
    pub extensions: Vec<String>,
    /// Name of the file type filter
    pub format_name: String,
    /// Directory the dialog starts in
    pub default_directory: PathBuf,
}

impl OpenDialog {
    /// Whether `path` passes the extension filter.
    #[must_use]
    pub fn accepts(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

/// Interactive file pickers.
#[async_trait]
pub trait FilePickers: Send + Sync {
    /// Ask for a path to save to.
    async fn save_file(&self, dialog: SaveDialog) -> Result<Option<PathBuf>>;

    /// Ask for one existing file.
    async fn open_single_file(&self, dialog: OpenDialog) -> Result<Option<PathBuf>>;

    /// Ask for any number of existing files.
    async fn open_multiple_files(&self, dialog: OpenDialog) -> Result<Option<Vec<PathBuf>>>;
}
