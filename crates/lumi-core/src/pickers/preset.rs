//! Non-interactive pickers answering with preset paths.
//!
//! Used by the CLI when paths come from flags, and by tests to script the
//! user's choices and count how often a dialog was shown.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;

use super::{FilePickers, OpenDialog, SaveDialog};

/// Pickers returning fixed answers. A missing answer means "cancelled".
#[derive(Debug, Default)]
pub struct PresetPickers {
    save: Option<PathBuf>,
    open: Vec<PathBuf>,
    dialogs_shown: AtomicUsize,
    last_save_dialog: Mutex<Option<SaveDialog>>,
}

impl PresetPickers {
    /// Pickers that cancel every dialog.
    #[must_use]
    pub fn cancelling() -> Self {
        Self::default()
    }

    /// Answer save dialogs with `path`.
    #[must_use]
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save = Some(path.into());
        self
    }

    /// Answer open dialogs with `paths`.
    #[must_use]
    pub fn with_open_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.open = paths;
        self
    }

    /// How many dialogs have been shown.
    pub fn dialogs_shown(&self) -> usize {
        self.dialogs_shown.load(Ordering::SeqCst)
    }

    /// The most recent save dialog request.
    pub fn last_save_dialog(&self) -> Option<SaveDialog> {
        self.last_save_dialog
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn shown(&self) {
        self.dialogs_shown.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl FilePickers for PresetPickers {
    async fn save_file(&self, dialog: SaveDialog) -> Result<Option<PathBuf>> {
        self.shown();
        *self
            .last_save_dialog
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(dialog);
        Ok(self.save.clone())
    }

    async fn open_single_file(&self, dialog: OpenDialog) -> Result<Option<PathBuf>> {
        self.shown();
        Ok(self.open.iter().find(|path| dialog.accepts(path)).cloned())
    }

    async fn open_multiple_files(&self, dialog: OpenDialog) -> Result<Option<Vec<PathBuf>>> {
        self.shown();
        let accepted: Vec<PathBuf> = self
            .open
            .iter()
            .filter(|path| dialog.accepts(path))
            .cloned()
            .collect();
        Ok((!accepted.is_empty()).then_some(accepted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_dialog(ext: &str) -> OpenDialog {
        OpenDialog {
            extensions: vec![ext.into()],
            format_name: String::new(),
            default_directory: PathBuf::from("/"),
        }
    }

    #[tokio::test]
    async fn test_cancelling() {
        let pickers = PresetPickers::cancelling();
        let dialog = SaveDialog {
            extensions: vec!["h5p".into()],
            format_name: "H5P package".into(),
            suggested_path: PathBuf::from("/docs/untitled"),
            title: "Save".into(),
        };

        assert!(pickers.save_file(dialog.clone()).await.unwrap().is_none());
        assert_eq!(pickers.dialogs_shown(), 1);
        assert_eq!(pickers.last_save_dialog(), Some(dialog));
    }

    #[tokio::test]
    async fn test_open_filters_by_extension() {
        let pickers = PresetPickers::default()
            .with_open_paths(vec![PathBuf::from("/a.css"), PathBuf::from("/b.h5p")]);

        assert_eq!(
            pickers.open_single_file(open_dialog("css")).await.unwrap(),
            Some(PathBuf::from("/a.css"))
        );
        assert_eq!(
            pickers.open_multiple_files(open_dialog("h5p")).await.unwrap(),
            Some(vec![PathBuf::from("/b.h5p")])
        );
        assert!(pickers
            .open_multiple_files(open_dialog("zip"))
            .await
            .unwrap()
            .is_none());
    }
}
