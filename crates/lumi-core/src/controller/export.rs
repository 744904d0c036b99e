//! Package export.
//!
//! An export is only reported as done once the sink has confirmed the write.
//! The UI stays blocked for the whole write, and a failed write leaves the
//! target as it was, so a failed re-export keeps the previous package.

use std::path::Path;

use crate::error::{Error, Result};
use crate::handle::FileHandle;
use crate::pickers::SaveDialog;

use super::{
    sanitize_filename, with_package_extension, ExportResult, LumiController,
    EXPORT_FINISHED_EVENT,
};

impl LumiController {
    /// Write the package of `content_id` to disk.
    ///
    /// Reuses `file_handle_id` when it resolves, so re-exports go to the same
    /// file without a dialog. Otherwise the user picks a target in a save
    /// dialog pre-filled from the content title.
    ///
    /// # Errors
    ///
    /// - [`Error::ContentNotFound`] if nothing is stored under `content_id`
    /// - [`Error::UserAborted`] if the save dialog is cancelled
    /// - [`Error::WriteFailure`] if the package could not be written
    pub async fn export(
        &self,
        content_id: &str,
        file_handle_id: Option<&str>,
    ) -> Result<ExportResult> {
        match self.export_inner(content_id, file_handle_id).await {
            Ok(result) => {
                tracing::info!(
                    "Exported content {} to {}",
                    content_id,
                    result.path.display()
                );
                self.emit(EXPORT_FINISHED_EVENT, &result);
                Ok(result)
            }
            Err(e) => {
                if e.is_user_abort() {
                    tracing::debug!("Export of {} cancelled", content_id);
                }
                self.report("export", &e);
                Err(e)
            }
        }
    }

    async fn export_inner(
        &self,
        content_id: &str,
        file_handle_id: Option<&str>,
    ) -> Result<ExportResult> {
        let content = self.engine.get_content(content_id).await?;

        let handle = match file_handle_id.and_then(|id| self.handles.get_by_id(id)) {
            Some(handle) => {
                tracing::debug!("Reusing file handle {}", handle.handle_id);
                handle
            }
            None => self.pick_target(content.metadata.title.as_deref()).await?,
        };

        if let Some(dir) = handle.directory() {
            self.state.set_last_directory(dir).await;
        }

        let path = with_package_extension(&handle.path, &self.export.package_extension);
        let handle = if path == handle.path {
            handle
        } else {
            self.handles.create(path)
        };

        let _guard = self.state.block_ui();
        if let Err(e) = self.write_package(content_id, &handle.path).await {
            return Err(match e {
                Error::Io(io) => Error::WriteFailure(io.to_string()),
                other => other,
            });
        }

        Ok(ExportResult {
            file_handle_id: handle.handle_id,
            path: handle.path,
        })
    }

    async fn pick_target(&self, title: Option<&str>) -> Result<FileHandle> {
        let filename = sanitize_filename(title, &self.export.fallback_filename);
        let dialog = SaveDialog {
            extensions: vec![self.export.package_extension.clone()],
            format_name: self.export.format_name.clone(),
            suggested_path: self.state.last_directory().join(filename),
            title: self.export.dialog_title.clone(),
        };

        let path = self
            .pickers
            .save_file(dialog)
            .await?
            .ok_or(Error::UserAborted)?;
        Ok(self.handles.create(path))
    }

    /// Serialize into a fresh sink and wait for the sink to confirm.
    async fn write_package(&self, content_id: &str, path: &Path) -> Result<()> {
        let mut sink = self.sinks.open(path).await?;
        if let Err(e) = self.engine.write_package(content_id, sink.writer()).await {
            sink.abort().await;
            return Err(e);
        }
        sink.finish().await
    }
}
