//! Export, import and editor operations.
//!
//! [`LumiController`] is the facade the UI talks to. It wires the content
//! engine, file pickers, handle registry, UI state, write sinks and error
//! telemetry together, and emits completion events on an optional
//! [`DeferredEventChannel`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lumi_core::content::DirectoryContentEngine;
//! use lumi_core::controller::LumiController;
//! use lumi_core::pickers::TerminalPickers;
//!
//! let controller = LumiController::builder(
//!     Arc::new(DirectoryContentEngine::new("/var/lumi/content")),
//!     Arc::new(TerminalPickers::stdin()),
//! )
//! .build();
//!
//! let exported = controller.export("1", None).await?;
//! let imported = controller.import(&exported.file_handle_id).await?;
//! ```

mod export;
mod filename;
mod import;
mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::channel::DeferredEventChannel;
use crate::config::ExportConfig;
use crate::content::{ContentEngine, ContentMetadata};
use crate::error::{Error, Result};
use crate::handle::FileHandleRegistry;
use crate::pickers::{FilePickers, OpenDialog};
use crate::state::StateStore;
use crate::telemetry::{ErrorReporter, TracingReporter};

pub use filename::{sanitize_filename, with_package_extension};
pub use sink::{FileSink, FileSinkFactory, PackageSink, SinkFactory};

/// Event emitted after a package was written.
pub const EXPORT_FINISHED_EVENT: &str = "export-finished";

/// Event emitted after a package was imported.
pub const IMPORT_FINISHED_EVENT: &str = "import-finished";

/// Id the UI sends when it has no content id yet.
const UNDEFINED_ID: &str = "undefined";

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// Handle resolving to `path`, reusable for later exports
    pub file_handle_id: String,
    /// Path the package was written to
    pub path: PathBuf,
}

/// Stored content as returned by import and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContent {
    /// Content id
    pub id: String,
    /// Main library ubername
    pub library: String,
    /// Package metadata
    pub metadata: ContentMetadata,
    /// Content parameters
    pub parameters: serde_json::Value,
}

/// Content shaped for the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorContent {
    /// Package metadata
    pub h5p: ContentMetadata,
    /// Main library ubername
    pub library: String,
    /// Editor parameters
    pub params: EditorParams,
}

/// Parameters block of [`EditorContent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorParams {
    /// Package metadata
    pub metadata: ContentMetadata,
    /// Content parameters
    pub params: serde_json::Value,
}

/// A file chosen through a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedFile {
    /// Handle resolving to `path`
    pub file_handle_id: String,
    /// Chosen path
    pub path: PathBuf,
}

/// Facade over the bridge operations.
pub struct LumiController {
    engine: Arc<dyn ContentEngine>,
    pickers: Arc<dyn FilePickers>,
    handles: Arc<FileHandleRegistry>,
    state: Arc<StateStore>,
    sinks: Arc<dyn SinkFactory>,
    reporter: Arc<dyn ErrorReporter>,
    events: Option<DeferredEventChannel>,
    export: ExportConfig,
}

impl std::fmt::Debug for LumiController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LumiController")
            .field("handles", &self.handles.len())
            .field("state", &self.state.snapshot())
            .field("events", &self.events)
            .field("export", &self.export)
            .finish_non_exhaustive()
    }
}

/// Builder for [`LumiController`].
pub struct ControllerBuilder {
    engine: Arc<dyn ContentEngine>,
    pickers: Arc<dyn FilePickers>,
    handles: Option<Arc<FileHandleRegistry>>,
    state: Option<Arc<StateStore>>,
    sinks: Option<Arc<dyn SinkFactory>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    events: Option<DeferredEventChannel>,
    export: ExportConfig,
}

impl ControllerBuilder {
    /// Use a shared UI state store.
    #[must_use]
    pub fn with_state(mut self, state: Arc<StateStore>) -> Self {
        self.state = Some(state);
        self
    }

    /// Use a shared handle registry.
    #[must_use]
    pub fn with_handles(mut self, handles: Arc<FileHandleRegistry>) -> Self {
        self.handles = Some(handles);
        self
    }

    /// Write packages through `sinks` instead of plain files.
    #[must_use]
    pub fn with_sinks(mut self, sinks: Arc<dyn SinkFactory>) -> Self {
        self.sinks = Some(sinks);
        self
    }

    /// Report failures to `reporter`.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Emit completion events on `events`.
    #[must_use]
    pub fn with_events(mut self, events: DeferredEventChannel) -> Self {
        self.events = Some(events);
        self
    }

    /// Override the export dialog and package settings.
    #[must_use]
    pub fn with_export_config(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }

    /// Build the controller.
    #[must_use]
    pub fn build(self) -> LumiController {
        LumiController {
            engine: self.engine,
            pickers: self.pickers,
            handles: self.handles.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            sinks: self.sinks.unwrap_or_else(|| Arc::new(FileSinkFactory)),
            reporter: self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
            events: self.events,
            export: self.export,
        }
    }
}

impl LumiController {
    /// Start building a controller around an engine and pickers.
    #[must_use]
    pub fn builder(
        engine: Arc<dyn ContentEngine>,
        pickers: Arc<dyn FilePickers>,
    ) -> ControllerBuilder {
        ControllerBuilder {
            engine,
            pickers,
            handles: None,
            state: None,
            sinks: None,
            reporter: None,
            events: None,
            export: ExportConfig::default(),
        }
    }

    /// The handle registry.
    pub fn handles(&self) -> &Arc<FileHandleRegistry> {
        &self.handles
    }

    /// The UI state store.
    pub fn state(&self) -> &Arc<StateStore> {
        &self.state
    }

    /// The event channel, if one is attached.
    pub fn events(&self) -> Option<&DeferredEventChannel> {
        self.events.as_ref()
    }

    /// Store edited content.
    ///
    /// Creates new content when `id` is `None` or `"undefined"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentNotFound`] if `id` is given but nothing is
    /// stored under it.
    pub async fn update(
        &self,
        parameters: serde_json::Value,
        metadata: ContentMetadata,
        library: String,
        id: Option<&str>,
    ) -> Result<SavedContent> {
        let id = id.filter(|id| *id != UNDEFINED_ID);

        if let Some(id) = id {
            if !self.engine.content_exists(id).await? {
                return Err(Error::ContentNotFound(id.to_string()));
            }
        }

        let id = self
            .engine
            .save_or_update_content(id, &parameters, &metadata, &library)
            .await?;
        tracing::info!("Saved content {} ({})", id, library);

        Ok(SavedContent {
            id,
            library,
            metadata,
            parameters,
        })
    }

    /// Delete stored content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentNotFound`] if nothing is stored under `id`.
    pub async fn delete(&self, content_id: &str) -> Result<()> {
        if !self.engine.content_exists(content_id).await? {
            return Err(Error::ContentNotFound(content_id.to_string()));
        }
        self.engine.delete_content(content_id).await?;
        tracing::info!("Deleted content {}", content_id);
        Ok(())
    }

    /// Load content shaped for the editor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentNotFound`] if nothing is stored under `id`.
    pub async fn load_package(&self, content_id: &str) -> Result<EditorContent> {
        let content = self.engine.get_content(content_id).await?;
        let library = content.metadata.main_library_uber_name();

        Ok(EditorContent {
            h5p: content.metadata.clone(),
            library,
            params: EditorParams {
                metadata: content.metadata,
                params: content.parameters,
            },
        })
    }

    /// Let the user pick a stylesheet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserAborted`] if the dialog is cancelled.
    pub async fn pick_css_file(&self) -> Result<PickedFile> {
        let dialog = OpenDialog {
            extensions: vec!["css".to_string()],
            format_name: "CSS".to_string(),
            default_directory: self.state.last_directory(),
        };

        let path = self
            .pickers
            .open_single_file(dialog)
            .await?
            .ok_or(Error::UserAborted)?;
        Ok(self.picked(path).await)
    }

    /// Let the user pick packages to import.
    ///
    /// Returns `None` when the dialog is cancelled or nothing was chosen.
    ///
    /// # Errors
    ///
    /// Returns an error if the picker itself fails.
    pub async fn pick_h5p_files(&self) -> Result<Option<Vec<PickedFile>>> {
        let dialog = OpenDialog {
            extensions: vec![self.export.package_extension.clone()],
            format_name: self.export.format_name.clone(),
            default_directory: self.state.last_directory(),
        };

        let Some(paths) = self.pickers.open_multiple_files(dialog).await? else {
            return Ok(None);
        };
        if paths.is_empty() {
            return Ok(None);
        }

        if let Some(dir) = paths[0].parent() {
            self.state.set_last_directory(dir).await;
        }
        let picked = paths
            .into_iter()
            .map(|path| {
                let handle = self.handles.create(path);
                PickedFile {
                    file_handle_id: handle.handle_id,
                    path: handle.path,
                }
            })
            .collect();
        Ok(Some(picked))
    }

    async fn picked(&self, path: PathBuf) -> PickedFile {
        if let Some(dir) = path.parent() {
            self.state.set_last_directory(dir).await;
        }
        let handle = self.handles.create(path);
        PickedFile {
            file_handle_id: handle.handle_id,
            path: handle.path,
        }
    }

    fn emit<T: Serialize>(&self, name: &str, value: &T) {
        if let Some(events) = &self.events {
            if let Err(e) = events.emit_json(name, value) {
                tracing::warn!("Failed to emit {}: {}", name, e);
            }
        }
    }

    /// Report a failed operation unless the user just cancelled.
    fn report(&self, operation: &str, error: &Error) {
        if !error.is_user_abort() {
            self.reporter.report(operation, error);
        }
    }
}
