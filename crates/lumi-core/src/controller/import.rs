//! Package import.

use crate::error::{Error, Result};

use super::{LumiController, SavedContent, IMPORT_FINISHED_EVENT};

impl LumiController {
    /// Import the package behind `file_handle_id` as new content.
    ///
    /// Import never overwrites: every call stores a fresh content item.
    ///
    /// # Errors
    ///
    /// - [`Error::HandleNotResolved`] if the handle is unknown
    /// - [`Error::InvalidPackage`] if the file is not a readable package
    pub async fn import(&self, file_handle_id: &str) -> Result<SavedContent> {
        match self.import_inner(file_handle_id).await {
            Ok(saved) => {
                tracing::info!("Imported content {} ({})", saved.id, saved.library);
                self.emit(IMPORT_FINISHED_EVENT, &saved);
                Ok(saved)
            }
            Err(e) => {
                self.report("import", &e);
                Err(e)
            }
        }
    }

    async fn import_inner(&self, file_handle_id: &str) -> Result<SavedContent> {
        let handle = self
            .handles
            .get_by_id(file_handle_id)
            .ok_or_else(|| Error::HandleNotResolved(file_handle_id.to_string()))?;

        tracing::debug!("Importing {}", handle.path.display());
        let bytes = tokio::fs::read(&handle.path).await?;
        let content = self.engine.upload_package(&bytes).await?;

        let library = content.metadata.main_library_uber_name();
        if library.is_empty() {
            tracing::warn!(
                "Main library {} of {} is not among its dependencies",
                content.metadata.main_library,
                handle.path.display()
            );
        }

        let id = self
            .engine
            .save_or_update_content(None, &content.parameters, &content.metadata, &library)
            .await?;

        Ok(SavedContent {
            id,
            library,
            metadata: content.metadata,
            parameters: content.parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::content::{package, Content, ContentMetadata, DirectoryContentEngine};
    use crate::pickers::PresetPickers;
    use crate::telemetry::MemoryReporter;

    fn quiz() -> Content {
        Content {
            metadata: serde_json::from_value(json!({
                "title": "Fractions",
                "mainLibrary": "H5P.MultiChoice",
                "preloadedDependencies": [
                    {"machineName": "H5P.Question", "majorVersion": 1, "minorVersion": 5},
                    {"machineName": "H5P.MultiChoice", "majorVersion": 1, "minorVersion": 16}
                ]
            }))
            .unwrap(),
            parameters: json!({"question": "1/2 + 1/4?"}),
        }
    }

    fn controller(temp_dir: &TempDir, reporter: Arc<MemoryReporter>) -> LumiController {
        let engine = DirectoryContentEngine::new(temp_dir.path().join("content"));
        LumiController::builder(Arc::new(engine), Arc::new(PresetPickers::cancelling()))
            .with_reporter(reporter)
            .build()
    }

    #[tokio::test]
    async fn test_import_creates_new_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("quiz.h5p");
        std::fs::write(&path, package::encode(&quiz()).unwrap()).unwrap();
        let controller = controller(&temp_dir, Arc::new(MemoryReporter::new()));
        let handle = controller.handles().create(&path);

        let first = controller.import(&handle.handle_id).await.unwrap();
        let second = controller.import(&handle.handle_id).await.unwrap();

        assert_eq!(first.library, "H5P.MultiChoice 1.16");
        assert_eq!(first.parameters, json!({"question": "1/2 + 1/4?"}));
        assert_eq!(first.metadata.title.as_deref(), Some("Fractions"));
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_import_tolerates_missing_main_library() {
        let temp_dir = TempDir::new().unwrap();
        let mut content = quiz();
        content.metadata = ContentMetadata {
            main_library: "H5P.Missing".into(),
            ..content.metadata
        };
        let path = temp_dir.path().join("degraded.h5p");
        std::fs::write(&path, package::encode(&content).unwrap()).unwrap();
        let controller = controller(&temp_dir, Arc::new(MemoryReporter::new()));
        let handle = controller.handles().create(&path);

        let saved = controller.import(&handle.handle_id).await.unwrap();

        assert_eq!(saved.library, "");
    }

    #[tokio::test]
    async fn test_import_unknown_handle() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = Arc::new(MemoryReporter::new());
        let controller = controller(&temp_dir, reporter.clone());

        let err = controller.import("nope").await.unwrap_err();

        assert!(matches!(err, Error::HandleNotResolved(id) if id == "nope"));
        assert_eq!(reporter.reports().len(), 1);
    }

    #[tokio::test]
    async fn test_import_invalid_package() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.h5p");
        std::fs::write(&path, b"not a zip").unwrap();
        let controller = controller(&temp_dir, Arc::new(MemoryReporter::new()));
        let handle = controller.handles().create(&path);

        let err = controller.import(&handle.handle_id).await.unwrap_err();

        assert!(matches!(err, Error::InvalidPackage(_)));
    }
}
