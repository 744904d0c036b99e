//! Common test utilities for `Lumi` integration tests.
//!
//! This module provides shared functionality for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use lumi_core::config::ExportConfig;
use lumi_core::content::{package, Content, ContentEngine, ContentMetadata, DirectoryContentEngine};
use lumi_core::controller::LumiController;
use lumi_core::pickers::PresetPickers;
use lumi_core::state::StateStore;
use lumi_core::telemetry::MemoryReporter;

/// Create a temporary directory for test files.
///
/// The directory will be automatically cleaned up when the returned
/// `TempDir` is dropped.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Metadata of a multiple choice quiz with two dependencies.
pub fn quiz_metadata(title: &str) -> ContentMetadata {
    serde_json::from_value(json!({
        "title": title,
        "mainLibrary": "H5P.MultiChoice",
        "language": "en",
        "preloadedDependencies": [
            {"machineName": "H5P.Question", "majorVersion": 1, "minorVersion": 5},
            {"machineName": "H5P.MultiChoice", "majorVersion": 1, "minorVersion": 16}
        ]
    }))
    .expect("valid metadata")
}

/// Write a quiz package file and return its path.
pub fn create_package_file(dir: &Path, name: &str, title: &str) -> PathBuf {
    let content = Content {
        metadata: quiz_metadata(title),
        parameters: json!({"question": format!("{title}?"), "answers": ["yes", "no"]}),
    };
    let path = dir.join(name);
    std::fs::write(&path, package::encode(&content).expect("encode package"))
        .expect("Failed to write package");
    path
}

/// A controller over a fresh content directory with scripted pickers.
pub struct Harness {
    /// Engine shared with the controller
    pub engine: Arc<DirectoryContentEngine>,
    /// UI state shared with the controller
    pub state: Arc<StateStore>,
    /// Pickers shared with the controller
    pub pickers: Arc<PresetPickers>,
    /// Reporter shared with the controller
    pub reporter: Arc<MemoryReporter>,
    /// The controller under test
    pub controller: LumiController,
}

impl Harness {
    /// Build a harness storing content under `root`.
    pub fn new(root: &Path, pickers: PresetPickers, export: ExportConfig) -> Self {
        let engine = Arc::new(DirectoryContentEngine::new(root.join("content")));
        let state = Arc::new(StateStore::new());
        let pickers = Arc::new(pickers);
        let reporter = Arc::new(MemoryReporter::new());
        let controller = LumiController::builder(engine.clone(), pickers.clone())
            .with_state(state.clone())
            .with_reporter(reporter.clone())
            .with_export_config(export)
            .build();

        Self {
            engine,
            state,
            pickers,
            reporter,
            controller,
        }
    }

    /// Store a quiz and return its id.
    pub async fn store_quiz(&self, title: &str) -> String {
        self.engine
            .save_or_update_content(
                None,
                &json!({"question": "2 + 2?"}),
                &quiz_metadata(title),
                "H5P.MultiChoice 1.16",
            )
            .await
            .expect("store content")
    }
}
