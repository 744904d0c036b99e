//! Content engine seam and the content data model.
//!
//! The content engine owns storage and the package byte format. The
//! controller only talks to it through [`ContentEngine`], so the storage
//! technology can be swapped. [`DirectoryContentEngine`] is the in-tree
//! implementation: one directory per content item and zip packages.
//!
//! ## Package Layout
//!
//! | Entry | Contents |
//! |-------|----------|
//! | `h5p.json` | [`ContentMetadata`] |
//! | `content/content.json` | content parameters |

mod directory;
pub mod package;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWrite;

use crate::error::Result;

pub use directory::{ContentSummary, DirectoryContentEngine};

/// A library reference as declared in `h5p.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryName {
    /// Machine name, e.g. `H5P.MultiChoice`
    pub machine_name: String,
    /// Major version
    pub major_version: u32,
    /// Minor version
    pub minor_version: u32,
}

impl LibraryName {
    /// Ubername with whitespace, e.g. `H5P.MultiChoice 1.16`.
    #[must_use]
    pub fn uber_name(&self) -> String {
        format!(
            "{} {}.{}",
            self.machine_name, self.major_version, self.minor_version
        )
    }
}

/// Package metadata (`h5p.json`).
///
/// Fields the bridge does not interpret are kept in `extra` so they survive
/// an import/export cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    /// Content title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Machine name of the main library
    #[serde(default)]
    pub main_library: String,
    /// Content language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Libraries the content depends on
    #[serde(default)]
    pub preloaded_dependencies: Vec<LibraryName>,
    /// Everything else
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentMetadata {
    /// Ubername of the main library.
    ///
    /// Looks up the dependency whose machine name matches `main_library`.
    /// Returns an empty string when none does; degraded metadata is tolerated.
    #[must_use]
    pub fn main_library_uber_name(&self) -> String {
        self.preloaded_dependencies
            .iter()
            .find(|dependency| dependency.machine_name == self.main_library)
            .map(LibraryName::uber_name)
            .unwrap_or_default()
    }
}

/// A stored content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Package metadata
    pub metadata: ContentMetadata,
    /// Content parameters
    pub parameters: serde_json::Value,
}

/// Storage and package (de)serialization.
#[async_trait]
pub trait ContentEngine: Send + Sync {
    /// Fetch stored content.
    ///
    /// Fails with [`Error::ContentNotFound`](crate::Error::ContentNotFound)
    /// if `id` has no backing storage.
    async fn get_content(&self, id: &str) -> Result<Content>;

    /// Whether `id` has backing storage.
    async fn content_exists(&self, id: &str) -> Result<bool>;

    /// Store content, creating a new item when `id` is `None`.
    ///
    /// Returns the id the content was stored under.
    async fn save_or_update_content(
        &self,
        id: Option<&str>,
        parameters: &serde_json::Value,
        metadata: &ContentMetadata,
        library: &str,
    ) -> Result<String>;

    /// Parse package bytes.
    async fn upload_package(&self, bytes: &[u8]) -> Result<Content>;

    /// Remove stored content.
    async fn delete_content(&self, id: &str) -> Result<()>;

    /// Serialize the package for `id` into `sink`.
    ///
    /// Returning does not mean the bytes reached their destination; the
    /// caller owns flushing and closing the sink.
    async fn write_package(&self, id: &str, sink: &mut (dyn AsyncWrite + Send + Unpin))
        -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(main: &str) -> ContentMetadata {
        serde_json::from_value(json!({
            "title": "Quiz",
            "mainLibrary": main,
            "preloadedDependencies": [
                {"machineName": "H5P.Question", "majorVersion": 1, "minorVersion": 5},
                {"machineName": "H5P.MultiChoice", "majorVersion": 1, "minorVersion": 16}
            ],
            "embedTypes": ["iframe"]
        }))
        .unwrap()
    }

    #[test]
    fn test_uber_name_of_main_library() {
        assert_eq!(
            metadata("H5P.MultiChoice").main_library_uber_name(),
            "H5P.MultiChoice 1.16"
        );
    }

    #[test]
    fn test_uber_name_missing_dependency_is_empty() {
        assert_eq!(metadata("H5P.Unknown").main_library_uber_name(), "");
        assert_eq!(ContentMetadata::default().main_library_uber_name(), "");
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let meta = metadata("H5P.MultiChoice");
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["embedTypes"], json!(["iframe"]));
        assert_eq!(value["mainLibrary"], "H5P.MultiChoice");
    }
}
