//! # Lumi Core Library
//!
//! `lumi-core` is the desktop-integration layer of the Lumi offline H5P
//! authoring tool. It saves and loads content packages through file dialogs
//! and bridges the backend with the UI over an event channel that may
//! connect after events have already been emitted.
//!
//! ## Features
//!
//! - **Deferred events**: events emitted before the UI connects are queued
//!   and delivered in order once it does
//! - **Package export**: handle reuse, UI blocking and a write completion
//!   barrier so success is only reported once bytes hit the disk
//! - **Package import**: packages become new content, never overwriting
//!
//! ## Modules
//!
//! - [`channel`] - Deferred event channel and endpoints
//! - [`config`] - Configuration management
//! - [`content`] - Content engine seam, metadata types and the directory engine
//! - [`controller`] - Export, import and editor operations
//! - [`handle`] - File handles and the handle registry
//! - [`pickers`] - File dialogs
//! - [`state`] - Cross-call UI state (last directory, UI block flag)
//! - [`telemetry`] - Error reporting
//! - [`web`] - HTTP surface and event stream (feature `web`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use lumi_core::controller::LumiController;
//!
//! let controller = LumiController::builder(engine, pickers).build();
//! let exported = controller.export("1", None).await?;
//! println!("Saved to {}", exported.path.display());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]

pub mod channel;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod handle;
pub mod pickers;
pub mod state;
pub mod telemetry;

#[cfg(feature = "web")]
pub mod web;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension of content packages (without the dot)
pub const PACKAGE_EXTENSION: &str = "h5p";

/// Filename suggested when content has no usable title
pub const DEFAULT_FALLBACK_FILENAME: &str = "untitled";

/// Default port of the local web bridge
pub const DEFAULT_WEB_PORT: u16 = 8765;
