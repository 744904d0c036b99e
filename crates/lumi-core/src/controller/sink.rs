//! Byte sinks packages are written into.
//!
//! A sink's [`finish`](PackageSink::finish) is the authoritative completion
//! signal of a write: serialization returning only means the bytes were
//! handed to the sink, not that they reached the disk. Until `finish`
//! succeeds the target keeps its previous contents.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use uuid::Uuid;

use crate::error::Result;

/// An open write stream.
#[async_trait]
pub trait PackageSink: Send {
    /// The stream serializers write into.
    fn writer(&mut self) -> &mut (dyn AsyncWrite + Send + Unpin);

    /// Flush and close the stream, resolving once the transport confirms.
    ///
    /// On failure nothing written so far replaces the target.
    async fn finish(self: Box<Self>) -> Result<()>;

    /// Discard everything written, leaving the target as it was.
    async fn abort(self: Box<Self>) {}
}

/// Opens sinks for paths.
#[async_trait]
pub trait SinkFactory: Send + Sync {
    /// Open a sink whose output replaces `path` once finished.
    async fn open(&self, path: &Path) -> Result<Box<dyn PackageSink>>;
}

/// Sinks backed by files on disk.
///
/// Bytes go to a hidden staging file next to the target, which is renamed
/// over the target after it has been synced. A staging file is removed when
/// its sink is aborted, fails or is dropped unfinished.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSinkFactory;

/// Buffered file stream into a staging file.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
    staging: TempPath,
    target: PathBuf,
}

#[async_trait]
impl SinkFactory for FileSinkFactory {
    async fn open(&self, path: &Path) -> Result<Box<dyn PackageSink>> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&parent).await?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let staging = parent.join(format!(".{name}.{}.part", Uuid::new_v4().simple()));
        let file = File::create(&staging).await?;
        let staging = TempPath::from_path(staging);
        tracing::debug!("Staging package in {}", staging.display());

        Ok(Box::new(FileSink {
            writer: BufWriter::new(file),
            staging,
            target: path.to_path_buf(),
        }))
    }
}

#[async_trait]
impl PackageSink for FileSink {
    fn writer(&mut self) -> &mut (dyn AsyncWrite + Send + Unpin) {
        &mut self.writer
    }

    async fn finish(self: Box<Self>) -> Result<()> {
        let Self {
            mut writer,
            staging,
            target,
        } = *self;

        writer.flush().await?;
        writer.shutdown().await?;
        writer.into_inner().sync_all().await?;

        tokio::task::spawn_blocking(move || staging.persist(&target))
            .await
            .map_err(std::io::Error::other)?
            .map_err(|e| e.error)?;
        Ok(())
    }

    async fn abort(self: Box<Self>) {
        let Self {
            writer, staging, ..
        } = *self;
        drop(writer);

        let path = staging.to_path_buf();
        if let Err(e) = staging.close() {
            tracing::warn!("Failed to remove staged package {}: {}", path.display(), e);
        } else {
            tracing::debug!("Discarded staged package {}", path.display());
        }
    }
}
