//! Package (zip) encoding and decoding.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

use super::{Content, ContentMetadata};

/// Archive entry holding the metadata.
pub const METADATA_ENTRY: &str = "h5p.json";

/// Archive entry holding the parameters.
pub const PARAMETERS_ENTRY: &str = "content/content.json";

/// Encode `content` as package bytes.
///
/// # Errors
///
/// Returns an error if the content cannot be serialized.
pub fn encode(content: &Content) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file(METADATA_ENTRY, options)?;
    writer.write_all(&serde_json::to_vec_pretty(&content.metadata)?)?;

    writer.start_file(PARAMETERS_ENTRY, options)?;
    writer.write_all(&serde_json::to_vec(&content.parameters)?)?;

    Ok(writer.finish()?.into_inner())
}

/// Decode package bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidPackage`] if the bytes are not a zip archive or a
/// required entry is missing or malformed.
pub fn decode(bytes: &[u8]) -> Result<Content> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let metadata: ContentMetadata = serde_json::from_slice(&read_entry(&mut archive, METADATA_ENTRY)?)
        .map_err(|e| Error::InvalidPackage(format!("{METADATA_ENTRY}: {e}")))?;
    let parameters = serde_json::from_slice(&read_entry(&mut archive, PARAMETERS_ENTRY)?)
        .map_err(|e| Error::InvalidPackage(format!("{PARAMETERS_ENTRY}: {e}")))?;

    Ok(Content {
        metadata,
        parameters,
    })
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| Error::InvalidPackage(format!("missing {name}")))?;
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf)?;
    Ok(buf)
}
