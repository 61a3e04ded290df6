//! Archive loader
//!
//! Decodes a seed archive into a flat, ordered list of [`ArchiveEntry`]
//! records that [`Vfs::build`](crate::Vfs::build) turns into a tree.
//!
//! Supported containers (detected from magic bytes):
//! - ZIP, stored and deflate members
//! - ustar / pax / v7 TAR
//! - gzip-compressed TAR
//!
//! Files named `*.b64` carry a base64 payload. The payload is decoded and the
//! suffix dropped from the stored name; undecodable payloads are kept raw.

mod tar;
mod zip;

use base64::Engine;
use flate2::read::GzDecoder;
use std::io::Read;

use crate::error::{Error, Result};

/// Name suffix marking a base64-encoded payload.
pub const ENCODED_SUFFIX: &str = ".b64";

/// One decoded archive record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Slash-separated relative path, no leading or trailing separator.
    pub path: String,
    /// Directory marker (the container listed it with a trailing `/`).
    pub is_dir: bool,
    /// File payload. Always empty for directories.
    pub data: Vec<u8>,
    /// Permission bits recorded by the container, if any.
    pub mode: Option<u32>,
}

impl ArchiveEntry {
    /// A directory marker.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            data: Vec::new(),
            mode: None,
        }
    }

    /// A file record.
    pub fn file(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            data: data.into(),
            mode: None,
        }
    }

    /// Attach recorded permission bits.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode & 0o7777);
        self
    }
}

/// Container format of a seed archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
}

/// Sniff the container format from the leading bytes.
pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    if data.starts_with(b"PK\x03\x04") || data.starts_with(b"PK\x05\x06") {
        return Some(ArchiveFormat::Zip);
    }
    if data.starts_with(&[0x1f, 0x8b]) {
        return Some(ArchiveFormat::TarGz);
    }
    if tar::looks_like_tar(data) {
        return Some(ArchiveFormat::Tar);
    }
    None
}

/// Decode archive bytes into ordered entries.
///
/// Entry paths are normalized, `.b64` payloads decoded, and entries that
/// normalize to nothing (e.g. `./`) dropped. Any container-level damage is an
/// [`Error::Archive`].
pub fn load(data: &[u8]) -> Result<Vec<ArchiveEntry>> {
    if data.is_empty() {
        return Err(Error::archive("empty archive"));
    }

    let format = detect_format(data)
        .ok_or_else(|| Error::archive("unrecognized archive format"))?;

    let raw = match format {
        ArchiveFormat::Zip => zip::read_entries(data)?,
        ArchiveFormat::Tar => tar::read_entries(data)?,
        ArchiveFormat::TarGz => {
            let mut decoder = GzDecoder::new(data);
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| Error::archive(format!("gzip decompression failed: {}", e)))?;
            tar::read_entries(&decompressed)?
        }
    };

    let mut entries = Vec::with_capacity(raw.len());
    for entry in raw {
        if let Some(entry) = finish_entry(entry) {
            entries.push(entry);
        }
    }

    tracing::debug!(?format, entries = entries.len(), "decoded archive");
    Ok(entries)
}

/// Normalize the path and decode an encoded payload.
fn finish_entry(mut entry: ArchiveEntry) -> Option<ArchiveEntry> {
    let is_dir = entry.is_dir || entry.path.ends_with('/');
    let path = normalize_entry_path(&entry.path)?;

    entry.is_dir = is_dir;
    entry.path = path;

    if entry.is_dir {
        entry.data.clear();
        return Some(entry);
    }

    if let Some(stripped) = entry.path.strip_suffix(ENCODED_SUFFIX) {
        // A bare ".b64" (or "dir/.b64") has no name left to store.
        if stripped.is_empty() || stripped.ends_with('/') {
            return Some(entry);
        }
        entry.path = stripped.to_string();
        entry.data = decode_payload(entry.data);
    }

    Some(entry)
}

/// Drop leading `/`, `.` segments and empty segments.
///
/// Returns `None` for paths that normalize to nothing or that try to climb
/// with `..`.
fn normalize_entry_path(raw: &str) -> Option<String> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                tracing::warn!(path = raw, "skipping archive entry with '..' segment");
                return None;
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// Base64-decode a payload, keeping the raw bytes when it does not decode.
fn decode_payload(raw: Vec<u8>) -> Vec<u8> {
    let compact: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    match base64::engine::general_purpose::STANDARD.decode(&compact) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!(error = %e, "payload is not valid base64, keeping raw bytes");
            raw
        }
    }
}
