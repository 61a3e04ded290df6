//! ZIP container reader
//!
//! Members are read in central-directory order through [`zip::ZipArchive`],
//! which verifies each payload's CRC as it is read to the end.

use std::io::{Cursor, Read};

use zip::result::ZipError;
use zip::ZipArchive;

use super::ArchiveEntry;
use crate::error::{Error, Result};

/// Read every member of a ZIP archive, in central-directory order.
pub(super) fn read_entries(data: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(zip_error)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut member = archive.by_index(index).map_err(zip_error)?;
        let name = member.name().to_string();
        let mode = member
            .unix_mode()
            .map(|bits| bits & 0o7777)
            .filter(|&bits| bits != 0);

        let mut entry = if member.is_dir() {
            ArchiveEntry::dir(name)
        } else {
            let mut content = Vec::new();
            member
                .read_to_end(&mut content)
                .map_err(|e| Error::archive(format!("zip: {}: {}", name, e)))?;
            ArchiveEntry::file(name, content)
        };
        entry.mode = mode;
        entries.push(entry);
    }

    Ok(entries)
}

fn zip_error(e: ZipError) -> Error {
    Error::archive(format!("zip: {}", e))
}
