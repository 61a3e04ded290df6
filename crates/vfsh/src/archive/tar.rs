//! TAR container reader (ustar, v7, pax, GNU long names)

use super::ArchiveEntry;
use crate::error::{Error, Result};

/// Simple tar header (512 bytes)
const TAR_BLOCK_SIZE: usize = 512;

const CHECKSUM_FIELD: std::ops::Range<usize> = 148..156;

/// Check for a plausible tar stream: ustar magic, or a v7 header whose
/// checksum adds up, or an empty archive of zero blocks.
pub(super) fn looks_like_tar(data: &[u8]) -> bool {
    if data.len() < TAR_BLOCK_SIZE {
        return false;
    }
    if &data[257..262] == b"ustar" {
        return true;
    }
    let header = &data[..TAR_BLOCK_SIZE];
    if header.iter().all(|&b| b == 0) {
        return data.len() % TAR_BLOCK_SIZE == 0;
    }
    checksum_ok(header)
}

/// Read every member of a tar stream, in archive order.
///
/// GNU `L` records and pax `path` records rename the member that follows
/// them. Symlinks, hard links, devices and pax global headers are skipped.
pub(super) fn read_entries(data: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    let mut offset = 0;
    let mut next_name: Option<String> = None;

    while offset + TAR_BLOCK_SIZE <= data.len() {
        let header = &data[offset..offset + TAR_BLOCK_SIZE];

        // Check for end of archive (zero block)
        if header.iter().all(|&b| b == 0) {
            break;
        }

        if !checksum_ok(header) {
            return Err(Error::archive(format!(
                "tar: header checksum mismatch at offset {}",
                offset
            )));
        }

        let size = parse_octal(&header[124..136]);
        let mode = parse_octal(&header[100..108]) as u32 & 0o7777;
        let type_flag = header[156];

        offset += TAR_BLOCK_SIZE;

        let content_end = offset
            .checked_add(size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::archive(format!(
                    "tar: {}: unexpected end of archive",
                    header_name(header)
                ))
            })?;
        let content = &data[offset..content_end];
        offset += size.div_ceil(TAR_BLOCK_SIZE) * TAR_BLOCK_SIZE;

        match type_flag {
            b'L' => {
                next_name = Some(c_string(content));
                continue;
            }
            b'x' => {
                if let Some(path) = pax_path(content) {
                    next_name = Some(path);
                }
                continue;
            }
            _ => {}
        }

        let name = next_name.take().unwrap_or_else(|| header_name(header));
        match type_flag {
            b'5' => entries.push(ArchiveEntry::dir(name).with_mode(mode)),
            b'0' | b'\0' | b'7' if name.ends_with('/') => {
                entries.push(ArchiveEntry::dir(name).with_mode(mode))
            }
            b'0' | b'\0' | b'7' => {
                entries.push(ArchiveEntry::file(name, content.to_vec()).with_mode(mode))
            }
            other => {
                tracing::debug!(name = %name, type_flag = %(other as char), "skipping tar member");
            }
        }
    }

    Ok(entries)
}

/// The `path` value of a pax extended header, if it carries one.
///
/// Records have the form `<len> <key>=<value>\n`, where `<len>` counts the
/// whole record. Later records override earlier ones.
fn pax_path(records: &[u8]) -> Option<String> {
    let mut path = None;
    let mut rest = records;

    while let Some(space) = rest.iter().position(|&b| b == b' ') {
        let len = match std::str::from_utf8(&rest[..space])
            .ok()
            .and_then(|digits| digits.parse::<usize>().ok())
        {
            Some(len) if len > space && len <= rest.len() => len,
            _ => break,
        };
        let record = &rest[space + 1..len];
        let record = record.strip_suffix(b"\n").unwrap_or(record);
        if let Some(value) = record.strip_prefix(b"path=") {
            path = Some(String::from_utf8_lossy(value).into_owned());
        }
        rest = &rest[len..];
    }

    path
}

/// Name field, joined with the ustar prefix field when present.
fn header_name(header: &[u8]) -> String {
    let name = c_string(&header[..100]);
    if &header[257..262] == b"ustar" {
        let prefix = c_string(&header[345..500]);
        if !prefix.is_empty() {
            return format!("{}/{}", prefix, name);
        }
    }
    name
}

fn c_string(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn checksum_ok(header: &[u8]) -> bool {
    let stored = parse_octal(&header[CHECKSUM_FIELD]);
    let computed: usize = header
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if CHECKSUM_FIELD.contains(&i) {
                b' ' as usize
            } else {
                b as usize
            }
        })
        .sum();
    stored == computed
}

/// Parse octal value from tar header field
fn parse_octal(buf: &[u8]) -> usize {
    let s: String = buf
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|&&b| b != 0 && b != b' ')
        .map(|&b| b as char)
        .collect();
    usize::from_str_radix(s.trim(), 8).unwrap_or(0)
}
