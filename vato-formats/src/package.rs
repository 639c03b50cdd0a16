//! PCK package archives
//!
//! Header: `entry_count, flags, reserved, reserved` (u32 each). With flags
//! 0 the table is `(offset, size)` pairs; with flags 0x80 every pair is
//! followed by a null-terminated name and the entry is usually itself a
//! package.

use crate::cursor::ByteCursor;
use crate::error::{FormatError, Result};

pub const FLAGS_FLAT: u32 = 0x00;
pub const FLAGS_NAMED: u32 = 0x80;

const HEADER_SIZE: usize = 16;

/// Table layout selected by the header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageLayout {
    Flat,
    Named,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry<'a> {
    pub name: Option<String>,
    pub offset: u32,
    pub size: u32,
    pub data: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package<'a> {
    pub layout: PackageLayout,
    pub entries: Vec<PackageEntry<'a>>,
}

impl<'a> Package<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let entry_count = cursor.read_u32()? as usize;
        let flags = cursor.read_u32()?;
        cursor.skip(8)?;

        let layout = match flags {
            FLAGS_FLAT => PackageLayout::Flat,
            FLAGS_NAMED => PackageLayout::Named,
            _ => {
                return Err(FormatError::UnsupportedVariant {
                    what: "package flags",
                    value: flags,
                });
            }
        };

        let mut entries = Vec::with_capacity(entry_count.min(cursor.remaining() / 8));
        for _ in 0..entry_count {
            let offset = cursor.read_u32()?;
            let size = cursor.read_u32()?;
            let name = match layout {
                PackageLayout::Flat => None,
                PackageLayout::Named => Some(read_name(&mut cursor)?),
            };
            let data = ByteCursor::at(data, offset as usize)?.read_bytes(size as usize)?;
            entries.push(PackageEntry {
                name,
                offset,
                size,
                data,
            });
        }

        Ok(Self { layout, entries })
    }

    /// Whether `data` reads as a non-empty package whose entries all lie past
    /// the header
    pub fn is_plausible(data: &[u8]) -> bool {
        Package::parse(data).is_ok_and(|p| {
            !p.entries.is_empty() && p.entries.iter().all(|e| e.offset as usize >= HEADER_SIZE)
        })
    }
}

fn read_name(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let start = cursor.position();
    let tail = &cursor.data()[start..];
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(FormatError::UnexpectedEof {
            offset: start,
            wanted: tail.len() + 1,
            available: tail.len(),
        })?;
    let name = String::from_utf8_lossy(&tail[..len]).into_owned();
    cursor.skip(len + 1)?;
    Ok(name)
}

/// Guess a file extension from leading magic bytes
pub fn sniff_extension(data: &[u8]) -> &'static str {
    match data.get(..4) {
        Some(b"IANM") => "anm",
        Some(b"IMDL") => "mdl",
        Some(b"IMTN") => "mtn",
        _ if data[..data.len().min(0x20)].windows(4).any(|w| w == b"GLTP") => "txp",
        _ => "bin",
    }
}

/// A member file to be written, with its path relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile<'a> {
    pub path: String,
    pub data: &'a [u8],
}

/// Flatten a package (and the packages nested in it) into member files
///
/// Flat members are named `{stem}_{index}.{ext}`. A named member that is
/// itself a smaller package is unpacked with its name as the stem; any other
/// named member is written as `{name}.{ext}`.
pub fn extract<'a>(data: &'a [u8], stem: &str) -> Result<Vec<ExtractedFile<'a>>> {
    let mut files = Vec::new();
    extract_into(data, stem, &mut files)?;
    Ok(files)
}

fn extract_into<'a>(data: &'a [u8], stem: &str, files: &mut Vec<ExtractedFile<'a>>) -> Result<()> {
    let package = Package::parse(data)?;
    tracing::debug!(
        stem,
        layout = ?package.layout,
        entries = package.entries.len(),
        "unpacking package"
    );

    for (index, entry) in package.entries.iter().enumerate() {
        match &entry.name {
            None => files.push(ExtractedFile {
                path: format!("{stem}_{index}.{}", sniff_extension(entry.data)),
                data: entry.data,
            }),
            Some(name) => {
                let name = sanitize_name(name, index);
                // Strictly smaller slices keep the recursion finite.
                if entry.data.len() < data.len() && Package::is_plausible(entry.data) {
                    extract_into(entry.data, &name, files)?;
                } else {
                    files.push(ExtractedFile {
                        path: format!("{name}.{}", sniff_extension(entry.data)),
                        data: entry.data,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Keep member names inside the output directory
fn sanitize_name(name: &str, index: usize) -> String {
    let parts: Vec<&str> = name
        .split(['/', '\\'])
        .filter(|p| !p.is_empty() && *p != "." && *p != "..")
        .collect();
    if parts.is_empty() {
        format!("entry_{index}")
    } else {
        parts.join("/")
    }
}
