//! Offset-addressed string dictionary
//!
//! IMDL and IMTN records never embed names; they store a u32 offset into the
//! dictionary region named by the file header. Strings are null-terminated.

use crate::error::{FormatError, Result};

/// View of the string dictionary region of a container
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'a> {
    data: &'a [u8],
    base: usize,
}

impl<'a> StringTable<'a> {
    /// `base` is the absolute offset of the dictionary inside `data`
    pub fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, base }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// Resolve the string stored at `offset` bytes into the dictionary
    pub fn get(&self, offset: u32) -> Result<String> {
        let start = self.base + offset as usize;
        read_null_terminated(self.data, start)
    }
}

/// Read a null-terminated string at an absolute offset
///
/// Invalid UTF-8 is replaced rather than rejected; names are only used for
/// labelling and matching.
pub fn read_null_terminated(data: &[u8], offset: usize) -> Result<String> {
    let tail = data.get(offset..).ok_or(FormatError::UnexpectedEof {
        offset,
        wanted: 1,
        available: 0,
    })?;
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(FormatError::UnexpectedEof {
            offset,
            wanted: tail.len() + 1,
            available: tail.len(),
        })?;
    Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
}
