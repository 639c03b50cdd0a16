//! Byte-oriented LZ decompression used by compressed texture archives
//!
//! A compressed `.txp` starts with a u32 whose upper 24 bits hold the
//! decompressed size (the low byte carries flags), followed by a token
//! stream. Each token begins with a control byte `c`:
//!
//! ```text
//! c >= 0xC0        long back-reference   [c] [flag] [lo]
//!                  len  = (c - 0xBE) * 2, +1 if flag & 0x80
//!                  dist = ((flag & 0x7F) << 8 | lo) + 1
//! 0x80..=0xBF      medium back-reference [c] [lo]
//!                  len  = ((c >> 2) & 0x1F) + 3
//!                  dist = ((c & 3) << 8 | lo) + 1
//! 0x40..=0x7F      short back-reference  [c]
//!                  len  = (c >> 4) - 2
//!                  dist = (c & 0x0F) + 1
//! 0x00             extended literal      [0] [flag] ([flag2])
//!                  flag & 0x80 -> len = flag & 0x7F
//!                  otherwise   -> len = 0xBF + flag2 + (flag << 8)
//!                  flag == flag2 == 0 followed by a 0 byte ends the stream
//! 0x01..=0x3F      literal run of c bytes
//! ```
//!
//! Back-references copy one byte at a time from the already decoded output,
//! so a distance shorter than the length repeats a pattern (run-length
//! encoding falls out of this for free).

use crate::cursor::ByteCursor;
use crate::error::{FormatError, Result};

/// A compressed block: the size header plus the token stream
#[derive(Debug, Clone, Copy)]
pub struct CompressedBlock<'a> {
    /// Decompressed size declared by the header
    pub declared_size: usize,
    /// Low 8 bits of the header word
    pub flags: u8,
    pub payload: &'a [u8],
}

impl<'a> CompressedBlock<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let word = cursor.read_u32()?;
        Ok(Self {
            declared_size: ((word & 0xFFFF_FF00) >> 8) as usize,
            flags: (word & 0xFF) as u8,
            payload: &data[4..],
        })
    }

    pub fn decompress(&self) -> Result<Vec<u8>> {
        decompress(self.payload, self.declared_size)
    }
}

/// Parse the size header and decompress the remainder of `data`
pub fn decompress_block(data: &[u8]) -> Result<Vec<u8>> {
    CompressedBlock::parse(data)?.decompress()
}

/// Decompress a raw token stream
///
/// Decoding stops at the end marker, at the end of `input`, or once
/// `declared_size` bytes have been produced, whichever comes first. The
/// result may be shorter than `declared_size` when the end marker arrives
/// early.
pub fn decompress(input: &[u8], declared_size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(declared_size);
    let mut pos = 0usize;

    while pos < input.len() && out.len() < declared_size {
        let token = pos;
        let c = input[pos];
        pos += 1;

        match c {
            0xC0..=0xFF => {
                let flag = next_byte(input, &mut pos, token)?;
                let lo = next_byte(input, &mut pos, token)?;
                let mut len = (c as usize - 0xBE) * 2;
                if flag & 0x80 != 0 {
                    len += 1;
                }
                let distance = ((((flag & 0x7F) as usize) << 8) | lo as usize) + 1;
                copy_exact(&mut out, distance, len, declared_size, token)?;
            }
            0x80..=0xBF => {
                let lo = next_byte(input, &mut pos, token)?;
                let len = ((c >> 2) & 0x1F) as usize + 3;
                let distance = ((((c & 0x03) as usize) << 8) | lo as usize) + 1;
                copy_clamped(&mut out, distance, len, declared_size, token)?;
            }
            0x40..=0x7F => {
                let len = (c >> 4) as usize - 2;
                let distance = (c & 0x0F) as usize + 1;
                copy_clamped(&mut out, distance, len, declared_size, token)?;
            }
            0x00 => {
                let flag = next_byte(input, &mut pos, token)?;
                let len = if flag & 0x80 != 0 {
                    (flag & 0x7F) as usize
                } else {
                    let flag2 = next_byte(input, &mut pos, token)?;
                    // Peek only; a missing byte reads as zero.
                    let peek = input.get(pos).copied().unwrap_or(0);
                    if flag == 0 && flag2 == 0 && peek == 0 {
                        tracing::trace!(offset = token, produced = out.len(), "end marker");
                        break;
                    }
                    0xBF + flag2 as usize + ((flag as usize) << 8)
                };
                copy_literal(input, &mut pos, len, &mut out, declared_size, token)?;
            }
            _ => {
                copy_literal(input, &mut pos, c as usize, &mut out, declared_size, token)?;
            }
        }
    }

    if out.len() < declared_size {
        tracing::debug!(
            produced = out.len(),
            declared = declared_size,
            "decompressed stream shorter than declared size"
        );
    }

    Ok(out)
}

fn next_byte(input: &[u8], pos: &mut usize, token: usize) -> Result<u8> {
    let byte = *input
        .get(*pos)
        .ok_or(FormatError::TruncatedInput { offset: token })?;
    *pos += 1;
    Ok(byte)
}

fn copy_literal(
    input: &[u8],
    pos: &mut usize,
    len: usize,
    out: &mut Vec<u8>,
    declared_size: usize,
    token: usize,
) -> Result<()> {
    let bytes = input
        .get(*pos..*pos + len)
        .ok_or(FormatError::TruncatedInput { offset: token })?;
    *pos += len;
    let room = declared_size - out.len();
    out.extend_from_slice(&bytes[..len.min(room)]);
    Ok(())
}

/// Long back-reference: the source must lie inside the decoded output
fn copy_exact(
    out: &mut Vec<u8>,
    distance: usize,
    len: usize,
    declared_size: usize,
    token: usize,
) -> Result<()> {
    let end = out.len();
    if distance > end {
        return Err(FormatError::CorruptStream {
            offset: token,
            distance,
            available: end,
        });
    }
    for i in 0..len {
        if out.len() >= declared_size {
            break;
        }
        let byte = out[end - distance + i];
        out.push(byte);
    }
    Ok(())
}

/// Medium/short back-reference with overrun tolerance
///
/// Once the copy index runs past the output length seen at the start of the
/// copy, the byte at that length minus one (the last byte written before this
/// copy) is repeated. A source before the start of output repeats the most
/// recently written byte instead.
fn copy_clamped(
    out: &mut Vec<u8>,
    distance: usize,
    len: usize,
    declared_size: usize,
    token: usize,
) -> Result<()> {
    let end = out.len();
    if end == 0 {
        return Err(FormatError::CorruptStream {
            offset: token,
            distance,
            available: 0,
        });
    }
    for i in 0..len {
        if out.len() >= declared_size {
            break;
        }
        let byte = if i > end {
            out[end - 1]
        } else {
            match (end + i).checked_sub(distance) {
                Some(src) => out[src],
                None => out[out.len() - 1],
            }
        };
        out.push(byte);
    }
    Ok(())
}
