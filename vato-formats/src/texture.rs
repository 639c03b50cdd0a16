//! GLTP texture archives
//!
//! A `.txp` file is either a GLTP archive or an LZ block (see [`crate::lz`])
//! that decompresses to one. The 16-byte header is followed by 32-byte
//! descriptors, descriptor `i` living at `0x20 * (i + 1)`.

use crate::cursor::ByteCursor;
use crate::error::{FormatError, Result};
use crate::lz;
use crate::strings::read_null_terminated;

pub const GLTP_MAGIC: &[u8; 4] = b"GLTP";

const DESCRIPTOR_STRIDE: usize = 0x20;

/// Pixel encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16-bit 5-5-5-1, alpha in bit 0
    Rgba5551,
    /// 16-bit 4-4-4-4, red in the high nibble
    Rgba4444,
    /// 24-bit RGB
    Rgb888,
}

impl PixelFormat {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            4 => Ok(Self::Rgba5551),
            5 => Ok(Self::Rgba4444),
            6 => Ok(Self::Rgb888),
            _ => Err(FormatError::UnsupportedVariant {
                what: "pixel format",
                value: code,
            }),
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba5551 | Self::Rgba4444 => 2,
            Self::Rgb888 => 3,
        }
    }

    /// Channel layout of the decoded pixels
    pub fn layout(self) -> PixelLayout {
        match self {
            Self::Rgba5551 | Self::Rgba4444 => PixelLayout::Rgba8,
            Self::Rgb888 => PixelLayout::Rgb8,
        }
    }
}

/// Channel layout of decoded pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb8,
    Rgba8,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// One texture descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
    pub name: String,
    pub data_size: u32,
    pub data_offset: u32,
    /// Raw format code; see [`PixelFormat::from_code`]
    pub format: u32,
    pub width: u16,
    pub height: u16,
    pub mip_flag: u32,
}

/// Pixels ready for an image encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub pixels: Vec<u8>,
}

/// A parsed GLTP archive owning its (possibly decompressed) bytes
#[derive(Debug, Clone)]
pub struct TextureArchive {
    data: Vec<u8>,
    /// The file was LZ-compressed
    pub compressed: bool,
    pub version: u32,
    pub hash_table_offset: u32,
    pub entries: Vec<TextureEntry>,
}

impl TextureArchive {
    /// Parse a `.txp` image, decompressing it first when the magic is absent
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(GLTP_MAGIC) {
            return Self::parse_uncompressed(bytes.to_vec(), false);
        }

        tracing::debug!("no GLTP magic, decompressing");
        let data = lz::decompress_block(bytes)?;
        if !data.starts_with(GLTP_MAGIC) {
            let mut found = [0u8; 4];
            let n = data.len().min(4);
            found[..n].copy_from_slice(&data[..n]);
            return Err(FormatError::FormatMismatch {
                expected: "GLTP",
                found,
            });
        }
        Self::parse_uncompressed(data, true)
    }

    fn parse_uncompressed(data: Vec<u8>, compressed: bool) -> Result<Self> {
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(4)?;
        let version = cursor.read_u32()?;
        let entry_count = cursor.read_u32()? as usize;
        let hash_table_offset = cursor.read_u32()?;

        let mut entries = Vec::with_capacity(entry_count.min(data.len() / DESCRIPTOR_STRIDE));
        for i in 0..entry_count {
            let mut cursor = ByteCursor::at(&data, DESCRIPTOR_STRIDE * (i + 1))?;
            let name_offset = cursor.read_u32()?;
            let data_size = cursor.read_u32()?;
            let data_offset = cursor.read_u32()?;
            let format = cursor.read_u32()?;
            let width = cursor.read_u16()?;
            let height = cursor.read_u16()?;
            let mip_flag = cursor.read_u32()?;
            entries.push(TextureEntry {
                name: read_null_terminated(&data, name_offset as usize)?,
                data_size,
                data_offset,
                format,
                width,
                height,
                mip_flag,
            });
        }

        Ok(Self {
            data,
            compressed,
            version,
            hash_table_offset,
            entries,
        })
    }

    /// Archive bytes after decompression
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Decode entry `index` to 8-bit channels
    pub fn decode(&self, index: usize) -> Result<DecodedTexture> {
        let entry = self
            .entries
            .get(index)
            .ok_or(FormatError::IndexOutOfRange {
                what: "texture",
                index,
                len: self.entries.len(),
            })?;
        let format = PixelFormat::from_code(entry.format)?;
        let pixel_count = entry.width as usize * entry.height as usize;

        let raw = ByteCursor::at(&self.data, entry.data_offset as usize)?
            .read_bytes(pixel_count * format.bytes_per_pixel())?;

        let pixels = match format {
            PixelFormat::Rgba5551 => raw
                .chunks_exact(2)
                .flat_map(|c| decode_5551(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
            PixelFormat::Rgba4444 => raw
                .chunks_exact(2)
                .flat_map(|c| decode_4444(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
            PixelFormat::Rgb888 => raw.to_vec(),
        };

        Ok(DecodedTexture {
            name: entry.name.clone(),
            width: entry.width as u32,
            height: entry.height as u32,
            layout: format.layout(),
            pixels,
        })
    }
}

fn expand5(x: u16) -> u8 {
    let x = x as u8;
    (x << 3) | (x >> 2)
}

fn decode_5551(raw: u16) -> [u8; 4] {
    let r = (raw & 0xF800) >> 11;
    let g = (raw & 0x07C0) >> 6;
    let b = (raw & 0x003E) >> 1;
    let a = if raw & 1 != 0 { 255 } else { 0 };
    [expand5(r), expand5(g), expand5(b), a]
}

fn decode_4444(raw: u16) -> [u8; 4] {
    let nibble = |shift: u16| ((raw >> shift) & 0xF) as u8 * 17;
    [nibble(12), nibble(8), nibble(4), nibble(0)]
}
