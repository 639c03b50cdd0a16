//! Texture archive (.txp) to PNG conversion

use crate::output::{OutputSet, file_safe};
use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::path::Path;
use vato_formats::{DecodedTexture, FormatError, PixelLayout, TextureArchive};

/// PNG files produced from one archive
#[derive(Debug, Default)]
pub struct TextureExport {
    pub outputs: OutputSet,
    pub converted: usize,
    /// Entries with an unsupported pixel format
    pub skipped: usize,
}

/// Encode a decoded texture as PNG bytes
pub fn encode_png(texture: &DecodedTexture) -> Result<Vec<u8>> {
    let (width, height) = (texture.width, texture.height);
    let pixels = texture.pixels.clone();
    let image = match texture.layout {
        PixelLayout::Rgba8 => RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
        PixelLayout::Rgb8 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
    }
    .with_context(|| format!("Pixel data of {} does not fill {width}x{height}", texture.name))?;

    let mut png_bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .with_context(|| format!("Failed to encode image as PNG: {}", texture.name))?;
    Ok(png_bytes)
}

/// Decode every entry of a `.txp` file into `{dir}/{entry name}.png`
///
/// Entries with an unsupported pixel format are skipped with a warning.
pub fn export_textures(data: &[u8], dir: &Path) -> Result<TextureExport> {
    let archive = TextureArchive::parse(data).context("Failed to parse texture archive")?;
    tracing::debug!(
        entries = archive.entries.len(),
        compressed = archive.compressed,
        "parsed GLTP"
    );

    let mut export = TextureExport::default();
    for (index, entry) in archive.entries.iter().enumerate() {
        let texture = match archive.decode(index) {
            Ok(texture) => texture,
            Err(err @ FormatError::UnsupportedVariant { .. }) => {
                tracing::warn!("Skipping texture {}: {err}", entry.name);
                export.skipped += 1;
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to decode texture {}", entry.name));
            }
        };
        tracing::info!(
            "Converting {} ({}x{}, format {})",
            entry.name,
            entry.width,
            entry.height,
            entry.format
        );
        let png = encode_png(&texture)?;
        export
            .outputs
            .add(dir.join(format!("{}.png", file_safe(&entry.name))), png);
        export.converted += 1;
    }
    Ok(export)
}
