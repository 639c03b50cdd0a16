//! VATO formats: binary readers for Valkyrie Anatomia: The Origin assets
//!
//! All readers work over an in-memory byte slice and never touch the file
//! system. Conversion to glTF and PNG lives in `vato-export`.
//!
//! # Containers
//!
//! - **IMDL** (`.mdl`): tagged-section model container. Node tree, geometry,
//!   vertex layouts, index buffers, materials and texture names.
//! - **IMTN** (`.mtn`): tagged-section animation container. Per-bone
//!   translation and rotation keyframes.
//! - **GLTP** (`.txp`): texture archive, optionally LZ-compressed.
//! - **PCK** (`.pck`): package of other files, possibly nested.
//!
//! # Usage
//!
//! ```ignore
//! use vato_formats::Model;
//!
//! let bytes = std::fs::read("00_base.mdl").unwrap();
//! let model = Model::parse(&bytes).unwrap();
//! for (i, geometry) in model.geometries.iter().enumerate() {
//!     let buffers = model.geometry_buffers(i).unwrap();
//!     println!("{}: {} vertices", geometry.name, buffers.vertex_count());
//! }
//! ```

pub mod animation;
pub mod cursor;
pub mod error;
pub mod lz;
pub mod model;
pub mod package;
pub mod section;
pub mod strings;
pub mod texture;

#[cfg(test)]
mod fixtures;

pub use animation::{AnimationTrack, ChannelKind, ChannelValues, DEFAULT_FRAME_RATE, Motion};
pub use cursor::{ByteCursor, ByteWriter};
pub use error::{FormatError, Result};
pub use lz::{CompressedBlock, decompress, decompress_block};
pub use model::{BlockOffsets, GeometryBuffers, Model, Primitive, SkinData};
pub use package::{ExtractedFile, Package, PackageEntry, PackageLayout, sniff_extension};
pub use section::{
    BlendMode, ContainerHeader, GeometryRecord, KeyframeRecord, MaterialRecord, MeshRecord,
    NodeRecord, Section, SectionHeader, SectionScanner, ShapeRecord, TextureRef,
};
pub use strings::StringTable;
pub use texture::{DecodedTexture, PixelFormat, PixelLayout, TextureArchive, TextureEntry};
