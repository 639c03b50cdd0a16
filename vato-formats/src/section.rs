//! Tagged-section containers (IMDL / IMTN)
//!
//! Both containers share a 32-byte header: 4-byte magic, four u16 (three
//! reserved, then the section count) and five u32 region offsets. The first
//! region is always the string dictionary; the section run sits between the
//! header and the dictionary.
//!
//! Each section is `magic[4] + declared_size u32` (the size includes these
//! 8 bytes). Known sections continue with `section_count u32, item_count
//! u32` and `item_count` fixed-size records; unknown sections are skipped
//! using the declared size.

use crate::cursor::ByteCursor;
use crate::error::{FormatError, Result, magic_to_string};
use crate::strings::StringTable;

/// Size of the shared container header
pub const CONTAINER_HEADER_SIZE: usize = 32;

/// Node index value meaning "no target node"
pub const NO_NODE: u16 = 0xFFFF;

/// Shared IMDL / IMTN file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: [u8; 4],
    pub reserved: [u16; 3],
    pub section_count: u16,
    /// Absolute region offsets; `regions[0]` is the string dictionary
    pub regions: [u32; 5],
}

impl ContainerHeader {
    /// Read the header and check the magic
    pub fn parse(data: &[u8], expected: &'static str) -> Result<Self> {
        let mut cursor = ByteCursor::new(data);
        let magic = cursor.read_array::<4>()?;
        if &magic != expected.as_bytes() {
            return Err(FormatError::FormatMismatch {
                expected,
                found: magic,
            });
        }
        let reserved = [cursor.read_u16()?, cursor.read_u16()?, cursor.read_u16()?];
        let section_count = cursor.read_u16()?;
        let mut regions = [0u32; 5];
        for region in &mut regions {
            *region = cursor.read_u32()?;
        }
        Ok(Self {
            magic,
            reserved,
            section_count,
            regions,
        })
    }

    pub fn dictionary_offset(&self) -> usize {
        self.regions[0] as usize
    }
}

/// Header of one tagged section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    pub magic: [u8; 4],
    pub declared_size: u32,
    /// Absolute offset of the section's magic
    pub offset: usize,
}

/// A fixed-size record stored in a tagged section
pub trait Record: Sized {
    const MAGIC: [u8; 4];
    const SIZE: usize;

    fn read(cursor: &mut ByteCursor<'_>, strings: &StringTable<'_>) -> Result<Self>;
}

/// `tex ` record: one texture file name
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRef {
    pub name: String,
}

impl Record for TextureRef {
    const MAGIC: [u8; 4] = *b"tex ";
    const SIZE: usize = 4;

    fn read(cursor: &mut ByteCursor<'_>, strings: &StringTable<'_>) -> Result<Self> {
        let name = strings.get(cursor.read_u32()?)?;
        Ok(Self { name })
    }
}

/// How a material blends with what is behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    /// Alpha test
    Mask,
    Blend,
}

/// `mate` record
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    pub name: String,
    pub unknown: i32,
    pub flags: u32,
    /// Ten interleaved u32/f32 words, kept raw
    pub parameters: [u32; 10],
    pub scalar: f32,
    pub extra: [u16; 2],
    /// `values[2]` is the texture index hint
    pub values: [u32; 4],
}

impl MaterialRecord {
    pub const FLAG_OPAQUE: u32 = 0x02;
    pub const FLAG_ALPHA_TEST: u32 = 0x10;

    pub fn texture_hint(&self) -> u32 {
        self.values[2]
    }

    pub fn blend_mode(&self) -> BlendMode {
        if self.flags & Self::FLAG_ALPHA_TEST != 0 {
            BlendMode::Mask
        } else if self.flags & Self::FLAG_OPAQUE == 0 {
            BlendMode::Blend
        } else {
            BlendMode::Opaque
        }
    }
}

impl Record for MaterialRecord {
    const MAGIC: [u8; 4] = *b"mate";
    const SIZE: usize = 76;

    fn read(cursor: &mut ByteCursor<'_>, strings: &StringTable<'_>) -> Result<Self> {
        let name = strings.get(cursor.read_u32()?)?;
        let unknown = cursor.read_i32()?;
        let flags = cursor.read_u32()?;
        let mut parameters = [0u32; 10];
        for p in &mut parameters {
            *p = cursor.read_u32()?;
        }
        let scalar = cursor.read_f32()?;
        let extra = [cursor.read_u16()?, cursor.read_u16()?];
        let mut values = [0u32; 4];
        for v in &mut values {
            *v = cursor.read_u32()?;
        }
        Ok(Self {
            name,
            unknown,
            flags,
            parameters,
            scalar,
            extra,
            values,
        })
    }
}

/// `mesh` record: one index-buffer slice with its material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRecord {
    pub material: u16,
    pub unknown: u16,
    pub unknown_word: u32,
    pub index_count: u32,
    /// Offset into the triangle region, in u16 units
    pub index_offset: u32,
}

impl Record for MeshRecord {
    const MAGIC: [u8; 4] = *b"mesh";
    const SIZE: usize = 16;

    fn read(cursor: &mut ByteCursor<'_>, _strings: &StringTable<'_>) -> Result<Self> {
        Ok(Self {
            material: cursor.read_u16()?,
            unknown: cursor.read_u16()?,
            unknown_word: cursor.read_u32()?,
            index_count: cursor.read_u32()?,
            index_offset: cursor.read_u32()?,
        })
    }
}

/// `shap` record: vertex layout of one geometry
///
/// Vertex stream offsets are in f32 units from the vertex region; the blend
/// index offset is in bytes from the blend-index region. A zero UV, normal or
/// weight offset means the attribute is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeRecord {
    pub unknown: [u32; 2],
    pub vertex_count: u32,
    pub position_offset: u32,
    pub uv_offset: u32,
    pub absolute_start: u32,
    pub normal_offset: u32,
    pub blend_index_offset: u32,
    pub blend_weight_offset: u32,
}

impl ShapeRecord {
    pub fn has_uvs(&self) -> bool {
        self.uv_offset != 0
    }

    pub fn has_normals(&self) -> bool {
        self.normal_offset != 0
    }

    /// Blend indices and weights are present together or not at all
    pub fn has_skin(&self) -> bool {
        self.blend_weight_offset != 0
    }
}

impl Record for ShapeRecord {
    const MAGIC: [u8; 4] = *b"shap";
    const SIZE: usize = 36;

    fn read(cursor: &mut ByteCursor<'_>, _strings: &StringTable<'_>) -> Result<Self> {
        Ok(Self {
            unknown: [cursor.read_u32()?, cursor.read_u32()?],
            vertex_count: cursor.read_u32()?,
            position_offset: cursor.read_u32()?,
            uv_offset: cursor.read_u32()?,
            absolute_start: cursor.read_u32()?,
            normal_offset: cursor.read_u32()?,
            blend_index_offset: cursor.read_u32()?,
            blend_weight_offset: cursor.read_u32()?,
        })
    }
}

/// `geom` record: ties a shape, a run of meshes and a node together
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    pub name: String,
    /// Target node, `None` when the file stores [`NO_NODE`]
    pub node: Option<u16>,
    pub shape: u16,
    pub matrix: [f32; 16],
    pub bounds: [f32; 9],
    pub mesh_count: u16,
    pub first_mesh: u16,
    pub bone_count: u32,
    /// Offset into the triangle region, in u16 units
    pub bone_palette_offset: u32,
}

impl GeometryRecord {
    /// Indices of this geometry's mesh records
    pub fn mesh_range(&self) -> std::ops::Range<usize> {
        let first = self.first_mesh as usize;
        first..first + self.mesh_count as usize
    }
}

impl Record for GeometryRecord {
    const MAGIC: [u8; 4] = *b"geom";
    const SIZE: usize = 160;

    fn read(cursor: &mut ByteCursor<'_>, strings: &StringTable<'_>) -> Result<Self> {
        let name = strings.get(cursor.read_u32()?)?;
        let node = cursor.read_u16()?;
        let _ = cursor.read_i16()?;
        let _ = cursor.read_u32()?;
        let _ = cursor.read_u16()?;
        let shape = cursor.read_u16()?;
        let matrix = cursor.read_f32_array::<16>()?;
        let bounds = cursor.read_f32_array::<9>()?;
        cursor.skip(16)?;
        let mesh_count = cursor.read_u16()?;
        let first_mesh = cursor.read_u16()?;
        let bone_count = cursor.read_u32()?;
        let _ = cursor.read_u32()?;
        let bone_palette_offset = cursor.read_u32()?;
        cursor.skip(12)?;
        Ok(Self {
            name,
            node: (node != NO_NODE).then_some(node),
            shape,
            matrix,
            bounds,
            mesh_count,
            first_mesh,
            bone_count,
            bone_palette_offset,
        })
    }
}

/// `node` record: one entry of the flat depth-first node list
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub name: String,
    pub unknown: f32,
    pub matrix: [f32; 16],
    pub child_count: u32,
    pub traversal_flag: u32,
}

impl Record for NodeRecord {
    const MAGIC: [u8; 4] = *b"node";
    const SIZE: usize = 80;

    fn read(cursor: &mut ByteCursor<'_>, strings: &StringTable<'_>) -> Result<Self> {
        Ok(Self {
            name: strings.get(cursor.read_u32()?)?,
            unknown: cursor.read_f32()?,
            matrix: cursor.read_f32_array::<16>()?,
            child_count: cursor.read_u32()?,
            traversal_flag: cursor.read_u32()?,
        })
    }
}

/// `nodK` record: keyframe descriptor for one bone channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyframeRecord {
    pub bone: String,
    pub keyframe_count: u32,
    /// Offset into the time region, in u16 units
    pub time_offset: u32,
    pub channel: u32,
    /// Offset into the value region, in f32 units
    pub value_offset: u32,
}

impl Record for KeyframeRecord {
    const MAGIC: [u8; 4] = *b"nodK";
    const SIZE: usize = 20;

    fn read(cursor: &mut ByteCursor<'_>, strings: &StringTable<'_>) -> Result<Self> {
        Ok(Self {
            bone: strings.get(cursor.read_u32()?)?,
            keyframe_count: cursor.read_u32()?,
            time_offset: cursor.read_u32()?,
            channel: cursor.read_u32()?,
            value_offset: cursor.read_u32()?,
        })
    }
}

/// `visK` record (visibility keys); read but not converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityRecord {
    pub node: String,
    pub values: [u32; 3],
}

impl Record for VisibilityRecord {
    const MAGIC: [u8; 4] = *b"visK";
    const SIZE: usize = 16;

    fn read(cursor: &mut ByteCursor<'_>, strings: &StringTable<'_>) -> Result<Self> {
        Ok(Self {
            node: strings.get(cursor.read_u32()?)?,
            values: [cursor.read_u32()?, cursor.read_u32()?, cursor.read_u32()?],
        })
    }
}

/// One parsed section
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Textures(Vec<TextureRef>),
    Materials(Vec<MaterialRecord>),
    Meshes(Vec<MeshRecord>),
    Shapes(Vec<ShapeRecord>),
    Geometries(Vec<GeometryRecord>),
    Nodes(Vec<NodeRecord>),
    Keyframes(Vec<KeyframeRecord>),
    Visibility(Vec<VisibilityRecord>),
    /// Unrecognised magic, skipped by its declared size
    Unknown(SectionHeader),
}

impl Section {
    pub fn kind(&self) -> &'static str {
        match self {
            Section::Textures(_) => "tex ",
            Section::Materials(_) => "mate",
            Section::Meshes(_) => "mesh",
            Section::Shapes(_) => "shap",
            Section::Geometries(_) => "geom",
            Section::Nodes(_) => "node",
            Section::Keyframes(_) => "nodK",
            Section::Visibility(_) => "visK",
            Section::Unknown(_) => "unknown",
        }
    }
}

/// Iterator over the section run of a container
///
/// Yields sections until the cursor reaches `end`. After the first error the
/// iterator is exhausted.
pub struct SectionScanner<'a> {
    cursor: ByteCursor<'a>,
    end: usize,
    strings: StringTable<'a>,
    failed: bool,
}

impl<'a> SectionScanner<'a> {
    /// Scan `data[start..end]`, resolving names through `strings`
    pub fn new(data: &'a [u8], start: usize, end: usize, strings: StringTable<'a>) -> Result<Self> {
        Ok(Self {
            cursor: ByteCursor::at(data, start)?,
            end,
            strings,
            failed: false,
        })
    }

    /// Scanner over the section run of a container with the given header
    pub fn for_container(data: &'a [u8], header: &ContainerHeader) -> Result<Self> {
        let dictionary = header.dictionary_offset();
        Self::new(
            data,
            CONTAINER_HEADER_SIZE,
            dictionary,
            StringTable::new(data, dictionary),
        )
    }

    fn next_section(&mut self) -> Result<Section> {
        let offset = self.cursor.position();
        let magic = self.cursor.read_array::<4>()?;
        let declared_size = self.cursor.read_u32()?;
        let header = SectionHeader {
            magic,
            declared_size,
            offset,
        };

        let section = match &magic {
            b"tex " => Section::Textures(self.read_records()?),
            b"mate" => Section::Materials(self.read_records()?),
            b"mesh" => Section::Meshes(self.read_records()?),
            b"shap" => Section::Shapes(self.read_records()?),
            b"geom" => Section::Geometries(self.read_records()?),
            b"node" => Section::Nodes(self.read_records()?),
            b"nodK" => Section::Keyframes(self.read_records()?),
            b"visK" => Section::Visibility(self.read_records()?),
            _ => {
                if declared_size < 8 {
                    return Err(FormatError::InvalidSectionSize {
                        magic: magic_to_string(&magic),
                        offset,
                        size: declared_size,
                    });
                }
                self.cursor.skip(declared_size as usize - 8)?;
                tracing::debug!(
                    magic = %magic_to_string(&magic),
                    offset,
                    size = declared_size,
                    "skipping unknown section"
                );
                Section::Unknown(header)
            }
        };

        Ok(section)
    }

    fn read_records<R: Record>(&mut self) -> Result<Vec<R>> {
        let _section_count = self.cursor.read_u32()?;
        let item_count = self.cursor.read_u32()? as usize;
        let wanted = item_count.saturating_mul(R::SIZE);
        if wanted > self.cursor.remaining() {
            return Err(FormatError::UnexpectedEof {
                offset: self.cursor.position(),
                wanted,
                available: self.cursor.remaining(),
            });
        }

        let mut items = Vec::with_capacity(item_count);
        for _ in 0..item_count {
            items.push(R::read(&mut self.cursor, &self.strings)?);
        }
        tracing::debug!(
            magic = %magic_to_string(&R::MAGIC),
            count = item_count,
            "parsed section"
        );
        Ok(items)
    }
}

impl Iterator for SectionScanner<'_> {
    type Item = Result<Section>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.position() >= self.end {
            return None;
        }
        let section = self.next_section();
        self.failed = section.is_err();
        Some(section)
    }
}
