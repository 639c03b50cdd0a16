//! IMDL model container
//!
//! Parsing is two-phase: [`Model::parse`] scans the tagged sections into
//! typed record lists and rebuilds the node tree; vertex, index and skin data
//! is only pulled from the data regions on demand through
//! [`Model::geometry_buffers`].

pub mod buffers;
pub mod hierarchy;

pub use buffers::{GeometryBuffers, Primitive, SkinData};

use crate::error::{FormatError, Result};
use crate::section::{
    ContainerHeader, GeometryRecord, MaterialRecord, MeshRecord, NodeRecord, Section,
    SectionScanner, ShapeRecord, TextureRef,
};

pub const IMDL_MAGIC: &str = "IMDL";

/// Absolute offsets of the IMDL data regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOffsets {
    pub dictionary: usize,
    /// 4 x u8 per vertex, addressed in bytes
    pub blend_indices: usize,
    /// u16 index data and bone palettes, addressed in u16 units
    pub triangles: usize,
    pub reserved: usize,
    /// f32 vertex streams and bind matrices, addressed in f32 units
    pub vertices: usize,
}

impl From<&ContainerHeader> for BlockOffsets {
    fn from(header: &ContainerHeader) -> Self {
        let [dictionary, blend_indices, triangles, reserved, vertices] =
            header.regions.map(|r| r as usize);
        Self {
            dictionary,
            blend_indices,
            triangles,
            reserved,
            vertices,
        }
    }
}

/// A parsed IMDL file borrowing the raw bytes
#[derive(Debug, Clone)]
pub struct Model<'a> {
    data: &'a [u8],
    pub header: ContainerHeader,
    pub offsets: BlockOffsets,
    pub textures: Vec<TextureRef>,
    pub materials: Vec<MaterialRecord>,
    pub meshes: Vec<MeshRecord>,
    pub shapes: Vec<ShapeRecord>,
    pub geometries: Vec<GeometryRecord>,
    pub nodes: Vec<NodeRecord>,
    /// Child lists indexed like `nodes`; node 0 is the root
    pub children: Vec<Vec<usize>>,
}

impl<'a> Model<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header = ContainerHeader::parse(data, IMDL_MAGIC)?;
        let offsets = BlockOffsets::from(&header);

        let mut model = Self {
            data,
            header,
            offsets,
            textures: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            shapes: Vec::new(),
            geometries: Vec::new(),
            nodes: Vec::new(),
            children: Vec::new(),
        };

        for section in SectionScanner::for_container(data, &model.header)? {
            match section? {
                Section::Textures(t) => model.textures = t,
                Section::Materials(m) => model.materials = m,
                Section::Meshes(m) => model.meshes = m,
                Section::Shapes(s) => model.shapes = s,
                Section::Geometries(g) => model.geometries = g,
                Section::Nodes(n) => model.nodes = n,
                other @ (Section::Keyframes(_) | Section::Visibility(_)) => {
                    tracing::debug!(kind = other.kind(), "ignoring animation section in model");
                }
                Section::Unknown(_) => {}
            }
        }

        if model.nodes.is_empty() {
            return Err(FormatError::MissingSection("node"));
        }
        let counts: Vec<u32> = model.nodes.iter().map(|n| n.child_count).collect();
        model.children = hierarchy::build_children(&counts)?;

        tracing::debug!(
            nodes = model.nodes.len(),
            geometries = model.geometries.len(),
            materials = model.materials.len(),
            textures = model.textures.len(),
            "parsed IMDL"
        );
        Ok(model)
    }

    /// Raw file bytes
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Index of the first node with the given name
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    pub fn shape(&self, index: u16) -> Result<&ShapeRecord> {
        self.shapes
            .get(index as usize)
            .ok_or(FormatError::IndexOutOfRange {
                what: "shape",
                index: index as usize,
                len: self.shapes.len(),
            })
    }

    /// Mesh records belonging to a geometry
    pub fn geometry_meshes(&self, geometry: &GeometryRecord) -> Result<&[MeshRecord]> {
        let range = geometry.mesh_range();
        let last = range.end;
        self.meshes
            .get(range)
            .ok_or(FormatError::IndexOutOfRange {
                what: "mesh",
                index: last.saturating_sub(1),
                len: self.meshes.len(),
            })
    }
}
