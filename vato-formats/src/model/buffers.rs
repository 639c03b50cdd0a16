//! Vertex, index and skin extraction for one geometry

use super::Model;
use crate::cursor::ByteCursor;
use crate::error::{FormatError, Result};

/// Skinning streams for a geometry
#[derive(Debug, Clone, PartialEq)]
pub struct SkinData {
    /// Palette slots per vertex
    pub joints: Vec<[u8; 4]>,
    pub weights: Vec<[f32; 4]>,
    /// One matrix per palette entry, in palette order
    pub inverse_bind_matrices: Vec<[f32; 16]>,
    /// Palette slot -> node index
    pub palette: Vec<u16>,
}

/// One index range drawn with a single material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    pub material: u16,
    pub indices: Vec<u16>,
}

/// Decoded buffers of one geometry; primitives share the vertex streams
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffers {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub skin: Option<SkinData>,
    pub primitives: Vec<Primitive>,
}

impl GeometryBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// All primitive indices back to back
    pub fn combined_indices(&self) -> Vec<u16> {
        self.primitives
            .iter()
            .flat_map(|p| p.indices.iter().copied())
            .collect()
    }
}

impl Model<'_> {
    /// Read the buffers of geometry `index`
    pub fn geometry_buffers(&self, index: usize) -> Result<GeometryBuffers> {
        let geometry = self
            .geometries
            .get(index)
            .ok_or(FormatError::IndexOutOfRange {
                what: "geometry",
                index,
                len: self.geometries.len(),
            })?;
        let shape = self.shape(geometry.shape)?;
        let count = shape.vertex_count as usize;
        let vertices = self.offsets.vertices;

        let positions = self
            .vertex_stream(vertices, shape.position_offset)?
            .read_f32_vecs::<3>(count)?;
        let uvs = if shape.has_uvs() {
            Some(
                self.vertex_stream(vertices, shape.uv_offset)?
                    .read_f32_vecs::<2>(count)?,
            )
        } else {
            None
        };
        let normals = if shape.has_normals() {
            Some(
                self.vertex_stream(vertices, shape.normal_offset)?
                    .read_f32_vecs::<3>(count)?,
            )
        } else {
            None
        };

        let skin = if shape.has_skin() {
            let bones = geometry.bone_count as usize;
            // The bind matrices sit directly behind the weight stream.
            let mut stream = self.vertex_stream(vertices, shape.blend_weight_offset)?;
            let weights = stream.read_f32_vecs::<4>(count)?;
            let inverse_bind_matrices = stream.read_f32_vecs::<16>(bones)?;

            let joints = ByteCursor::at(
                self.data(),
                self.offsets.blend_indices + shape.blend_index_offset as usize,
            )?
            .read_u8_vecs::<4>(count)?;

            let palette = ByteCursor::at(
                self.data(),
                self.offsets.triangles + geometry.bone_palette_offset as usize * 2,
            )?
            .read_u16_vec(bones)?;
            if let Some(&bad) = palette.iter().find(|&&n| n as usize >= self.nodes.len()) {
                return Err(FormatError::IndexOutOfRange {
                    what: "bone palette node",
                    index: bad as usize,
                    len: self.nodes.len(),
                });
            }

            Some(SkinData {
                joints,
                weights,
                inverse_bind_matrices,
                palette,
            })
        } else {
            None
        };

        let mut primitives = Vec::with_capacity(geometry.mesh_count as usize);
        for mesh in self.geometry_meshes(geometry)? {
            let indices = ByteCursor::at(
                self.data(),
                self.offsets.triangles + mesh.index_offset as usize * 2,
            )?
            .read_u16_vec(mesh.index_count as usize)?;
            primitives.push(Primitive {
                material: mesh.material,
                indices,
            });
        }

        Ok(GeometryBuffers {
            positions,
            uvs,
            normals,
            skin,
            primitives,
        })
    }

    fn vertex_stream(&self, base: usize, offset: u32) -> Result<ByteCursor<'_>> {
        ByteCursor::at(self.data(), base + offset as usize * 4)
    }
}
