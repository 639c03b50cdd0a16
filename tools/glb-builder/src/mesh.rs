//! Mesh construction: shared vertex streams, one primitive per index range

use crate::buffer::{AccessorIndex, BufferBuilder};

/// Accessors of one primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveAccessors {
    pub indices: AccessorIndex,
    pub material: Option<u32>,
}

/// Accessor indices for a mesh
#[derive(Debug, Clone)]
pub struct MeshAccessors {
    pub positions: AccessorIndex,
    pub normals: Option<AccessorIndex>,
    pub uvs: Option<AccessorIndex>,
    pub joints: Option<AccessorIndex>,
    pub weights: Option<AccessorIndex>,
    pub primitives: Vec<PrimitiveAccessors>,
}

/// Builder for mesh data
#[derive(Default)]
pub struct MeshBuilder<'a> {
    positions: &'a [[f32; 3]],
    normals: Option<&'a [[f32; 3]]>,
    uvs: Option<&'a [[f32; 2]]>,
    skin: Option<(&'a [[u8; 4]], &'a [[f32; 4]])>,
    primitives: Vec<(&'a [u16], Option<u32>)>,
}

impl<'a> MeshBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set positions (required)
    pub fn positions(mut self, positions: &'a [[f32; 3]]) -> Self {
        self.positions = positions;
        self
    }

    pub fn normals(mut self, normals: &'a [[f32; 3]]) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn uvs(mut self, uvs: &'a [[f32; 2]]) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Set joint indices and weights together
    pub fn skin(mut self, joints: &'a [[u8; 4]], weights: &'a [[f32; 4]]) -> Self {
        self.skin = Some((joints, weights));
        self
    }

    /// Add a triangle-list primitive over the shared vertex streams
    pub fn primitive(mut self, indices: &'a [u16], material: Option<u32>) -> Self {
        self.primitives.push((indices, material));
        self
    }

    /// Build and pack into buffer
    pub fn build(self, buffer: &mut BufferBuilder) -> MeshAccessors {
        let positions = buffer.pack_positions(self.positions);
        let uvs = self.uvs.map(|uv| buffer.pack_vec2(uv));
        let normals = self.normals.map(|n| buffer.pack_vec3(n));
        let (joints, weights) = match self.skin {
            Some((j, w)) => (Some(buffer.pack_joints(j)), Some(buffer.pack_vec4(w))),
            None => (None, None),
        };
        let primitives = self
            .primitives
            .iter()
            .map(|(indices, material)| PrimitiveAccessors {
                indices: buffer.pack_indices_u16(indices),
                material: *material,
            })
            .collect();

        MeshAccessors {
            positions,
            normals,
            uvs,
            joints,
            weights,
            primitives,
        }
    }
}
