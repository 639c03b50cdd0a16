//! Skin construction

use crate::buffer::BufferBuilder;
use gltf_json as json;

/// A skin ready to be added to a document
#[derive(Debug, Clone)]
pub struct SkinSpec {
    pub name: Option<String>,
    pub skeleton: Option<u32>,
    pub joints: Vec<u32>,
    pub inverse_bind_matrices: Option<json::Index<json::Accessor>>,
}

/// Builder for skin data
#[derive(Default)]
pub struct SkinBuilder {
    name: Option<String>,
    skeleton: Option<u32>,
    joints: Vec<u32>,
    inverse_bind_matrices: Option<Vec<[f32; 16]>>,
}

impl SkinBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Common root node of the joints
    pub fn skeleton(mut self, root: u32) -> Self {
        self.skeleton = Some(root);
        self
    }

    /// Joint node indices, in the order vertex joint slots refer to them
    pub fn joints(mut self, joints: impl IntoIterator<Item = u32>) -> Self {
        self.joints = joints.into_iter().collect();
        self
    }

    /// One matrix per joint, column-major
    pub fn inverse_bind_matrices(mut self, matrices: &[[f32; 16]]) -> Self {
        self.inverse_bind_matrices = Some(matrices.to_vec());
        self
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Pack the matrices (when set) into `buffer`
    pub fn build(self, buffer: &mut BufferBuilder) -> SkinSpec {
        let inverse_bind_matrices = self
            .inverse_bind_matrices
            .map(|m| buffer.pack_mat4(&m).as_json_index());
        SkinSpec {
            name: self.name,
            skeleton: self.skeleton,
            joints: self.joints,
            inverse_bind_matrices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY_MAT4: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ];

    #[test]
    fn test_skin_with_matrices() {
        let mut buffer = BufferBuilder::new();
        let builder = SkinBuilder::new()
            .joints([3, 1])
            .inverse_bind_matrices(&[IDENTITY_MAT4; 2]);
        assert_eq!(builder.joint_count(), 2);

        let skin = builder.build(&mut buffer);
        assert_eq!(skin.joints, vec![3, 1]);
        assert!(skin.inverse_bind_matrices.is_some());
        // 2 matrices * 64 bytes
        assert_eq!(buffer.data().len(), 128);
    }

    #[test]
    fn test_skeleton_only_skin_packs_nothing() {
        let mut buffer = BufferBuilder::new();
        let skin = SkinBuilder::new()
            .skeleton(0)
            .joints(1..4)
            .build(&mut buffer);

        assert_eq!(skin.skeleton, Some(0));
        assert_eq!(skin.joints, vec![1, 2, 3]);
        assert!(skin.inverse_bind_matrices.is_none());
        assert!(buffer.data().is_empty());
    }
}
