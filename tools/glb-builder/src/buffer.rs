//! Binary buffer packing with 4-byte alignment and accessor creation

use crate::utils::{align_buffer, compute_bounds};
use gltf_json as json;
use gltf_json::accessor::{ComponentType, Type};
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// How a packed view is bound on the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewTarget {
    Vertices,
    Indices,
    /// Animation samplers and inverse bind matrices
    None,
}

/// Builder for the single binary buffer of a document
#[derive(Default)]
pub struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Pack positions with the min/max bounds glTF requires
    pub fn pack_positions(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        let (min, max) = compute_bounds(positions);
        self.pack(
            bytemuck::cast_slice(positions),
            positions.len(),
            ComponentType::F32,
            Type::Vec3,
            ViewTarget::Vertices,
            Some((min, max)),
        )
    }

    /// Pack Vec3 vertex data (normals)
    pub fn pack_vec3(&mut self, data: &[[f32; 3]]) -> AccessorIndex {
        self.pack(
            bytemuck::cast_slice(data),
            data.len(),
            ComponentType::F32,
            Type::Vec3,
            ViewTarget::Vertices,
            None,
        )
    }

    /// Pack Vec2 vertex data (UVs)
    pub fn pack_vec2(&mut self, data: &[[f32; 2]]) -> AccessorIndex {
        self.pack(
            bytemuck::cast_slice(data),
            data.len(),
            ComponentType::F32,
            Type::Vec2,
            ViewTarget::Vertices,
            None,
        )
    }

    /// Pack Vec4 vertex data (weights)
    pub fn pack_vec4(&mut self, data: &[[f32; 4]]) -> AccessorIndex {
        self.pack(
            bytemuck::cast_slice(data),
            data.len(),
            ComponentType::F32,
            Type::Vec4,
            ViewTarget::Vertices,
            None,
        )
    }

    /// Pack joint indices (Vec4<u8>)
    pub fn pack_joints(&mut self, joints: &[[u8; 4]]) -> AccessorIndex {
        self.pack(
            bytemuck::cast_slice(joints),
            joints.len(),
            ComponentType::U8,
            Type::Vec4,
            ViewTarget::Vertices,
            None,
        )
    }

    /// Pack u16 triangle-list indices
    pub fn pack_indices_u16(&mut self, indices: &[u16]) -> AccessorIndex {
        self.pack(
            bytemuck::cast_slice(indices),
            indices.len(),
            ComponentType::U16,
            Type::Scalar,
            ViewTarget::Indices,
            None,
        )
    }

    /// Pack Mat4 data (inverse bind matrices)
    pub fn pack_mat4(&mut self, matrices: &[[f32; 16]]) -> AccessorIndex {
        self.pack(
            bytemuck::cast_slice(matrices),
            matrices.len(),
            ComponentType::F32,
            Type::Mat4,
            ViewTarget::None,
            None,
        )
    }

    /// Pack animation keyframe times with min/max
    pub fn pack_times(&mut self, times: &[f32]) -> AccessorIndex {
        let min = times.iter().copied().fold(f32::INFINITY, f32::min);
        let max = times.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        self.pack(
            bytemuck::cast_slice(times),
            times.len(),
            ComponentType::F32,
            Type::Scalar,
            ViewTarget::None,
            Some((vec![min], vec![max])),
        )
    }

    /// Pack animation output values (translations, rotations)
    pub fn pack_sampler_output<const N: usize>(&mut self, values: &[[f32; N]]) -> AccessorIndex
    where
        [f32; N]: bytemuck::Pod,
    {
        let type_ = match N {
            3 => Type::Vec3,
            4 => Type::Vec4,
            _ => Type::Scalar,
        };
        self.pack(
            bytemuck::cast_slice(values),
            values.len(),
            ComponentType::F32,
            type_,
            ViewTarget::None,
            None,
        )
    }

    fn pack(
        &mut self,
        bytes: &[u8],
        count: usize,
        component_type: ComponentType,
        type_: Type,
        target: ViewTarget,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> AccessorIndex {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: match target {
                ViewTarget::Vertices => Some(Valid(json::buffer::Target::ArrayBuffer)),
                ViewTarget::Indices => Some(Valid(json::buffer::Target::ElementArrayBuffer)),
                ViewTarget::None => None,
            },
        });

        let to_value =
            |values: Vec<f32>| json::Value::Array(values.into_iter().map(json::Value::from).collect());
        let (min, max) = match bounds {
            Some((min, max)) => (Some(to_value(min)), Some(to_value(max))),
            None => (None, None),
        };

        let index = AccessorIndex(self.accessors.len() as u32);
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });

        align_buffer(&mut self.buffer);
        index
    }
}
