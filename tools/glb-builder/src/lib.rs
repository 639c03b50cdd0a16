//! GLB/GLTF generation utilities for the VATO asset tools
//!
//! This library provides builder-pattern APIs for constructing glTF 2.0 files:
//! - BufferBuilder: Pack binary data with automatic alignment
//! - MeshBuilder: Shared vertex streams with one primitive per material
//! - SkinBuilder: Joint lists and inverse bind matrices
//! - AnimationBuilder: Per-node translation/rotation tracks
//! - MaterialSpec: Base-color textured materials
//! - GltfBuilder: Top-level GLTF document construction
//!
//! # Example
//!
//! ```no_run
//! use glb_builder::*;
//!
//! let mut buffer = BufferBuilder::new();
//! let mesh = MeshBuilder::new()
//!     .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
//!     .normals(&[[0.0, 0.0, 1.0]; 3])
//!     .primitive(&[0, 1, 2], None)
//!     .build(&mut buffer);
//!
//! let mut gltf = GltfBuilder::new();
//! let mesh = gltf.add_mesh("Triangle", &mesh);
//! let mut node = named_node("Triangle", None);
//! node.mesh = Some(json::Index::new(mesh));
//! let node = gltf.add_node(node);
//! gltf.add_scene("Scene", &[node]);
//!
//! let root = gltf.build(&buffer, "glb-builder", None);
//! let glb_bytes = assemble_glb(&root, buffer.data()).unwrap();
//! ```

pub mod animation;
pub mod buffer;
pub mod document;
pub mod material;
pub mod mesh;
pub mod skin;
pub mod utils;

pub use animation::{AnimationAccessors, AnimationBuilder, ChannelAccessors, Property, TrackOutput};
pub use buffer::{AccessorIndex, BufferBuilder};
pub use document::{GltfBuilder, named_node};
pub use material::MaterialSpec;
pub use mesh::{MeshAccessors, MeshBuilder, PrimitiveAccessors};
pub use skin::{SkinBuilder, SkinSpec};
pub use utils::{align_buffer, assemble_glb, compute_bounds, to_gltf_text};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::material::AlphaMode;
pub use gltf_json::validation::Checked::Valid;
