//! GLTF document construction

use crate::animation::Property;
use crate::{AnimationAccessors, BufferBuilder, MaterialSpec, MeshAccessors, SkinSpec};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Create a node with an optional local matrix and nothing else attached
pub fn named_node(name: &str, matrix: Option<[f32; 16]>) -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix,
        mesh: None,
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        skin: None,
        translation: None,
        weights: None,
    }
}

/// Builder for complete GLTF documents
///
/// Every `add_*` method returns the index of the added object.
#[derive(Default)]
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    images: Vec<json::Image>,
    samplers: Vec<json::texture::Sampler>,
    textures: Vec<json::Texture>,
    materials: Vec<json::Material>,
    skins: Vec<json::Skin>,
    animations: Vec<json::Animation>,
    scenes: Vec<json::Scene>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: json::Node) -> u32 {
        self.nodes.push(node);
        self.nodes.len() as u32 - 1
    }

    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn node_mut(&mut self, index: u32) -> Option<&mut json::Node> {
        self.nodes.get_mut(index as usize)
    }

    /// Append `child` to the children of `parent`
    pub fn add_child(&mut self, parent: u32, child: u32) {
        if let Some(node) = self.nodes.get_mut(parent as usize) {
            node.children
                .get_or_insert_with(Vec::new)
                .push(json::Index::new(child));
        }
    }

    /// Add a mesh; each primitive shares the vertex attributes
    pub fn add_mesh(&mut self, name: &str, accessors: &MeshAccessors) -> u32 {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            accessors.positions.as_json_index(),
        );

        if let Some(normals) = accessors.normals {
            attributes.insert(
                Valid(json::mesh::Semantic::Normals),
                normals.as_json_index(),
            );
        }

        if let Some(uvs) = accessors.uvs {
            attributes.insert(
                Valid(json::mesh::Semantic::TexCoords(0)),
                uvs.as_json_index(),
            );
        }

        if let Some(joints) = accessors.joints {
            attributes.insert(
                Valid(json::mesh::Semantic::Joints(0)),
                joints.as_json_index(),
            );
        }

        if let Some(weights) = accessors.weights {
            attributes.insert(
                Valid(json::mesh::Semantic::Weights(0)),
                weights.as_json_index(),
            );
        }

        let primitives = accessors
            .primitives
            .iter()
            .map(|primitive| json::mesh::Primitive {
                attributes: attributes.clone(),
                extensions: Default::default(),
                extras: Default::default(),
                indices: Some(primitive.indices.as_json_index()),
                material: primitive.material.map(json::Index::new),
                mode: Valid(json::mesh::Mode::Triangles),
                targets: None,
            })
            .collect();

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives,
            weights: None,
        });
        self.meshes.len() as u32 - 1
    }

    /// Add an image stored next to the document
    pub fn add_image(&mut self, uri: &str) -> u32 {
        self.images.push(json::Image {
            buffer_view: None,
            mime_type: None,
            name: None,
            uri: Some(uri.to_string()),
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.images.len() as u32 - 1
    }

    /// Add a sampler wrapping REPEAT on both axes
    pub fn add_repeat_sampler(&mut self) -> u32 {
        self.samplers.push(json::texture::Sampler {
            wrap_s: Valid(json::texture::WrappingMode::Repeat),
            wrap_t: Valid(json::texture::WrappingMode::Repeat),
            ..Default::default()
        });
        self.samplers.len() as u32 - 1
    }

    pub fn add_texture(&mut self, image: u32, sampler: u32) -> u32 {
        self.textures.push(json::Texture {
            name: None,
            sampler: Some(json::Index::new(sampler)),
            source: json::Index::new(image),
            extensions: Default::default(),
            extras: Default::default(),
        });
        self.textures.len() as u32 - 1
    }

    pub fn add_material(&mut self, material: &MaterialSpec) -> u32 {
        self.materials.push(material.to_json());
        self.materials.len() as u32 - 1
    }

    pub fn add_skin(&mut self, skin: &SkinSpec) -> u32 {
        self.skins.push(json::Skin {
            extensions: Default::default(),
            extras: Default::default(),
            inverse_bind_matrices: skin.inverse_bind_matrices,
            joints: skin.joints.iter().map(|j| json::Index::new(*j)).collect(),
            name: skin.name.clone(),
            skeleton: skin.skeleton.map(json::Index::new),
        });
        self.skins.len() as u32 - 1
    }

    /// Add an animation with one linear sampler per channel
    pub fn add_animation(&mut self, accessors: &AnimationAccessors) -> u32 {
        let mut samplers = Vec::with_capacity(accessors.channels.len());
        let mut channels = Vec::with_capacity(accessors.channels.len());

        for channel in &accessors.channels {
            samplers.push(json::animation::Sampler {
                input: channel.input.as_json_index(),
                interpolation: Valid(json::animation::Interpolation::Linear),
                output: channel.output.as_json_index(),
                extensions: Default::default(),
                extras: Default::default(),
            });
            let path = match channel.property {
                Property::Translation => json::animation::Property::Translation,
                Property::Rotation => json::animation::Property::Rotation,
            };
            channels.push(json::animation::Channel {
                sampler: json::Index::new(samplers.len() as u32 - 1),
                target: json::animation::Target {
                    node: json::Index::new(channel.node),
                    path: Valid(path),
                    extensions: Default::default(),
                    extras: Default::default(),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }

        self.animations.push(json::Animation {
            channels,
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(accessors.name.clone()),
            samplers,
        });
        self.animations.len() as u32 - 1
    }

    pub fn add_scene(&mut self, name: &str, root_nodes: &[u32]) -> u32 {
        self.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            nodes: root_nodes.iter().map(|n| json::Index::new(*n)).collect(),
        });
        self.scenes.len() as u32 - 1
    }

    /// Build final GLTF Root
    ///
    /// `buffer_uri` names an external `.bin`; `None` means the GLB binary
    /// chunk. An empty buffer is omitted from the document.
    pub fn build(
        self,
        buffer: &BufferBuilder,
        generator: &str,
        buffer_uri: Option<String>,
    ) -> json::Root {
        let buffers = if buffer.data().is_empty() {
            Vec::new()
        } else {
            vec![json::Buffer {
                byte_length: (buffer.data().len() as u64).into(),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri: buffer_uri,
            }]
        };

        json::Root {
            accessors: buffer.accessors().to_vec(),
            animations: self.animations,
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: buffer.views().to_vec(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: self.images,
            materials: self.materials,
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: self.samplers,
            scene: if self.scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes: self.scenes,
            skins: self.skins,
            textures: self.textures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnimationBuilder, MeshBuilder, SkinBuilder, TrackOutput};

    #[test]
    fn test_gltf_builder_basic() {
        let mut buffer = BufferBuilder::new();
        let mesh = MeshBuilder::new()
            .positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]])
            .primitive(&[0, 1, 2], None)
            .build(&mut buffer);

        let mut gltf = GltfBuilder::new();
        let mesh = gltf.add_mesh("Triangle", &mesh);
        let mut node = named_node("Triangle", None);
        node.mesh = Some(json::Index::new(mesh));
        let node = gltf.add_node(node);
        gltf.add_scene("Scene", &[node]);

        let root = gltf.build(&buffer, "test", None);

        assert_eq!(root.meshes.len(), 1);
        assert_eq!(root.scenes.len(), 1);
        assert_eq!(root.buffers.len(), 1);
        assert!(root.buffers[0].uri.is_none());
        assert_eq!(root.asset.version, "2.0");
    }

    #[test]
    fn test_textured_material_chain() {
        let mut gltf = GltfBuilder::new();
        let image = gltf.add_image("00_skin.png");
        let sampler = gltf.add_repeat_sampler();
        let texture = gltf.add_texture(image, sampler);
        let material = gltf.add_material(&MaterialSpec::new("skin").texture(texture));

        let root = gltf.build(&BufferBuilder::new(), "test", None);

        assert_eq!(material, 0);
        assert_eq!(root.images[0].uri.as_deref(), Some("00_skin.png"));
        assert_eq!(root.textures[0].source.value(), 0);
        assert!(matches!(
            root.samplers[0].wrap_s,
            Valid(json::texture::WrappingMode::Repeat)
        ));
        assert!(root.buffers.is_empty());
    }

    #[test]
    fn test_children_skin_and_animation() {
        let mut buffer = BufferBuilder::new();
        let mut gltf = GltfBuilder::new();
        let root_node = gltf.add_node(named_node("root", None));
        let bone = gltf.add_node(named_node("bone", Some([1.0; 16])));
        gltf.add_child(root_node, bone);

        let skin = SkinBuilder::new()
            .skeleton(root_node)
            .joints([bone])
            .build(&mut buffer);
        gltf.add_skin(&skin);

        let anim = AnimationBuilder::new("idle")
            .track(
                bone,
                vec![0.0, 1.0],
                TrackOutput::Rotation(vec![[0.0, 0.0, 0.0, 1.0]; 2]),
            )
            .build(&mut buffer);
        gltf.add_animation(&anim);

        let root = gltf.build(&buffer, "test", Some("model.bin".to_string()));

        assert_eq!(root.nodes[0].children.as_ref().map(Vec::len), Some(1));
        assert_eq!(root.skins[0].joints[0].value(), 1);
        assert_eq!(root.animations[0].channels.len(), 1);
        assert!(matches!(
            root.animations[0].channels[0].target.path,
            Valid(json::animation::Property::Rotation)
        ));
        assert_eq!(root.buffers[0].uri.as_deref(), Some("model.bin"));
    }
}
