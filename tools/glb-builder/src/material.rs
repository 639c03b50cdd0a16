//! Unlit-style PBR materials with an optional base-color texture

use gltf_json as json;
use gltf_json::material::{AlphaMode, PbrMetallicRoughness, StrengthFactor};
use gltf_json::validation::Checked::Valid;

/// Material description; converted to glTF with metallic 0 and roughness 1
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSpec {
    pub name: String,
    /// Texture index in the document
    pub base_color_texture: Option<u32>,
    pub alpha_mode: AlphaMode,
}

impl MaterialSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_color_texture: None,
            alpha_mode: AlphaMode::Opaque,
        }
    }

    pub fn texture(mut self, texture: u32) -> Self {
        self.base_color_texture = Some(texture);
        self
    }

    pub fn alpha_mode(mut self, mode: AlphaMode) -> Self {
        self.alpha_mode = mode;
        self
    }

    pub fn to_json(&self) -> json::Material {
        json::Material {
            name: Some(self.name.clone()),
            alpha_mode: Valid(self.alpha_mode),
            pbr_metallic_roughness: PbrMetallicRoughness {
                base_color_texture: self.base_color_texture.map(|index| json::texture::Info {
                    index: json::Index::new(index),
                    tex_coord: 0,
                    extensions: Default::default(),
                    extras: Default::default(),
                }),
                metallic_factor: StrengthFactor(0.0),
                roughness_factor: StrengthFactor(1.0),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
