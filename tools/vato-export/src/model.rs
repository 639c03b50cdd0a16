//! IMDL model to glTF conversion

use crate::config::{ExportConfig, TexturePolicy};
use crate::materials::resolve_textures;
use crate::output::{OutputSet, file_safe};
use crate::prompt::Prompt;
use crate::raw::{RawGeometry, dump_geometry};
use anyhow::{Context, Result};
use glb_builder::{
    AlphaMode, BufferBuilder, GltfBuilder, MaterialSpec, MeshBuilder, SkinBuilder, json,
    named_node,
};
use std::path::Path;
use vato_formats::{BlendMode, FormatError, GeometryBuffers, Model};

/// Value of `asset.generator` in every exported document
pub const GENERATOR: &str = concat!("vato-export ", env!("CARGO_PKG_VERSION"));

/// A converted model, not yet serialized
#[derive(Debug)]
pub struct ConvertedModel {
    pub root: json::Root,
    pub buffer: Vec<u8>,
    /// `{index:02}_{geometry name}` and its dump, when requested
    pub raw: Vec<(String, RawGeometry)>,
}

fn alpha_mode(mode: BlendMode) -> AlphaMode {
    match mode {
        BlendMode::Opaque => AlphaMode::Opaque,
        BlendMode::Mask => AlphaMode::Mask,
        BlendMode::Blend => AlphaMode::Blend,
    }
}

/// Convert an IMDL file into a glTF document with one buffer
pub fn convert_model(
    data: &[u8],
    name: &str,
    policy: TexturePolicy,
    dump_raw: bool,
    prompt: &mut dyn Prompt,
) -> Result<ConvertedModel> {
    let model = Model::parse(data).context("Failed to parse IMDL")?;
    let assignments = resolve_textures(&model.materials, &model.textures, policy, prompt)?;

    let mut gltf = GltfBuilder::new();
    let mut buffer = BufferBuilder::new();

    // Images follow the names the texture export writes, in list order
    for (i, texture) in model.textures.iter().enumerate() {
        gltf.add_image(&format!("{i:02}_{}.png", texture.name));
    }

    for (material, assignment) in model.materials.iter().zip(&assignments) {
        let mut spec =
            MaterialSpec::new(&material.name).alpha_mode(alpha_mode(material.blend_mode()));
        if let Some(image) = assignment {
            let sampler = gltf.add_repeat_sampler();
            let texture = gltf.add_texture(*image as u32, sampler);
            spec = spec.texture(texture);
        }
        gltf.add_material(&spec);
    }

    for (node, children) in model.nodes.iter().zip(&model.children) {
        let mut json_node = named_node(&node.name, Some(node.matrix));
        if !children.is_empty() {
            json_node.children = Some(
                children
                    .iter()
                    .map(|&c| json::Index::new(c as u32))
                    .collect(),
            );
        }
        gltf.add_node(json_node);
    }

    let mut raw = Vec::new();
    for (index, geometry) in model.geometries.iter().enumerate() {
        let buffers = model
            .geometry_buffers(index)
            .with_context(|| format!("Failed to read geometry {index} ({})", geometry.name))?;

        if dump_raw {
            let dump = dump_geometry(&buffers, &model.nodes)?;
            raw.push((format!("{index:02}_{}", file_safe(&geometry.name)), dump));
        }

        let Some(mesh) = build_mesh(&buffers, model.materials.len(), &geometry.name, &mut buffer)
        else {
            continue;
        };
        let mesh_index = gltf.add_mesh(&geometry.name, &mesh);

        let node_index = match geometry.node {
            Some(node) => {
                let target = gltf
                    .node_mut(node as u32)
                    .ok_or(FormatError::IndexOutOfRange {
                        what: "geometry node",
                        index: node as usize,
                        len: model.nodes.len(),
                    })?;
                target.mesh = Some(json::Index::new(mesh_index));
                node as u32
            }
            None => {
                let mut created = named_node(&geometry.name, None);
                created.mesh = Some(json::Index::new(mesh_index));
                let created = gltf.add_node(created);
                gltf.add_child(0, created);
                created
            }
        };

        if let Some(skin) = &buffers.skin {
            if skin.palette.is_empty() {
                tracing::warn!(geometry = %geometry.name, "skinned geometry without bones");
                continue;
            }
            let spec = SkinBuilder::new()
                .joints(skin.palette.iter().map(|&n| n as u32))
                .inverse_bind_matrices(&skin.inverse_bind_matrices)
                .build(&mut buffer);
            let skin_index = gltf.add_skin(&spec);
            if let Some(node) = gltf.node_mut(node_index) {
                node.skin = Some(json::Index::new(skin_index));
            }
        }
    }

    gltf.add_scene(name, &[0]);
    let root = gltf.build(&buffer, GENERATOR, None);
    Ok(ConvertedModel {
        root,
        buffer: buffer.data().to_vec(),
        raw,
    })
}

/// Pack one geometry; `None` when nothing drawable is left
fn build_mesh(
    buffers: &GeometryBuffers,
    material_count: usize,
    name: &str,
    buffer: &mut BufferBuilder,
) -> Option<glb_builder::MeshAccessors> {
    if buffers.vertex_count() == 0 {
        tracing::warn!(geometry = %name, "skipping geometry without vertices");
        return None;
    }

    let mut mesh = MeshBuilder::new().positions(&buffers.positions);
    if let Some(uvs) = &buffers.uvs {
        mesh = mesh.uvs(uvs);
    }
    if let Some(normals) = &buffers.normals {
        mesh = mesh.normals(normals);
    }
    if let Some(skin) = &buffers.skin {
        mesh = mesh.skin(&skin.joints, &skin.weights);
    }

    let mut drawn = 0;
    for primitive in buffers.primitives.iter().filter(|p| !p.indices.is_empty()) {
        let material = primitive.material as usize;
        let material = if material < material_count {
            Some(material as u32)
        } else {
            tracing::warn!(geometry = %name, material, "material index out of range");
            None
        };
        mesh = mesh.primitive(&primitive.indices, material);
        drawn += 1;
    }
    if drawn == 0 {
        tracing::warn!(geometry = %name, "skipping geometry without triangles");
        return None;
    }
    Some(mesh.build(buffer))
}

/// Convert a model and collect its output files under `dir`
///
/// Raw buffer dumps go to `{dir}/{stem}/`.
pub fn export_model(
    data: &[u8],
    stem: &str,
    dir: &Path,
    config: &ExportConfig,
    prompt: &mut dyn Prompt,
) -> Result<OutputSet> {
    let converted = convert_model(
        data,
        stem,
        config.textures.ambiguous,
        config.output.dump_raw_buffers,
        prompt,
    )?;

    let mut outputs = OutputSet::new();
    outputs.add_document(
        dir,
        stem,
        converted.root,
        &converted.buffer,
        config.output.binary,
    )?;

    let raw_dir = dir.join(stem);
    for (name, geometry) in converted.raw {
        for (extension, bytes) in geometry.into_files() {
            outputs.add(raw_dir.join(format!("{name}.{extension}")), bytes);
        }
    }
    Ok(outputs)
}
