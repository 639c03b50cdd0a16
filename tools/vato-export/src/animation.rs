//! IMTN motion to glTF animation conversion
//!
//! Motions carry no skeleton of their own; the node tree comes from an IMDL
//! model (usually `00_base.mdl`) and tracks are bound to nodes by name.

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::model::GENERATOR;
use crate::output::OutputSet;
use anyhow::{Context, Result};
use glb_builder::{
    AnimationBuilder, BufferBuilder, GltfBuilder, SkinBuilder, TrackOutput, json, named_node,
};
use hashbrown::HashMap;
use std::path::{Path, PathBuf};
use vato_formats::{AnimationTrack, ChannelValues, Model, Motion, NodeRecord};

/// Skeleton file tried first when none is configured
pub const DEFAULT_SKELETON: &str = "00_base.mdl";

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// Node tree borrowed from a model
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub nodes: Vec<NodeRecord>,
    pub children: Vec<Vec<usize>>,
}

impl Skeleton {
    pub fn from_model(data: &[u8]) -> Result<Self> {
        let model = Model::parse(data).context("Failed to parse skeleton IMDL")?;
        Ok(Self {
            nodes: model.nodes,
            children: model.children,
        })
    }

    /// Name to node index; a repeated name maps to its last node
    fn index_by_name(&self) -> HashMap<&str, u32> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name.as_str(), i as u32))
            .collect()
    }
}

/// Pick the skeleton model for a motion file
///
/// An explicit path is resolved against the motion's directory. Otherwise
/// `00_base.mdl` beside the motion is used, else the first `.mdl` there by
/// name.
pub fn find_skeleton(motion: &Path, configured: Option<&Path>) -> Result<PathBuf> {
    let dir = motion.parent().unwrap_or(Path::new(""));
    if let Some(configured) = configured {
        return Ok(dir.join(configured));
    }

    let base = dir.join(DEFAULT_SKELETON);
    if base.is_file() {
        return Ok(base);
    }

    let listing = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    let mut models: Vec<PathBuf> = std::fs::read_dir(listing)
        .with_context(|| format!("Failed to read directory: {}", listing.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("mdl"))
        })
        .collect();
    models.sort();
    models.into_iter().next().ok_or_else(|| {
        ExportError::MissingSkeleton {
            motion: motion.to_path_buf(),
        }
        .into()
    })
}

/// A converted motion, not yet serialized
#[derive(Debug)]
pub struct ConvertedAnimation {
    pub root: json::Root,
    pub buffer: Vec<u8>,
    /// Tracks bound to a skeleton node
    pub bound: usize,
    /// Bones named by tracks but missing from the skeleton
    pub unknown_bones: Vec<String>,
}

/// Convert a motion against `skeleton`
pub fn convert_animation(
    data: &[u8],
    name: &str,
    skeleton: &Skeleton,
    frame_rate: f32,
) -> Result<ConvertedAnimation> {
    let motion = Motion::parse(data).context("Failed to parse IMTN")?;
    let tracks = motion.tracks(frame_rate)?;

    let mut gltf = GltfBuilder::new();
    let mut buffer = BufferBuilder::new();

    for (node, children) in skeleton.nodes.iter().zip(&skeleton.children) {
        let matrix = (node.matrix != IDENTITY).then_some(node.matrix);
        let mut json_node = named_node(&node.name, matrix);
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

    let by_name = skeleton.index_by_name();
    let mut animation = AnimationBuilder::new(name);
    let mut unknown_bones: Vec<String> = Vec::new();
    let mut bound = 0;
    for AnimationTrack { bone, times, values } in tracks {
        let Some(&node) = by_name.get(bone.as_str()) else {
            tracing::warn!(bone = %bone, "dropping track: bone not in skeleton");
            if !unknown_bones.contains(&bone) {
                unknown_bones.push(bone);
            }
            continue;
        };
        if times.is_empty() {
            tracing::debug!(bone = %bone, "skipping empty track");
            continue;
        }
        let output = match values {
            ChannelValues::Translation(v) => TrackOutput::Translation(v),
            ChannelValues::Rotation(v) => TrackOutput::Rotation(v),
        };
        animation = animation.track(node, times, output);
        bound += 1;
    }

    if !unknown_bones.is_empty() {
        tracing::warn!(
            "{name} may not match the skeleton: {} bone(s) not found ({})",
            unknown_bones.len(),
            unknown_bones.join(", ")
        );
    }

    if animation.track_count() > 0 {
        let accessors = animation.build(&mut buffer);
        gltf.add_animation(&accessors);
    }

    let node_count = gltf.node_count();
    if node_count > 1 {
        let skin = SkinBuilder::new()
            .skeleton(0)
            .joints(1..node_count)
            .build(&mut buffer);
        gltf.add_skin(&skin);
    }

    gltf.add_scene(name, &[0]);
    let root = gltf.build(&buffer, GENERATOR, None);
    Ok(ConvertedAnimation {
        root,
        buffer: buffer.data().to_vec(),
        bound,
        unknown_bones,
    })
}

/// Convert a motion file and collect its output under `dir`
pub fn export_animation(
    data: &[u8],
    stem: &str,
    skeleton: &Skeleton,
    dir: &Path,
    config: &ExportConfig,
) -> Result<OutputSet> {
    let converted = convert_animation(data, stem, skeleton, config.animation.frame_rate)?;
    tracing::debug!(stem, tracks = converted.bound, "converted motion");

    let mut outputs = OutputSet::new();
    outputs.add_document(
        dir,
        stem,
        converted.root,
        &converted.buffer,
        config.output.binary,
    )?;
    Ok(outputs)
}
