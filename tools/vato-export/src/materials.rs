//! Material to texture assignment
//!
//! The decision order is fixed:
//! 1. When every material's texture hint indexes the texture list, the hints
//!    are used as is.
//! 2. Otherwise each material's name (minus its first `_`-separated token) is
//!    matched against the texture names without `.tga`.
//! 3. An unmatched material picks texture 0 when there is at most one
//!    texture, and defers to the [`TexturePolicy`] otherwise.

use crate::config::TexturePolicy;
use crate::error::ExportError;
use crate::prompt::Prompt;
use anyhow::Result;
use vato_formats::{MaterialRecord, TextureRef};

/// Texture file name up to its `.tga` suffix
pub fn texture_base_name(name: &str) -> &str {
    name.split(".tga").next().unwrap_or(name)
}

/// Name a material's texture is expected to have, if any
pub fn material_candidate(name: &str) -> Option<&str> {
    name.split_once('_').map(|(_, rest)| rest)
}

/// Texture index per material; `None` for every material when there are no
/// textures
pub fn resolve_textures(
    materials: &[MaterialRecord],
    textures: &[TextureRef],
    policy: TexturePolicy,
    prompt: &mut dyn Prompt,
) -> Result<Vec<Option<usize>>> {
    if textures.is_empty() {
        return Ok(vec![None; materials.len()]);
    }

    if materials
        .iter()
        .all(|m| (m.texture_hint() as usize) < textures.len())
    {
        return Ok(materials
            .iter()
            .map(|m| Some(m.texture_hint() as usize))
            .collect());
    }

    let names: Vec<String> = textures
        .iter()
        .map(|t| texture_base_name(&t.name).to_string())
        .collect();

    let mut assignments = Vec::with_capacity(materials.len());
    for material in materials {
        let matched = material_candidate(&material.name)
            .and_then(|candidate| names.iter().position(|n| n == candidate));
        let index = match matched {
            Some(index) => index,
            None if names.len() <= 1 => 0,
            None => match policy {
                TexturePolicy::AlwaysAsk => {
                    tracing::warn!(
                        material = %material.name,
                        candidates = names.len(),
                        "no matching texture, asking"
                    );
                    let choice = prompt.choose_texture(&material.name, &names)?;
                    if choice >= names.len() {
                        anyhow::bail!("texture choice {choice} out of range for {}", material.name);
                    }
                    tracing::info!(material = %material.name, choice, "using chosen texture");
                    choice
                }
                TexturePolicy::DefaultFirst => {
                    tracing::warn!(
                        material = %material.name,
                        candidates = names.len(),
                        "no matching texture, using texture 0"
                    );
                    0
                }
                TexturePolicy::FailOnAmbiguous => {
                    return Err(ExportError::AmbiguousTexture {
                        material: material.name.clone(),
                        candidates: names.len(),
                    }
                    .into());
                }
            },
        };
        assignments.push(Some(index));
    }
    Ok(assignments)
}
