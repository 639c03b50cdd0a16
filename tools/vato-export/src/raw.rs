//! Raw per-geometry buffer dump in 3DMigoto layout (.fmt / .vb / .ib / .vgmap)

use anyhow::{Context, Result};
use std::fmt::Write;
use vato_formats::{GeometryBuffers, NodeRecord};

/// One vertex element of the interleaved layout
struct Element {
    semantic: &'static str,
    format: &'static str,
    size: usize,
}

const POSITION: Element = Element {
    semantic: "POSITION",
    format: "R32G32B32_FLOAT",
    size: 12,
};
const TEXCOORD: Element = Element {
    semantic: "TEXCOORD",
    format: "R32G32_FLOAT",
    size: 8,
};
const NORMAL: Element = Element {
    semantic: "NORMAL",
    format: "R32G32B32_FLOAT",
    size: 12,
};
const BLENDINDICES: Element = Element {
    semantic: "BLENDINDICES",
    format: "R8G8B8A8_UINT",
    size: 4,
};
const BLENDWEIGHTS: Element = Element {
    semantic: "BLENDWEIGHTS",
    format: "R32G32B32A32_FLOAT",
    size: 16,
};

/// Dumped files of one geometry, keyed by extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGeometry {
    pub fmt: String,
    pub vb: Vec<u8>,
    pub ib: Vec<u8>,
    /// Only for skinned geometries
    pub vgmap: Option<String>,
}

impl RawGeometry {
    /// `(extension, bytes)` pairs in write order
    pub fn into_files(self) -> Vec<(&'static str, Vec<u8>)> {
        let mut files = vec![
            ("fmt", self.fmt.into_bytes()),
            ("vb", self.vb),
            ("ib", self.ib),
        ];
        if let Some(vgmap) = self.vgmap {
            files.push(("vgmap", vgmap.into_bytes()));
        }
        files
    }
}

fn elements(buffers: &GeometryBuffers) -> Vec<&'static Element> {
    let mut elements = vec![&POSITION];
    if buffers.uvs.is_some() {
        elements.push(&TEXCOORD);
    }
    if buffers.normals.is_some() {
        elements.push(&NORMAL);
    }
    if buffers.skin.is_some() {
        elements.push(&BLENDINDICES);
        elements.push(&BLENDWEIGHTS);
    }
    elements
}

/// Text layout description read by 3DMigoto-style tools
pub fn format_description(buffers: &GeometryBuffers) -> Result<String> {
    let mut out = String::new();
    write_description(&mut out, buffers).context("Failed to format layout description")?;
    Ok(out)
}

fn write_description(out: &mut impl Write, buffers: &GeometryBuffers) -> std::fmt::Result {
    let elements = elements(buffers);
    let stride: usize = elements.iter().map(|e| e.size).sum();

    writeln!(out, "stride: {stride}")?;
    writeln!(out, "topology: trianglelist")?;
    writeln!(out, "format: DXGI_FORMAT_R16_UINT")?;
    let mut offset = 0;
    for (id, element) in elements.iter().enumerate() {
        writeln!(out, "element[{id}]:")?;
        writeln!(out, "  SemanticName: {}", element.semantic)?;
        writeln!(out, "  SemanticIndex: 0")?;
        writeln!(out, "  Format: {}", element.format)?;
        writeln!(out, "  InputSlot: 0")?;
        writeln!(out, "  AlignedByteOffset: {offset}")?;
        writeln!(out, "  InputSlotClass: per-vertex")?;
        writeln!(out, "  InstanceDataStepRate: 0")?;
        offset += element.size;
    }
    Ok(())
}

/// Interleave the vertex streams in element order
pub fn vertex_bytes(buffers: &GeometryBuffers) -> Vec<u8> {
    let stride: usize = elements(buffers).iter().map(|e| e.size).sum();
    let mut out = Vec::with_capacity(stride * buffers.vertex_count());
    for i in 0..buffers.vertex_count() {
        out.extend_from_slice(bytemuck::cast_slice(&buffers.positions[i][..]));
        if let Some(uvs) = &buffers.uvs {
            out.extend_from_slice(bytemuck::cast_slice(&uvs[i][..]));
        }
        if let Some(normals) = &buffers.normals {
            out.extend_from_slice(bytemuck::cast_slice(&normals[i][..]));
        }
        if let Some(skin) = &buffers.skin {
            out.extend_from_slice(&skin.joints[i]);
            out.extend_from_slice(bytemuck::cast_slice(&skin.weights[i][..]));
        }
    }
    out
}

/// Bone name to palette slot, as pretty JSON
pub fn vertex_group_map(buffers: &GeometryBuffers, nodes: &[NodeRecord]) -> Result<Option<String>> {
    let Some(skin) = &buffers.skin else {
        return Ok(None);
    };
    let mut map = serde_json::Map::new();
    for (slot, &node) in skin.palette.iter().enumerate() {
        if let Some(node) = nodes.get(node as usize) {
            map.insert(node.name.clone(), serde_json::Value::from(slot));
        }
    }
    let json = serde_json::to_string_pretty(&map).context("Failed to serialize vgmap")?;
    Ok(Some(json))
}

/// Build all dump files of one geometry
pub fn dump_geometry(buffers: &GeometryBuffers, nodes: &[NodeRecord]) -> Result<RawGeometry> {
    Ok(RawGeometry {
        fmt: format_description(buffers)?,
        vb: vertex_bytes(buffers),
        ib: bytemuck::cast_slice(&buffers.combined_indices()).to_vec(),
        vgmap: vertex_group_map(buffers, nodes)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vato_formats::{Primitive, SkinData};

    fn node(name: &str) -> NodeRecord {
        NodeRecord {
            name: name.to_string(),
            unknown: 0.0,
            matrix: [0.0; 16],
            child_count: 0,
            traversal_flag: 0,
        }
    }

    fn skinned() -> GeometryBuffers {
        GeometryBuffers {
            positions: vec![[1.0, 2.0, 3.0]],
            uvs: Some(vec![[0.5, 0.25]]),
            normals: None,
            skin: Some(SkinData {
                joints: vec![[1, 0, 0, 0]],
                weights: vec![[1.0, 0.0, 0.0, 0.0]],
                inverse_bind_matrices: vec![[0.0; 16]; 2],
                palette: vec![2, 0],
            }),
            primitives: vec![
                Primitive {
                    material: 0,
                    indices: vec![0, 0],
                },
                Primitive {
                    material: 1,
                    indices: vec![0],
                },
            ],
        }
    }

    #[test]
    fn test_fmt_layout() {
        let fmt = format_description(&skinned()).unwrap();
        assert!(fmt.starts_with("stride: 40\n"));
        assert!(fmt.contains("element[1]:\n  SemanticName: TEXCOORD"));
        assert!(fmt.contains("  SemanticName: BLENDWEIGHTS\n  SemanticIndex: 0\n  Format: R32G32B32A32_FLOAT\n  InputSlot: 0\n  AlignedByteOffset: 24"));
        assert!(!fmt.contains("NORMAL"));
    }

    #[test]
    fn test_vertex_and_index_bytes() {
        let raw = dump_geometry(&skinned(), &[node("root"), node("hips"), node("arm")]).unwrap();
        assert_eq!(raw.vb.len(), 40);
        assert_eq!(&raw.vb[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&raw.vb[20..24], &[1, 0, 0, 0]);
        assert_eq!(raw.ib, vec![0, 0, 0, 0, 0, 0]);

        let vgmap: serde_json::Value = serde_json::from_str(&raw.vgmap.unwrap()).unwrap();
        assert_eq!(vgmap["arm"], 0);
        assert_eq!(vgmap["root"], 1);
    }

    #[test]
    fn test_unskinned_geometry_has_no_vgmap() {
        let mut buffers = skinned();
        buffers.skin = None;
        let raw = dump_geometry(&buffers, &[]).unwrap();
        assert_eq!(raw.into_files().len(), 3);
    }
}
