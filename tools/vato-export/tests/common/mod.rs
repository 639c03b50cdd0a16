//! Synthetic game files for the integration tests
//!
//! Every builder lays files out the way the game does, so the tests exercise
//! the real parsers end to end.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use vato_formats::ByteWriter;

pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// Translation by (0, 2, 0), column-major
pub const RAISED: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 1.0,
];

/// Geometry node value meaning "create a node"
pub const NO_NODE: u16 = 0xFFFF;

/// IMDL / IMTN image: 32-byte header, sections, dictionary, four regions
pub struct Container {
    magic: [u8; 4],
    section_count: u16,
    sections: ByteWriter,
    dictionary: ByteWriter,
    regions: [ByteWriter; 4],
}

impl Container {
    pub fn new(magic: &[u8; 4]) -> Self {
        Self {
            magic: *magic,
            section_count: 0,
            sections: ByteWriter::new(),
            dictionary: ByteWriter::new(),
            regions: Default::default(),
        }
    }

    pub fn string(&mut self, s: &str) -> u32 {
        let offset = self.dictionary.position() as u32;
        self.dictionary.write_bytes(s.as_bytes()).write_u8(0);
        offset
    }

    /// Region `1..=4`
    pub fn region(&mut self, index: usize) -> &mut ByteWriter {
        &mut self.regions[index - 1]
    }

    pub fn section(&mut self, magic: &[u8; 4], item_count: u32, records: impl FnOnce(&mut ByteWriter)) {
        let mut body = ByteWriter::new();
        body.write_u32(1).write_u32(item_count);
        records(&mut body);
        self.section_count += 1;
        self.sections
            .write_bytes(magic)
            .write_u32(8 + body.position() as u32)
            .write_bytes(body.as_slice());
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = ByteWriter::new();
        out.write_bytes(&self.magic)
            .write_u16(0)
            .write_u16(0)
            .write_u16(0)
            .write_u16(self.section_count);
        let table = out.position();
        for _ in 0..5 {
            out.write_u32(0);
        }
        out.write_bytes(self.sections.as_slice());

        let mut offsets = [0u32; 5];
        let blocks = std::iter::once(&self.dictionary).chain(self.regions.iter());
        for (offset, block) in offsets.iter_mut().zip(blocks) {
            let aligned = out.position().div_ceil(4) * 4;
            out.pad_to(aligned);
            *offset = out.position() as u32;
            out.write_bytes(block.as_slice());
        }
        for (i, offset) in offsets.iter().enumerate() {
            out.patch_u32(table + i * 4, *offset);
        }
        out.into_inner()
    }
}

/// A two-node model with one three-vertex geometry drawn by two meshes
pub struct ModelFixture {
    pub uv: bool,
    pub skin: bool,
    /// Geometry target node, [`NO_NODE`] for none
    pub geometry_node: u16,
    /// Texture hints of `mat_skin`, `mat_hair`, `mat_glass`
    pub hints: [u32; 3],
    pub textures: Vec<&'static str>,
}

impl Default for ModelFixture {
    fn default() -> Self {
        Self {
            uv: true,
            skin: true,
            geometry_node: NO_NODE,
            hints: [0, 1, 0],
            textures: vec!["skin.tga", "hair.tga"],
        }
    }
}

impl ModelFixture {
    pub fn build(&self) -> Vec<u8> {
        let mut b = Container::new(b"IMDL");
        let texture_names: Vec<u32> = self.textures.iter().map(|t| b.string(t)).collect();
        let materials = [
            (b.string("mat_skin"), 0x02u32),
            (b.string("mat_hair"), 0x10),
            (b.string("mat_glass"), 0x00),
        ];
        let geometry_name = b.string("body");
        let root = b.string("root");
        let bone = b.string("bone");

        // Vertex region; a leading float keeps every stream offset non-zero.
        let v = b.region(4);
        v.write_f32(0.0);
        let position_offset = 1u32;
        v.write_f32s(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let mut next = position_offset + 9;
        let mut uv_offset = 0;
        if self.uv {
            uv_offset = next;
            v.write_f32s(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
            next += 6;
        }
        let normal_offset = next;
        v.write_f32s(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        next += 9;
        let mut weight_offset = 0;
        if self.skin {
            weight_offset = next;
            v.write_f32s(&[1.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
            v.write_f32s(&IDENTITY).write_f32s(&RAISED);
            b.region(1).write_bytes(&[0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0]);
        }

        // Two triangles, then the bone palette at u16 offset 6
        let t = b.region(2);
        for index in [0u16, 1, 2, 2, 1, 0, 0, 1] {
            t.write_u16(index);
        }

        if !texture_names.is_empty() {
            b.section(b"tex ", texture_names.len() as u32, |w| {
                for name in &texture_names {
                    w.write_u32(*name);
                }
            });
        }
        let hints = self.hints;
        b.section(b"mate", 3, |w| {
            for ((name, flags), hint) in materials.iter().zip(hints) {
                w.write_u32(*name).write_i32(0).write_u32(*flags);
                for _ in 0..10 {
                    w.write_u32(0);
                }
                w.write_f32(1.0).write_u16(0).write_u16(0);
                w.write_u32(0).write_u32(0).write_u32(hint).write_u32(0);
            }
        });
        b.section(b"mesh", 2, |w| {
            w.write_u16(0).write_u16(0).write_u32(0).write_u32(3).write_u32(0);
            w.write_u16(1).write_u16(0).write_u32(0).write_u32(3).write_u32(3);
        });
        b.section(b"shap", 1, |w| {
            w.write_u32(0).write_u32(0).write_u32(3);
            w.write_u32(position_offset).write_u32(uv_offset).write_u32(0);
            w.write_u32(normal_offset).write_u32(0).write_u32(weight_offset);
        });
        let (geometry_node, bones) = (self.geometry_node, if self.skin { 2 } else { 0 });
        b.section(b"geom", 1, |w| {
            w.write_u32(geometry_name)
                .write_u16(geometry_node)
                .write_i16(0)
                .write_u32(0);
            w.write_u16(0).write_u16(0);
            w.write_f32s(&IDENTITY).write_f32s(&[0.0; 9]);
            w.write_bytes(&[0u8; 16]);
            w.write_u16(2).write_u16(0);
            w.write_u32(bones).write_u32(0).write_u32(6);
            w.write_bytes(&[0u8; 12]);
        });
        b.section(b"node", 2, |w| {
            for (name, matrix, children) in [(root, IDENTITY, 1), (bone, RAISED, 0)] {
                w.write_u32(name).write_f32(0.0).write_f32s(&matrix);
                w.write_u32(children).write_u32(0);
            }
        });
        b.build()
    }
}

/// One `nodK` track: bone, channel code, ticks, flattened values
pub struct Track<'a> {
    pub bone: &'a str,
    pub channel: u32,
    pub ticks: &'a [u16],
    pub values: &'a [f32],
}

pub fn motion(tracks: &[Track<'_>]) -> Vec<u8> {
    let mut b = Container::new(b"IMTN");
    let mut records = Vec::new();
    let (mut time_offset, mut value_offset) = (0u32, 0u32);
    for track in tracks {
        let bone = b.string(track.bone);
        for &tick in track.ticks {
            b.region(2).write_u16(tick);
        }
        b.region(4).write_f32s(track.values);
        records.push([
            bone,
            track.ticks.len() as u32,
            time_offset,
            track.channel,
            value_offset,
        ]);
        time_offset += track.ticks.len() as u32;
        value_offset += track.values.len() as u32;
    }
    b.section(b"nodK", records.len() as u32, |w| {
        for record in &records {
            for value in record {
                w.write_u32(*value);
            }
        }
    });
    b.build()
}

/// One GLTP entry: name, format code, width, height, pixel bytes
pub type TextureSpec<'a> = (&'a str, u32, u16, u16, &'a [u8]);

pub fn texture_archive(entries: &[TextureSpec<'_>]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_bytes(b"GLTP")
        .write_u32(1)
        .write_u32(entries.len() as u32)
        .write_u32(0);

    // Names, then pixels, after the descriptor table
    let mut payload = ByteWriter::new();
    let base = 0x20 * (entries.len() + 1);
    let mut descriptors = Vec::new();
    for (name, format, width, height, pixels) in entries {
        let name_offset = base + payload.position();
        payload.write_bytes(name.as_bytes()).write_u8(0);
        let aligned = payload.position().div_ceil(4) * 4;
        payload.pad_to(aligned);
        let data_offset = base + payload.position();
        payload.write_bytes(pixels);
        descriptors.push((name_offset, pixels.len(), data_offset, *format, *width, *height));
    }

    for (i, (name_offset, size, data_offset, format, width, height)) in
        descriptors.into_iter().enumerate()
    {
        w.pad_to(0x20 * (i + 1));
        w.write_u32(name_offset as u32)
            .write_u32(size as u32)
            .write_u32(data_offset as u32)
            .write_u32(format)
            .write_u16(width)
            .write_u16(height)
            .write_u32(0)
            .write_u32(0)
            .write_u32(0);
    }
    w.pad_to(base);
    w.write_bytes(payload.as_slice());
    w.into_inner()
}

/// PCK with flags 0: `(offset, size)` pairs, then the members
pub fn flat_package(members: &[&[u8]]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_u32(members.len() as u32).write_u32(0).write_u32(0).write_u32(0);
    let mut offset = 16 + members.len() * 8;
    for member in members {
        w.write_u32(offset as u32).write_u32(member.len() as u32);
        offset += member.len();
    }
    for member in members {
        w.write_bytes(member);
    }
    w.into_inner()
}

/// PCK with flags 0x80: every pair followed by a null-terminated name
pub fn named_package(members: &[(&str, &[u8])]) -> Vec<u8> {
    let table: usize = members.iter().map(|(name, _)| 8 + name.len() + 1).sum();
    let mut w = ByteWriter::new();
    w.write_u32(members.len() as u32).write_u32(0x80).write_u32(0).write_u32(0);
    let mut offset = 16 + table;
    for (name, data) in members {
        w.write_u32(offset as u32).write_u32(data.len() as u32);
        w.write_bytes(name.as_bytes()).write_u8(0);
        offset += data.len();
    }
    for (_, data) in members {
        w.write_bytes(data);
    }
    w.into_inner()
}

/// Log output shared with a test subscriber
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with every event at DEBUG and above captured as plain text
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.contents())
}
