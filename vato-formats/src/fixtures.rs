//! In-memory container images for unit tests

use crate::cursor::ByteWriter;

/// Lays out an IMDL / IMTN image: header, sections, dictionary, then the
/// four data regions in header order
pub(crate) struct ContainerBuilder {
    magic: [u8; 4],
    section_count: u16,
    sections: ByteWriter,
    dictionary: ByteWriter,
    regions: [ByteWriter; 4],
}

impl ContainerBuilder {
    pub fn new(magic: [u8; 4]) -> Self {
        Self {
            magic,
            section_count: 0,
            sections: ByteWriter::new(),
            dictionary: ByteWriter::new(),
            regions: Default::default(),
        }
    }

    /// Add a string to the dictionary, returning its offset
    pub fn string(&mut self, s: &str) -> u32 {
        let offset = self.dictionary.position() as u32;
        self.dictionary.write_bytes(s.as_bytes()).write_u8(0);
        offset
    }

    /// Data region `1..=4` (region 0 is the dictionary)
    pub fn region(&mut self, index: usize) -> &mut ByteWriter {
        &mut self.regions[index - 1]
    }

    /// Add a record-array section
    pub fn section(&mut self, magic: [u8; 4], item_count: u32, records: impl FnOnce(&mut ByteWriter)) {
        let mut body = ByteWriter::new();
        body.write_u32(1).write_u32(item_count);
        records(&mut body);
        self.raw_section(magic, body.as_slice());
    }

    pub fn raw_section(&mut self, magic: [u8; 4], payload: &[u8]) {
        self.raw_section_with_size(magic, 8 + payload.len() as u32, payload);
    }

    pub fn raw_section_with_size(&mut self, magic: [u8; 4], size: u32, payload: &[u8]) {
        self.section_count += 1;
        self.sections
            .write_bytes(&magic)
            .write_u32(size)
            .write_bytes(payload);
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
        let align = |out: &mut ByteWriter| {
            let aligned = out.position().div_ceil(4) * 4;
            out.pad_to(aligned);
        };

        align(&mut out);
        offsets[0] = out.position() as u32;
        out.write_bytes(self.dictionary.as_slice());
        for (i, region) in self.regions.iter().enumerate() {
            align(&mut out);
            offsets[i + 1] = out.position() as u32;
            out.write_bytes(region.as_slice());
        }

        for (i, offset) in offsets.iter().enumerate() {
            out.patch_u32(table + i * 4, *offset);
        }
        out.into_inner()
    }
}
