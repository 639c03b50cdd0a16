//! Seekable, length-bounded byte reader and a matching little-endian writer
//!
//! Every VATO container is read fully into memory before parsing, so the
//! reader works over a borrowed slice and hands out sub-slices without
//! copying. All multi-byte values are little-endian.

use crate::error::{FormatError, Result};

/// Cursor over an in-memory buffer
///
/// Reads either return exactly the requested bytes or fail with
/// [`FormatError::UnexpectedEof`]; the position is left unchanged on failure.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a cursor positioned at `offset`
    pub fn at(data: &'a [u8], offset: usize) -> Result<Self> {
        let mut cursor = Self::new(data);
        cursor.seek(offset)?;
        Ok(cursor)
    }

    /// Underlying buffer
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Move to an absolute offset (the end of the buffer is a valid position)
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(self.eof(offset, 0));
        }
        self.pos = offset;
        Ok(())
    }

    /// Advance by `count` bytes
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Borrow the next `count` bytes and advance past them
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| self.eof(self.pos, count))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read `N` consecutive f32 values (vectors, matrices)
    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        // Bounds-check the whole run up front so a short read leaves the
        // cursor where it was.
        let bytes = self.read_bytes(N * 4)?;
        let mut out = [0.0f32; N];
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(out)
    }

    /// Read `count` u16 values
    pub fn read_u16_vec(&mut self, count: usize) -> Result<Vec<u16>> {
        let bytes = self.read_bytes(self.checked_len(count, 2)?)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect())
    }

    /// Read `count` fixed-width f32 vectors
    pub fn read_f32_vecs<const N: usize>(&mut self, count: usize) -> Result<Vec<[f32; N]>> {
        self.checked_len(count, N * 4)
            .and_then(|len| self.ensure(len))?;
        (0..count).map(|_| self.read_f32_array::<N>()).collect()
    }

    /// Read `count` fixed-width byte vectors
    pub fn read_u8_vecs<const N: usize>(&mut self, count: usize) -> Result<Vec<[u8; N]>> {
        self.checked_len(count, N)
            .and_then(|len| self.ensure(len))?;
        (0..count).map(|_| self.read_array::<N>()).collect()
    }

    fn ensure(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(self.eof(self.pos, len));
        }
        Ok(())
    }

    fn checked_len(&self, count: usize, width: usize) -> Result<usize> {
        count
            .checked_mul(width)
            .ok_or_else(|| self.eof(self.pos, usize::MAX))
    }

    fn eof(&self, offset: usize, wanted: usize) -> FormatError {
        FormatError::UnexpectedEof {
            offset,
            wanted,
            available: self.data.len().saturating_sub(offset),
        }
    }
}

/// Little-endian byte writer
///
/// Used to lay out interleaved vertex streams and to build container images
/// in tests.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f32s(&mut self, values: &[f32]) -> &mut Self {
        for v in values {
            self.write_f32(*v);
        }
        self
    }

    /// Zero-fill up to an absolute position (no-op when already past it)
    pub fn pad_to(&mut self, position: usize) -> &mut Self {
        if self.buf.len() < position {
            self.buf.resize(position, 0);
        }
        self
    }

    /// Overwrite a previously written u32 (back-patching offsets and sizes)
    pub fn patch_u32(&mut self, position: usize, value: u32) {
        self.buf[position..position + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x80, 0x3F];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u16().unwrap(), 0x0201);
        assert_eq!(cursor.read_u16().unwrap(), 0x0403);
        assert_eq!(cursor.read_f32().unwrap(), 1.0);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_short_read_keeps_position() {
        let data = [1, 2, 3];
        let mut cursor = ByteCursor::new(&data);
        cursor.read_u8().unwrap();
        let err = cursor.read_u32().unwrap_err();
        assert_eq!(
            err,
            FormatError::UnexpectedEof {
                offset: 1,
                wanted: 4,
                available: 2
            }
        );
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 8];
        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.seek(8).is_ok());
        assert!(cursor.seek(9).is_err());
        assert!(ByteCursor::at(&data, 4).unwrap().read_u32().is_ok());
    }

    #[test]
    fn test_vector_reads() {
        let mut w = ByteWriter::new();
        w.write_f32s(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        w.write_u16(7).write_u16(8);
        let data = w.into_inner();

        let mut cursor = ByteCursor::new(&data);
        let vecs = cursor.read_f32_vecs::<3>(2).unwrap();
        assert_eq!(vecs, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(cursor.read_u16_vec(2).unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_vector_read_too_long_fails_up_front() {
        let data = [0u8; 10];
        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.read_f32_vecs::<3>(1).is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_writer_patch_and_pad() {
        let mut w = ByteWriter::new();
        w.write_u32(0).write_u8(9);
        w.pad_to(8);
        w.patch_u32(0, 0xDEADBEEF);
        assert_eq!(w.position(), 8);
        assert_eq!(&w.as_slice()[..4], &0xDEADBEEFu32.to_le_bytes());
        assert_eq!(w.as_slice()[4], 9);
    }
}
