//! Error types for VATO container parsing and decompression

/// Errors that can occur while reading a VATO container
///
/// Every variant carries enough position information (byte offset, record
/// index) to locate the problem in the source file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Leading magic does not belong to the expected container
    #[error("format mismatch: expected {expected}, found {found:02X?}")]
    FormatMismatch {
        expected: &'static str,
        found: [u8; 4],
    },

    /// A structured read ran past the end of the buffer
    #[error("unexpected end of data: wanted {wanted} bytes at offset 0x{offset:X}, {available} available")]
    UnexpectedEof {
        offset: usize,
        wanted: usize,
        available: usize,
    },

    /// The compressed stream ended in the middle of a token
    #[error("truncated compressed input at offset 0x{offset:X}")]
    TruncatedInput { offset: usize },

    /// A back-reference pointed before the start of the decompressed output
    #[error(
        "corrupt compressed stream at offset 0x{offset:X}: back-reference distance {distance} with {available} bytes of output"
    )]
    CorruptStream {
        offset: usize,
        distance: usize,
        available: usize,
    },

    /// Recognised container with a sub-variant this reader does not handle
    #[error("unsupported {what}: {value} (0x{value:X})")]
    UnsupportedVariant { what: &'static str, value: u32 },

    /// A section header declared a size that cannot hold its own header
    #[error("invalid size {size} for section '{magic}' at offset 0x{offset:X}")]
    InvalidSectionSize {
        magic: String,
        offset: usize,
        size: u32,
    },

    /// A record referenced another record that does not exist
    #[error("{what} index {index} out of range (have {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// A section required for conversion is absent
    #[error("missing '{0}' section")]
    MissingSection(&'static str),

    /// Declared child counts do not describe a single tree over all nodes
    #[error("malformed node hierarchy: child counts consume {consumed} of {declared} nodes")]
    MalformedHierarchy { consumed: usize, declared: usize },
}

/// Result alias used throughout vato-formats
pub type Result<T> = std::result::Result<T, FormatError>;

/// Render a 4-byte magic for diagnostics
pub(crate) fn magic_to_string(magic: &[u8; 4]) -> String {
    String::from_utf8_lossy(magic).into_owned()
}
