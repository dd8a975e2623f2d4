//! Error types for the codec engine.
//!
//! All operations return structured errors rather than panicking. Decode
//! failures carry enough context (bit offset, declared vs. observed length)
//! to tell where a container went wrong.

use thiserror::Error;

/// Top-level error type for all codec, analysis and harness operations.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: reading past the end of a bit stream
/// - Header: malformed or inconsistent container metadata (any codec)
/// - Algorithm: unrecognized algorithm id or name
/// - LZW dictionary and arithmetic precision failures
/// - Integrity: round-trip mismatch detected by the harness
/// - CRC: container bytes changed after encoding
#[derive(Debug, Error)]
pub enum Error {
    /// Bit stream operation failed (e.g., reading past end of buffer)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Container header or codec metadata is malformed
    #[error("corrupt header: {0}")]
    CorruptHeader(#[from] HeaderError),

    /// Algorithm id (from a container) or name (from a caller) is not known
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// LZW dictionary was asked to grow past its 12-bit code space
    #[error("LZW dictionary overflow: {entries} entries, maximum {max}")]
    DictionaryOverflow { entries: usize, max: usize },

    /// Arithmetic coder interval collapsed to zero width
    #[error("arithmetic interval collapsed at symbol {symbol_index}")]
    PrecisionUnderflow { symbol_index: usize },

    /// Round-trip output differs from the original input
    #[error(
        "{algorithm}: round-trip mismatch (expected {expected_len} bytes, got {actual_len}, first difference at {first_difference:?})"
    )]
    IntegrityMismatch {
        algorithm: &'static str,
        expected_len: usize,
        actual_len: usize,
        first_difference: Option<usize>,
    },

    /// CRC validation failed, indicating data corruption
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read more bits than the stream holds
    #[error("out of bounds: requested {requested} bits at bit {position}, {available} available")]
    OutOfBounds {
        requested: usize,
        available: usize,
        position: usize,
    },

    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Container and codec metadata errors (the corrupt-header family).
#[derive(Debug, Error)]
pub enum HeaderError {
    /// Invalid magic number in header
    #[error("invalid magic number: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Container was written by an unknown format version
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u8),

    /// Container is too short to contain a valid header
    #[error("container too short: need at least {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    /// Declared section sizes don't add up to the container size
    #[error("container size mismatch: header declares {declared} bytes, got {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    /// Metadata block has the wrong length for its algorithm
    #[error("{algorithm} metadata length mismatch: expected {expected}, got {actual}")]
    MetadataLength {
        algorithm: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Trailing pad count is impossible for the payload
    #[error("invalid pad bit count {pad_bits} for {payload_len}-byte payload")]
    InvalidPadBits { pad_bits: u8, payload_len: usize },

    /// Caller asked for one algorithm but the container holds another
    #[error("algorithm mismatch: requested {requested}, container holds {found}")]
    AlgorithmMismatch {
        requested: &'static str,
        found: &'static str,
    },

    /// Huffman code lengths do not describe a valid prefix code
    #[error("invalid huffman code lengths: {reason}")]
    InvalidCodeLengths { reason: String },

    /// Huffman payload holds a bit pattern with no code assigned
    #[error("invalid huffman code at bit position {position}")]
    InvalidHuffmanCode { position: usize },

    /// LZW code references a dictionary entry that cannot exist yet
    #[error("invalid LZW code {code} at code index {index} (dictionary size {dictionary_size})")]
    InvalidLzwCode {
        code: u16,
        index: usize,
        dictionary_size: usize,
    },

    /// LZW metadata names a code width this decoder doesn't speak
    #[error("unsupported LZW code width {0}")]
    UnsupportedCodeWidth(u8),

    /// LZW metadata names an unknown dictionary policy
    #[error("unknown LZW dictionary policy {0}")]
    UnknownLzwPolicy(u8),

    /// LZW payload bit count is not a whole number of codes
    #[error("LZW payload of {bits} bits is not a multiple of {width}")]
    RaggedLzwPayload { bits: usize, width: usize },

    /// Arithmetic model snapshot is inconsistent
    #[error("invalid frequency table: {reason}")]
    InvalidFrequencyTable { reason: String },

    /// Arithmetic payload decoded to a value outside the model
    #[error("arithmetic payload out of model range at symbol {symbol_index}")]
    ArithmeticOutOfRange { symbol_index: usize },

    /// Decoded length doesn't match the header's original length
    #[error("decoded length mismatch: header says {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
