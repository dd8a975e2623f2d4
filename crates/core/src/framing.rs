//! Compressed container serialization and parsing.
//!
//! Every codec produces the same self-describing envelope:
//! - Header: identifies the format version and algorithm, records lengths
//!   and a CRC
//! - Codec metadata: Huffman code lengths, LZW parameters, or the arithmetic
//!   model snapshot
//! - Payload: bit-packed codec output
//! - Trailer: number of zero pad bits at the end of the payload
//!
//! # Container Format
//!
//! ```text
//! +--------------------+
//! | Magic (4 bytes)    |  0x43 0x4C 0x41 0x42 ("CLAB")
//! +--------------------+
//! | version (1)        |  format version, currently 1
//! +--------------------+
//! | algorithm (1)      |  1 = huffman, 2 = lzw, 3 = arithmetic
//! +--------------------+
//! | original_len (8)   |  u64 little-endian uncompressed size
//! +--------------------+
//! | meta_len (4)       |  u32 length of codec metadata
//! +--------------------+
//! | payload_len (8)    |  u64 length of bit-packed payload
//! +--------------------+
//! | crc32 (4)          |  u32 checksum of everything after the magic
//! +--------------------+
//! | codec_metadata     |  meta_len bytes
//! +--------------------+
//! | payload            |  payload_len bytes
//! +--------------------+
//! | pad_bits (1)       |  zero bits padding the last payload byte (0-7)
//! +--------------------+
//! ```
//!
//! # CRC Coverage
//!
//! The CRC32 covers version, algorithm, original_len, meta_len, payload_len,
//! the metadata, the payload and the pad-bit trailer.

use crate::codec::Algorithm;
use crate::error::{Error, HeaderError, Result};

/// Magic number for containers: "CLAB"
pub const MAGIC: [u8; 4] = *b"CLAB";

/// Container format version written by this crate
pub const VERSION: u8 = 1;

/// Size of the fixed container header in bytes
pub const HEADER_SIZE: usize = 30;

/// Size of the trailer (pad-bit count)
const TRAILER_SIZE: usize = 1;

/// A parsed (or freshly encoded) compressed container.
///
/// Built once per encode call and consumed once per decode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Codec that produced the payload
    pub algorithm: Algorithm,

    /// Original uncompressed data length
    pub original_len: usize,

    /// Algorithm-specific metadata block
    pub metadata: Vec<u8>,

    /// Bit-packed payload
    pub payload: Vec<u8>,

    /// Zero bits padding the final payload byte
    pub pad_bits: u8,
}

impl Container {
    /// Number of meaningful bits in the payload.
    pub fn payload_bit_len(&self) -> usize {
        (self.payload.len() * 8).saturating_sub(self.pad_bits as usize)
    }

    /// Total serialized size in bytes.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.metadata.len() + self.payload.len() + TRAILER_SIZE
    }

    /// Serialize the container.
    pub fn to_bytes(&self) -> Vec<u8> {
        let version = VERSION;
        let algorithm = self.algorithm.id();
        let original_len = self.original_len as u64;
        let meta_len = self.metadata.len() as u32;
        let payload_len = self.payload.len() as u64;

        let crc32 = compute_crc(
            version,
            algorithm,
            original_len,
            meta_len,
            payload_len,
            &self.metadata,
            &self.payload,
            self.pad_bits,
        );

        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&MAGIC);
        out.push(version);
        out.push(algorithm);
        out.extend_from_slice(&original_len.to_le_bytes());
        out.extend_from_slice(&meta_len.to_le_bytes());
        out.extend_from_slice(&payload_len.to_le_bytes());
        out.extend_from_slice(&crc32.to_le_bytes());
        out.extend_from_slice(&self.metadata);
        out.extend_from_slice(&self.payload);
        out.push(self.pad_bits);
        out
    }

    /// Parse a container from bytes.
    ///
    /// # Errors
    /// - `HeaderError::TooShort` if the buffer can't hold a header
    /// - `HeaderError::InvalidMagic` / `UnsupportedVersion` for foreign data
    /// - `Error::UnknownAlgorithm` for an unrecognized algorithm id
    /// - `HeaderError::SizeMismatch` if declared lengths don't match
    /// - `Error::Crc` if the checksum fails
    /// - `HeaderError::InvalidPadBits` for an impossible trailer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = parse_header(bytes)?;

        let meta_len = usize::try_from(header.meta_len).map_err(|_| size_mismatch(bytes))?;
        let payload_len = usize::try_from(header.payload_len).map_err(|_| size_mismatch(bytes))?;
        let declared = HEADER_SIZE
            .checked_add(meta_len)
            .and_then(|n| n.checked_add(payload_len))
            .and_then(|n| n.checked_add(TRAILER_SIZE))
            .ok_or_else(|| size_mismatch(bytes))?;
        if bytes.len() != declared {
            return Err(HeaderError::SizeMismatch {
                declared,
                actual: bytes.len(),
            }
            .into());
        }

        let meta_start = HEADER_SIZE;
        let payload_start = meta_start + meta_len;
        let payload_end = payload_start + payload_len;

        let metadata = &bytes[meta_start..payload_start];
        let payload = &bytes[payload_start..payload_end];
        let pad_bits = bytes[payload_end];

        let computed = compute_crc(
            header.version,
            header.algorithm_id,
            header.original_len,
            header.meta_len,
            header.payload_len,
            metadata,
            payload,
            pad_bits,
        );
        if computed != header.crc32 {
            return Err(Error::Crc {
                expected: header.crc32,
                actual: computed,
            });
        }

        if pad_bits > 7 || (payload.is_empty() && pad_bits != 0) {
            return Err(HeaderError::InvalidPadBits {
                pad_bits,
                payload_len: payload.len(),
            }
            .into());
        }

        let original_len = usize::try_from(header.original_len).map_err(|_| size_mismatch(bytes))?;

        Ok(Container {
            algorithm: header.algorithm,
            original_len,
            metadata: metadata.to_vec(),
            payload: payload.to_vec(),
            pad_bits,
        })
    }
}

/// Read only the algorithm from a serialized container.
///
/// Validates magic and version but not the CRC.
pub fn peek_algorithm(bytes: &[u8]) -> Result<Algorithm> {
    Ok(parse_header(bytes)?.algorithm)
}

struct Header {
    version: u8,
    algorithm_id: u8,
    algorithm: Algorithm,
    original_len: u64,
    meta_len: u32,
    payload_len: u64,
    crc32: u32,
}

fn parse_header(bytes: &[u8]) -> Result<Header> {
    if bytes.len() < HEADER_SIZE + TRAILER_SIZE {
        return Err(HeaderError::TooShort {
            required: HEADER_SIZE + TRAILER_SIZE,
            actual: bytes.len(),
        }
        .into());
    }

    let magic = read_array::<4>(bytes, 0);
    if magic != MAGIC {
        return Err(HeaderError::InvalidMagic {
            expected: MAGIC,
            actual: magic,
        }
        .into());
    }

    let version = bytes[4];
    if version != VERSION {
        return Err(HeaderError::UnsupportedVersion(version).into());
    }

    let algorithm_id = bytes[5];
    let algorithm = Algorithm::from_id(algorithm_id)?;

    Ok(Header {
        version,
        algorithm_id,
        algorithm,
        original_len: u64::from_le_bytes(read_array(bytes, 6)),
        meta_len: u32::from_le_bytes(read_array(bytes, 14)),
        payload_len: u64::from_le_bytes(read_array(bytes, 18)),
        crc32: u32::from_le_bytes(read_array(bytes, 26)),
    })
}

/// Copy `N` bytes starting at `offset`; caller has checked the bounds.
fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

fn size_mismatch(bytes: &[u8]) -> Error {
    HeaderError::SizeMismatch {
        declared: usize::MAX,
        actual: bytes.len(),
    }
    .into()
}

/// Compute CRC32 over the protected fields.
#[allow(clippy::too_many_arguments)]
fn compute_crc(
    version: u8,
    algorithm: u8,
    original_len: u64,
    meta_len: u32,
    payload_len: u64,
    metadata: &[u8],
    payload: &[u8],
    pad_bits: u8,
) -> u32 {
    let mut hasher = crc32fast::Hasher::new();

    hasher.update(&[version, algorithm]);
    hasher.update(&original_len.to_le_bytes());
    hasher.update(&meta_len.to_le_bytes());
    hasher.update(&payload_len.to_le_bytes());

    hasher.update(metadata);
    hasher.update(payload);
    hasher.update(&[pad_bits]);

    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Container {
        Container {
            algorithm: Algorithm::Lzw,
            original_len: 42,
            metadata: vec![12, 0],
            payload: vec![0xDE, 0xAD, 0xB0],
            pad_bits: 4,
        }
    }

    #[test]
    fn test_serialize_parse_round_trip() {
        let container = sample();
        let bytes = container.to_bytes();
        assert_eq!(bytes.len(), container.encoded_len());
        assert_eq!(&bytes[..4], b"CLAB");

        let parsed = Container::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, container);
        assert_eq!(parsed.payload_bit_len(), 20);
    }

    #[test]
    fn test_peek_algorithm() {
        let bytes = sample().to_bytes();
        assert_eq!(peek_algorithm(&bytes).unwrap(), Algorithm::Lzw);
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = sample().to_bytes();
        bytes[0] = 0xFF;

        let result = Container::from_bytes(&bytes);
        assert!(matches!(
            result,
            Err(Error::CorruptHeader(HeaderError::InvalidMagic { .. }))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = sample().to_bytes();
        bytes[4] = 9;

        let result = Container::from_bytes(&bytes);
        assert!(matches!(
            result,
            Err(Error::CorruptHeader(HeaderError::UnsupportedVersion(9)))
        ));
    }

    #[test]
    fn test_unknown_algorithm_id() {
        let mut bytes = sample().to_bytes();
        bytes[5] = 0x7F;

        let result = Container::from_bytes(&bytes);
        assert!(matches!(result, Err(Error::UnknownAlgorithm(_))));
    }

    #[test]
    fn test_container_too_short() {
        let result = Container::from_bytes(&[0u8; 10]);
        assert!(matches!(
            result,
            Err(Error::CorruptHeader(HeaderError::TooShort { .. }))
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = sample().to_bytes();
        bytes.truncate(bytes.len() - 2);

        let result = Container::from_bytes(&bytes);
        assert!(matches!(
            result,
            Err(Error::CorruptHeader(HeaderError::SizeMismatch { .. }))
        ));
    }

    #[test]
    fn test_crc_mismatch() {
        let mut bytes = sample().to_bytes();
        let payload_byte = HEADER_SIZE + 2;
        bytes[payload_byte] ^= 0x01;

        let result = Container::from_bytes(&bytes);
        assert!(matches!(result, Err(Error::Crc { .. })));
    }

    #[test]
    fn test_invalid_pad_bits() {
        let mut container = sample();
        container.pad_bits = 8;
        let result = Container::from_bytes(&container.to_bytes());
        assert!(matches!(
            result,
            Err(Error::CorruptHeader(HeaderError::InvalidPadBits { pad_bits: 8, .. }))
        ));

        container.payload.clear();
        container.pad_bits = 1;
        let result = Container::from_bytes(&container.to_bytes());
        assert!(matches!(
            result,
            Err(Error::CorruptHeader(HeaderError::InvalidPadBits { .. }))
        ));
    }
}
