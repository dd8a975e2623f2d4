//! Algorithm selection and the engine surface consumed by front ends.
//!
//! [`Algorithm`] is the closed set of codecs. Callers pick a variant once and
//! the variant dispatches to its codec; nothing inside the codecs branches on
//! algorithm names. The [`Codec`] trait is the seam the benchmark harness
//! drives, so it can also run codecs that aren't one of the built-in variants
//! (e.g. an LZW coder with the reset policy).

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::error::{Error, HeaderError, Result};
use crate::framing::Container;
use crate::lzw::LzwCoder;
use crate::metrics::CompressionStats;
use crate::{arithmetic, huffman};

/// Anything that turns bytes into a serialized container and back.
pub trait Codec: Send + Sync {
    /// Short lowercase name, e.g. "huffman".
    fn name(&self) -> &'static str;

    /// Compress `input` into serialized container bytes.
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Decompress serialized container bytes.
    fn decode(&self, container: &[u8]) -> Result<Vec<u8>>;
}

/// The built-in codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Huffman,
    Lzw,
    Arithmetic,
}

impl Algorithm {
    /// Every algorithm, in container-id order.
    pub const ALL: [Algorithm; 3] = [Algorithm::Huffman, Algorithm::Lzw, Algorithm::Arithmetic];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Huffman => "huffman",
            Algorithm::Lzw => "lzw",
            Algorithm::Arithmetic => "arithmetic",
        }
    }

    /// Id stored in the container header.
    pub fn id(self) -> u8 {
        match self {
            Algorithm::Huffman => 1,
            Algorithm::Lzw => 2,
            Algorithm::Arithmetic => 3,
        }
    }

    /// Look up an algorithm by container id.
    ///
    /// # Errors
    /// `Error::UnknownAlgorithm` for ids this build doesn't know.
    pub fn from_id(id: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.id() == id)
            .ok_or_else(|| Error::UnknownAlgorithm(format!("id {id}")))
    }

    /// Encode `input` into a container value.
    pub fn encode_container(self, input: &[u8]) -> Result<Container> {
        match self {
            Algorithm::Huffman => huffman::encode(input),
            Algorithm::Lzw => LzwCoder::default().encode(input),
            Algorithm::Arithmetic => arithmetic::encode(input),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

impl Codec for Algorithm {
    fn name(&self) -> &'static str {
        Algorithm::name(*self)
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(self.encode_container(input)?.to_bytes())
    }

    fn decode(&self, container: &[u8]) -> Result<Vec<u8>> {
        let container = Container::from_bytes(container)?;
        expect_algorithm(*self, &container)?;
        decode_container(&container)
    }
}

impl Codec for LzwCoder {
    fn name(&self) -> &'static str {
        Algorithm::Lzw.name()
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(LzwCoder::encode(self, input)?.to_bytes())
    }

    fn decode(&self, container: &[u8]) -> Result<Vec<u8>> {
        let container = Container::from_bytes(container)?;
        expect_algorithm(Algorithm::Lzw, &container)?;
        LzwCoder::decode(self, &container)
    }
}

fn expect_algorithm(requested: Algorithm, container: &Container) -> Result<()> {
    if container.algorithm != requested {
        return Err(HeaderError::AlgorithmMismatch {
            requested: requested.name(),
            found: container.algorithm.name(),
        }
        .into());
    }
    Ok(())
}

/// Decode a parsed container with whichever codec produced it.
pub fn decode_container(container: &Container) -> Result<Vec<u8>> {
    match container.algorithm {
        Algorithm::Huffman => huffman::decode(container),
        Algorithm::Lzw => LzwCoder::default().decode(container),
        Algorithm::Arithmetic => arithmetic::decode(container),
    }
}

/// Compress `input` and report size and timing.
pub fn compress(algorithm: Algorithm, input: &[u8]) -> Result<(Vec<u8>, CompressionStats)> {
    compress_with(&algorithm, input)
}

/// Compress with any codec, e.g. an [`LzwCoder`] with a non-default policy.
pub fn compress_with(codec: &dyn Codec, input: &[u8]) -> Result<(Vec<u8>, CompressionStats)> {
    let start = Instant::now();
    let container = codec.encode(input)?;
    let elapsed = start.elapsed();

    let stats = CompressionStats {
        algorithm: codec.name(),
        original_size: input.len(),
        compressed_size: container.len(),
        elapsed,
    };
    log::debug!("{}: {} -> {} bytes", stats.algorithm, stats.original_size, stats.compressed_size);
    Ok((container, stats))
}

/// Decompress a container that must have been produced by `algorithm`.
///
/// # Errors
/// - `Error::UnknownAlgorithm` if the container's algorithm id is unknown
/// - `HeaderError::AlgorithmMismatch` if it names a different algorithm
/// - any `CorruptHeader`, `Crc` or `BitIo` error from parsing and decoding
pub fn decompress(algorithm: Algorithm, container: &[u8]) -> Result<Vec<u8>> {
    algorithm.decode(container)
}

/// Decompress a container using the algorithm recorded in its header.
pub fn decompress_auto(container: &[u8]) -> Result<Vec<u8>> {
    decode_container(&Container::from_bytes(container)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lzw::DictionaryPolicy;

    #[test]
    fn test_name_and_id_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(Algorithm::from_id(algorithm.id()).unwrap(), algorithm);
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert_eq!(" LZW ".parse::<Algorithm>().unwrap(), Algorithm::Lzw);
    }

    #[test]
    fn test_unknown_algorithm() {
        assert!(matches!(Algorithm::from_id(0), Err(Error::UnknownAlgorithm(_))));
        assert!(matches!("zstd".parse::<Algorithm>(), Err(Error::UnknownAlgorithm(_))));
    }

    #[test]
    fn test_compress_decompress() {
        let input = b"compress me, compress me again";
        for algorithm in Algorithm::ALL {
            let (container, stats) = compress(algorithm, input).unwrap();
            assert_eq!(stats.compressed_size, container.len());
            assert_eq!(stats.original_size, input.len());
            assert_eq!(decompress(algorithm, &container).unwrap(), input);
            assert_eq!(decompress_auto(&container).unwrap(), input);
        }
    }

    #[test]
    fn test_algorithm_mismatch() {
        let (container, _) = compress(Algorithm::Huffman, b"abc").unwrap();
        let result = decompress(Algorithm::Arithmetic, &container);
        assert!(matches!(
            result,
            Err(Error::CorruptHeader(HeaderError::AlgorithmMismatch {
                requested: "arithmetic",
                found: "huffman"
            }))
        ));
    }

    #[test]
    fn test_lzw_coder_as_codec() {
        let coder = LzwCoder::new(DictionaryPolicy::Reset);
        let input = b"abababababababab".repeat(20);
        let container = Codec::encode(&coder, &input).unwrap();
        assert_eq!(decompress(Algorithm::Lzw, &container).unwrap(), input);
        assert_eq!(Codec::decode(&coder, &container).unwrap(), input);
    }
}
