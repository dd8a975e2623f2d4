//! codec-lab-core: lossless compression codecs with entropy analysis
//!
//! This library provides the core components of a compression workbench that:
//! - Compresses data with canonical Huffman, 12-bit LZW or arithmetic coding
//! - Wraps every codec's output in one self-describing, CRC-checked container
//! - Measures entropy and redundancy and recommends a codec
//! - Benchmarks codecs side by side and verifies round-trip integrity
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `bitio`: Low-level bit reading/writing
//! - `huffman`: Canonical, length-limited Huffman codec
//! - `lzw`: Fixed-width LZW codec with a bounded dictionary
//! - `arithmetic`: Static-model arithmetic codec
//! - `framing`: Container serialization
//! - `codec`: Algorithm selection and the compress/decompress surface
//! - `analysis`: Entropy/redundancy analyzer
//! - `harness`: Benchmark and integrity harness
//! - `metrics`: Compression statistics
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Bounded memory**: Code tables, dictionaries and models have fixed limits
//! - **Deterministic**: Identical input always yields identical containers
//! - **Observable**: Codec decisions and harness outcomes go through `log`
//!
//! # Example
//!
//! ```
//! use codec_lab_core::{compress, decompress, Algorithm};
//!
//! let input = b"to be or not to be, that is the question";
//! let (container, stats) = compress(Algorithm::Huffman, input).unwrap();
//! assert_eq!(stats.original_size, input.len());
//! assert_eq!(decompress(Algorithm::Huffman, &container).unwrap(), input);
//! ```

pub mod analysis;
pub mod arithmetic;
pub mod bitio;
pub mod codec;
pub mod error;
pub mod framing;
pub mod harness;
pub mod huffman;
pub mod lzw;
pub mod metrics;

// Re-export commonly used types
pub use analysis::{analyze, AnalysisReport, RecommendationPolicy};
pub use codec::{compress, compress_with, decompress, decompress_auto, Algorithm, Codec};
pub use error::{Error, Result};
pub use framing::Container;
pub use harness::{benchmark, BenchmarkResult, HarnessConfig};
pub use lzw::{DictionaryPolicy, LzwCoder};
pub use metrics::CompressionStats;
