//! Benchmark and round-trip integrity harness.
//!
//! Every codec under test runs `encode` then `decode` on the same input and
//! the output is compared with the original. Failures are recorded per codec:
//! one broken codec never stops the others from being measured.
//!
//! # Concurrency
//!
//! Codecs share nothing but the read-only input, so with
//! [`HarnessConfig::parallel`] set they run on the rayon pool, one task per
//! codec.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::codec::{Algorithm, Codec};
use crate::error::Error;
use crate::metrics::{ratio, throughput};

/// Harness options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Evaluate codecs concurrently
    pub parallel: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Outcome for one codec.
#[derive(Debug)]
pub struct BenchmarkResult {
    pub algorithm: &'static str,
    pub original_size: usize,

    /// Container size; 0 if encoding failed
    pub compressed_size: usize,

    pub encode_time: Duration,
    pub decode_time: Duration,

    /// `decode(encode(x)) == x`
    pub integrity_ok: bool,

    /// Why the round trip failed, if it did
    pub error: Option<Error>,
}

impl BenchmarkResult {
    /// Compressed / original; 0.0 for empty input.
    pub fn compression_ratio(&self) -> f64 {
        ratio(self.original_size, self.compressed_size)
    }

    pub fn encode_throughput_bps(&self) -> f64 {
        throughput(self.original_size, self.encode_time)
    }

    pub fn decode_throughput_bps(&self) -> f64 {
        throughput(self.original_size, self.decode_time)
    }

    /// Encode plus decode time.
    pub fn elapsed(&self) -> Duration {
        self.encode_time + self.decode_time
    }
}

/// Benchmark built-in algorithms with the default configuration.
///
/// Duplicate entries in `algorithms` are evaluated once. Results follow the
/// order of first appearance.
pub fn benchmark(input: &[u8], algorithms: &[Algorithm]) -> Vec<BenchmarkResult> {
    let mut unique: Vec<Algorithm> = Vec::with_capacity(algorithms.len());
    for &algorithm in algorithms {
        if !unique.contains(&algorithm) {
            unique.push(algorithm);
        }
    }
    let codecs: Vec<&dyn Codec> = unique.iter().map(|a| a as &dyn Codec).collect();
    benchmark_with(input, &codecs, &HarnessConfig::default())
}

/// Benchmark arbitrary codecs. Results are in the order of `codecs`.
pub fn benchmark_with(
    input: &[u8],
    codecs: &[&dyn Codec],
    config: &HarnessConfig,
) -> Vec<BenchmarkResult> {
    log::info!(
        "benchmarking {} codec(s) on {} bytes ({})",
        codecs.len(),
        input.len(),
        if config.parallel { "parallel" } else { "sequential" }
    );

    if config.parallel {
        codecs.par_iter().map(|codec| run_one(*codec, input)).collect()
    } else {
        codecs.iter().map(|codec| run_one(*codec, input)).collect()
    }
}

fn run_one(codec: &dyn Codec, input: &[u8]) -> BenchmarkResult {
    let mut result = BenchmarkResult {
        algorithm: codec.name(),
        original_size: input.len(),
        compressed_size: 0,
        encode_time: Duration::ZERO,
        decode_time: Duration::ZERO,
        integrity_ok: false,
        error: None,
    };

    let start = Instant::now();
    let encoded = codec.encode(input);
    result.encode_time = start.elapsed();

    let container = match encoded {
        Ok(container) => container,
        Err(e) => {
            log::warn!("{}: encode failed: {e}", result.algorithm);
            result.error = Some(e);
            return result;
        }
    };
    result.compressed_size = container.len();

    let start = Instant::now();
    let decoded = codec.decode(&container);
    result.decode_time = start.elapsed();

    match decoded {
        Ok(output) if output == input => {
            result.integrity_ok = true;
            log::info!(
                "{}: {} -> {} bytes ({:.1}%), round trip ok",
                result.algorithm,
                result.original_size,
                result.compressed_size,
                result.compression_ratio() * 100.0
            );
        }
        Ok(output) => {
            let e = Error::IntegrityMismatch {
                algorithm: result.algorithm,
                expected_len: input.len(),
                actual_len: output.len(),
                first_difference: first_difference(input, &output),
            };
            log::warn!("{e}");
            result.error = Some(e);
        }
        Err(e) => {
            log::warn!("{}: decode failed: {e}", result.algorithm);
            result.error = Some(e);
        }
    }
    result
}

/// Index of the first differing byte, or the shorter length when one buffer
/// is a prefix of the other.
fn first_difference(expected: &[u8], actual: &[u8]) -> Option<usize> {
    expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))
}

/// The integrity-ok result with the lowest compression ratio.
pub fn best(results: &[BenchmarkResult]) -> Option<&BenchmarkResult> {
    results
        .iter()
        .filter(|r| r.integrity_ok)
        .min_by(|a, b| a.compressed_size.cmp(&b.compressed_size))
}

/// Render results as a fixed-width table.
pub fn summary_text(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>12} {:>12} {:>8} {:>10} {:>10} {:>9}",
        "algorithm", "original", "compressed", "ratio", "enc MB/s", "dec MB/s", "integrity"
    );
    for r in results {
        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>12} {:>7.1}% {:>10.2} {:>10.2} {:>9}",
            r.algorithm,
            r.original_size,
            r.compressed_size,
            r.compression_ratio() * 100.0,
            r.encode_throughput_bps() / 1_000_000.0,
            r.decode_throughput_bps() / 1_000_000.0,
            if r.integrity_ok { "ok" } else { "FAILED" }
        );
        if let Some(e) = &r.error {
            let _ = writeln!(out, "  error: {e}");
        }
    }
    if let Some(b) = best(results) {
        let _ = writeln!(out, "best: {} ({:.1}%)", b.algorithm, b.compression_ratio() * 100.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    /// Produces a valid container, then flips a payload bit.
    struct Corrupting(Algorithm);

    impl Codec for Corrupting {
        fn name(&self) -> &'static str {
            self.0.name()
        }

        fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
            let mut container = Codec::encode(&self.0, input)?;
            let last_payload = container.len() - 2;
            container[last_payload] ^= 0x10;
            Ok(container)
        }

        fn decode(&self, container: &[u8]) -> Result<Vec<u8>> {
            Codec::decode(&self.0, container)
        }
    }

    /// Round-trips cleanly but drops the final byte.
    struct Truncating;

    impl Codec for Truncating {
        fn name(&self) -> &'static str {
            "truncating"
        }

        fn encode(&self, input: &[u8]) -> Result<Vec<u8>> {
            Codec::encode(&Algorithm::Huffman, input)
        }

        fn decode(&self, container: &[u8]) -> Result<Vec<u8>> {
            let mut out = Codec::decode(&Algorithm::Huffman, container)?;
            out.pop();
            Ok(out)
        }
    }

    fn sample() -> Vec<u8> {
        b"she sells sea shells by the sea shore. ".repeat(50)
    }

    #[test]
    fn test_all_algorithms_pass() {
        let input = sample();
        let results = benchmark(&input, &Algorithm::ALL);
        assert_eq!(results.len(), 3);
        for (r, a) in results.iter().zip(Algorithm::ALL) {
            assert_eq!(r.algorithm, a.name());
            assert!(r.integrity_ok, "{} failed: {:?}", r.algorithm, r.error);
            assert!(r.error.is_none());
            assert!(r.compression_ratio() < 1.0);
        }
    }

    #[test]
    fn test_duplicates_evaluated_once() {
        let results = benchmark(b"abc", &[Algorithm::Lzw, Algorithm::Huffman, Algorithm::Lzw]);
        let names: Vec<_> = results.iter().map(|r| r.algorithm).collect();
        assert_eq!(names, vec!["lzw", "huffman"]);
    }

    #[test]
    fn test_corrupted_codec_isolated() {
        let input = sample();
        let corrupt = Corrupting(Algorithm::Arithmetic);
        let codecs: [&dyn Codec; 3] = [&Algorithm::Huffman, &Algorithm::Lzw, &corrupt];

        for parallel in [true, false] {
            let results = benchmark_with(&input, &codecs, &HarnessConfig { parallel });
            assert_eq!(results.len(), 3);
            assert!(results[0].integrity_ok);
            assert!(results[1].integrity_ok);
            assert!(!results[2].integrity_ok);
            assert_eq!(results[2].algorithm, "arithmetic");
            assert!(matches!(results[2].error, Some(Error::Crc { .. })));
        }
    }

    #[test]
    fn test_mismatch_recorded() {
        let input = sample();
        let codecs: [&dyn Codec; 2] = [&Truncating, &Algorithm::Lzw];
        let results = benchmark_with(&input, &codecs, &HarnessConfig::default());

        assert!(!results[0].integrity_ok);
        match &results[0].error {
            Some(Error::IntegrityMismatch {
                algorithm,
                expected_len,
                actual_len,
                first_difference,
            }) => {
                assert_eq!(*algorithm, "truncating");
                assert_eq!(*expected_len, input.len());
                assert_eq!(*actual_len, input.len() - 1);
                assert_eq!(*first_difference, Some(input.len() - 1));
            }
            other => panic!("expected IntegrityMismatch, got {other:?}"),
        }
        assert!(results[1].integrity_ok);
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference(b"abc", b"abc"), None);
        assert_eq!(first_difference(b"abc", b"abx"), Some(2));
        assert_eq!(first_difference(b"abc", b"ab"), Some(2));
        assert_eq!(first_difference(b"", b"a"), Some(0));
    }

    #[test]
    fn test_best_skips_failures() {
        let input = sample();
        let corrupt = Corrupting(Algorithm::Lzw);
        let codecs: [&dyn Codec; 2] = [&corrupt, &Algorithm::Huffman];
        let results = benchmark_with(&input, &codecs, &HarnessConfig::default());
        assert_eq!(best(&results).map(|r| r.algorithm), Some("huffman"));

        let text = summary_text(&results);
        assert!(text.contains("FAILED"));
        assert!(text.contains("best: huffman"));
    }

    #[test]
    fn test_empty_input() {
        let results = benchmark(b"", &Algorithm::ALL);
        assert!(results.iter().all(|r| r.integrity_ok));
        assert!(results.iter().all(|r| r.compression_ratio() == 0.0));
    }
}
