//! Size and timing statistics for a single compression run.
//!
//! # Design
//!
//! Stats are plain values produced by [`crate::compress`] and the benchmark
//! harness. Derived figures (ratio, savings, throughput) are computed on
//! demand, so a stats value never goes stale.

use std::time::Duration;

/// Statistics for compressing one input with one algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionStats {
    /// Algorithm name
    pub algorithm: &'static str,

    /// Uncompressed input size in bytes
    pub original_size: usize,

    /// Serialized container size in bytes (header included)
    pub compressed_size: usize,

    /// Wall-clock time spent encoding
    pub elapsed: Duration,
}

impl CompressionStats {
    /// Compute compression ratio (compressed / original).
    ///
    /// Returns 0.0 if the input was empty.
    pub fn compression_ratio(&self) -> f64 {
        ratio(self.original_size, self.compressed_size)
    }

    /// Bytes saved; negative when the container outgrew the input.
    pub fn space_saved(&self) -> i64 {
        self.original_size as i64 - self.compressed_size as i64
    }

    /// Space saved as a percentage of the original size.
    pub fn space_saved_percent(&self) -> f64 {
        if self.original_size == 0 {
            0.0
        } else {
            self.space_saved() as f64 / self.original_size as f64 * 100.0
        }
    }

    /// Compute encode throughput in bytes/second of input.
    pub fn throughput_bps(&self) -> f64 {
        throughput(self.original_size, self.elapsed)
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Compression Summary ({}) ===", self.algorithm);
        println!("Original:   {} bytes", self.original_size);
        println!("Compressed: {} bytes", self.compressed_size);
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!("Saved: {} bytes ({:.1}%)", self.space_saved(), self.space_saved_percent());
        println!("Time: {:.3} ms", self.elapsed.as_secs_f64() * 1000.0);
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
    }

    /// Export stats as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "algorithm={}\n\
             original_size={}\n\
             compressed_size={}\n\
             compression_ratio={:.4}\n\
             space_saved={}\n\
             elapsed_us={}\n",
            self.algorithm,
            self.original_size,
            self.compressed_size,
            self.compression_ratio(),
            self.space_saved(),
            self.elapsed.as_micros(),
        )
    }
}

/// compressed / original, or 0.0 for empty input.
pub(crate) fn ratio(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        0.0
    } else {
        compressed as f64 / original as f64
    }
}

/// Bytes per second, or 0.0 when no measurable time passed.
pub(crate) fn throughput(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        0.0
    } else {
        bytes as f64 / secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(original: usize, compressed: usize) -> CompressionStats {
        CompressionStats {
            algorithm: "huffman",
            original_size: original,
            compressed_size: compressed,
            elapsed: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_compression_ratio() {
        assert_eq!(stats(1000, 750).compression_ratio(), 0.75);
        assert_eq!(stats(0, 31).compression_ratio(), 0.0);
    }

    #[test]
    fn test_space_saved() {
        let s = stats(1000, 750);
        assert_eq!(s.space_saved(), 250);
        assert_eq!(s.space_saved_percent(), 25.0);

        // Tiny inputs grow because of the header
        let s = stats(3, 35);
        assert_eq!(s.space_saved(), -32);
        assert!(s.space_saved_percent() < 0.0);
    }

    #[test]
    fn test_throughput() {
        let s = stats(1_000_000, 10);
        assert!((s.throughput_bps() - 100_000_000.0).abs() < 1.0);

        let mut s = stats(100, 10);
        s.elapsed = Duration::ZERO;
        assert_eq!(s.throughput_bps(), 0.0);
    }

    #[test]
    fn test_export_text() {
        let text = stats(1000, 750).export_text();
        assert!(text.contains("algorithm=huffman"));
        assert!(text.contains("original_size=1000"));
        assert!(text.contains("compressed_size=750"));
        assert!(text.contains("compression_ratio=0.7500"));
        assert!(text.contains("elapsed_us=10000"));
    }
}
