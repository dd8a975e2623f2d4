//! Entropy and redundancy analysis with a codec recommendation.
//!
//! The analyzer is advisory: it never encodes anything, it only measures the
//! buffer and applies [`RecommendationPolicy`] to pick an [`Algorithm`].
//!
//! # Recommendation rules
//!
//! Applied in order, first match wins:
//! 1. Empty input: LZW (smallest container).
//! 2. More than `small_alphabet` distinct symbols and a trigram repetition
//!    score of at least `repetition_threshold`: LZW.
//! 3. Huffman's average code length exceeds the entropy by at least
//!    `huffman_gap_threshold` bits per symbol: arithmetic.
//! 4. Otherwise: Huffman.

use std::collections::HashSet;

use crate::codec::Algorithm;
use crate::huffman;

/// Thresholds driving [`analyze_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationPolicy {
    /// Minimum repetition score for LZW
    pub repetition_threshold: f64,

    /// Minimum Huffman overhead (bits/symbol above entropy) for arithmetic
    pub huffman_gap_threshold: f64,

    /// Alphabets this small repeat trigrams regardless of structure, so the
    /// repetition rule is skipped for them
    pub small_alphabet: usize,

    /// Bytes examined by the repetition estimate
    pub sample_limit: usize,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            repetition_threshold: 0.5,
            huffman_gap_threshold: 0.05,
            small_alphabet: 16,
            sample_limit: 1024 * 1024,
        }
    }
}

/// Measurements for one buffer. Produced fresh per call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Input length in bytes
    pub len: usize,

    /// Byte-frequency histogram
    pub histogram: [u64; 256],

    /// Shannon entropy in bits per byte
    pub entropy: f64,

    /// Number of byte values that occur
    pub distinct_symbols: usize,

    /// Order-0 redundancy, `1 - entropy / 8`
    pub entropy_redundancy: f64,

    /// Repeated-pattern estimate in [0, 1]; see [`repetition_score`]
    pub redundancy_score: f64,

    /// Average Huffman code length in bits per byte
    pub huffman_average_length: f64,

    /// Whether the data looks like text
    pub is_text: bool,

    /// Recommended codec
    pub recommendation: Algorithm,

    /// Which rule produced the recommendation
    pub reason: &'static str,
}

impl AnalysisReport {
    /// Bits per symbol Huffman spends above the entropy bound.
    pub fn huffman_gap(&self) -> f64 {
        (self.huffman_average_length - self.entropy).max(0.0)
    }

    /// Export the report as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "len={}\n\
             entropy={:.4}\n\
             distinct_symbols={}\n\
             entropy_redundancy={:.4}\n\
             redundancy_score={:.4}\n\
             huffman_average_length={:.4}\n\
             is_text={}\n\
             recommendation={}\n\
             reason={}\n",
            self.len,
            self.entropy,
            self.distinct_symbols,
            self.entropy_redundancy,
            self.redundancy_score,
            self.huffman_average_length,
            self.is_text,
            self.recommendation,
            self.reason,
        )
    }

    /// Print a human-readable report to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Analysis ===");
        println!("Size: {} bytes ({})", self.len, if self.is_text { "text" } else { "binary" });
        println!("Entropy: {:.4} bits/byte", self.entropy);
        println!("Distinct symbols: {}", self.distinct_symbols);
        println!("Order-0 redundancy: {:.1}%", self.entropy_redundancy * 100.0);
        println!("Repetition score: {:.3}", self.redundancy_score);
        println!(
            "Huffman average: {:.4} bits/byte (+{:.4} over entropy)",
            self.huffman_average_length,
            self.huffman_gap()
        );
        println!("Recommendation: {} ({})", self.recommendation, self.reason);
    }
}

/// Byte-frequency histogram.
pub fn histogram(data: &[u8]) -> [u64; 256] {
    huffman::frequencies(data)
}

/// Shannon entropy of a histogram in bits per symbol; 0 when empty.
pub fn shannon_entropy(histogram: &[u64; 256]) -> f64 {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let count = count as f64;
            count / total * (total / count).log2()
        })
        .sum()
}

/// Fraction of trigrams that repeat an earlier trigram:
/// `1 - distinct / total` over the first `limit` bytes. 0 below 3 bytes.
pub fn repetition_score(data: &[u8], limit: usize) -> f64 {
    let sample = &data[..data.len().min(limit)];
    if sample.len() < 3 {
        return 0.0;
    }
    let total = sample.len() - 2;
    let distinct: HashSet<&[u8]> = sample.windows(3).collect();
    1.0 - distinct.len() as f64 / total as f64
}

/// No NUL bytes and more than 70% printable ASCII (tab, CR, LF included).
/// Empty input counts as text.
pub fn is_text(data: &[u8]) -> bool {
    if data.is_empty() {
        return true;
    }
    if data.contains(&0) {
        return false;
    }
    let printable = data
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r'))
        .count();
    printable as f64 / data.len() as f64 > 0.7
}

/// Analyze with the default policy.
pub fn analyze(data: &[u8]) -> AnalysisReport {
    analyze_with(data, &RecommendationPolicy::default())
}

/// Analyze `data` and recommend a codec under `policy`.
pub fn analyze_with(data: &[u8], policy: &RecommendationPolicy) -> AnalysisReport {
    let histogram = histogram(data);
    let entropy = shannon_entropy(&histogram);
    let distinct_symbols = histogram.iter().filter(|&&c| c > 0).count();
    let redundancy_score = repetition_score(data, policy.sample_limit);
    let huffman_average_length = huffman_average_length(&histogram);

    let (recommendation, reason) = if data.is_empty() {
        (Algorithm::Lzw, "empty input, smallest container")
    } else if distinct_symbols > policy.small_alphabet
        && redundancy_score >= policy.repetition_threshold
    {
        (Algorithm::Lzw, "repeated multi-byte patterns")
    } else if huffman_average_length - entropy >= policy.huffman_gap_threshold {
        (Algorithm::Arithmetic, "skewed distribution, whole-bit codes waste space")
    } else {
        (Algorithm::Huffman, "symbol frequencies fit whole-bit codes")
    };

    log::debug!(
        "analyzed {} bytes: H={entropy:.4}, repetition={redundancy_score:.3} -> {recommendation}",
        data.len()
    );

    AnalysisReport {
        len: data.len(),
        histogram,
        entropy,
        distinct_symbols,
        entropy_redundancy: 1.0 - entropy / 8.0,
        redundancy_score,
        huffman_average_length,
        is_text: is_text(data),
        recommendation,
        reason,
    }
}

fn huffman_average_length(histogram: &[u64; 256]) -> f64 {
    huffman::Codebook::from_frequencies(histogram)
        .map(|book| book.average_length(histogram))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_over(alphabet: &[u8], len: usize, seed: u64) -> Vec<u8> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect()
    }

    #[test]
    fn test_entropy_known_values() {
        assert_eq!(shannon_entropy(&histogram(b"")), 0.0);
        assert_eq!(shannon_entropy(&histogram(b"aaaa")), 0.0);
        assert!((shannon_entropy(&histogram(b"abab")) - 1.0).abs() < 1e-12);

        let all: Vec<u8> = (0..=255).collect();
        assert!((shannon_entropy(&histogram(&all)) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_repetition_score() {
        assert_eq!(repetition_score(b"ab", usize::MAX), 0.0);
        assert_eq!(repetition_score(b"abcdef", usize::MAX), 0.0);

        // 998 trigrams, all "aaa"
        let score = repetition_score(&[b'a'; 1000], usize::MAX);
        assert!((score - (1.0 - 1.0 / 998.0)).abs() < 1e-12);

        // Limit restricts the sample
        let mut data = vec![b'a'; 10];
        data.extend(0u8..=255);
        assert!(repetition_score(&data, 10) > 0.8);
    }

    #[test]
    fn test_is_text() {
        assert!(is_text(b""));
        assert!(is_text(b"Hello, world!\r\n\tindented"));
        assert!(!is_text(b"text with a \0 byte"));
        assert!(!is_text(&[0x80, 0x81, 0x82, b'a']));
    }

    #[test]
    fn test_empty_input() {
        let report = analyze(b"");
        assert_eq!(report.len, 0);
        assert_eq!(report.entropy, 0.0);
        assert_eq!(report.distinct_symbols, 0);
        assert_eq!(report.huffman_average_length, 0.0);
        assert_eq!(report.recommendation, Algorithm::Lzw);
    }

    #[test]
    fn test_single_repeated_byte() {
        let report = analyze(&[b'z'; 1000]);
        assert_eq!(report.entropy, 0.0);
        assert_eq!(report.entropy_redundancy, 1.0);
        assert_eq!(report.huffman_average_length, 1.0);
        assert_eq!(report.histogram[b'z' as usize], 1000);
        // One symbol: Huffman pays a full bit per byte
        assert_eq!(report.recommendation, Algorithm::Arithmetic);
    }

    #[test]
    fn test_repetitive_text_prefers_lzw() {
        let text = "The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs. "
            .repeat(40);
        let report = analyze(text.as_bytes());
        assert!(report.is_text);
        assert!(report.distinct_symbols > 16);
        assert!(report.redundancy_score > 0.9);
        assert_eq!(report.recommendation, Algorithm::Lzw);
    }

    #[test]
    fn test_random_bytes_prefer_huffman() {
        let alphabet: Vec<u8> = (0..=255).collect();
        let data = random_over(&alphabet, 64 * 1024, 7);
        let report = analyze(&data);
        assert!(report.entropy > 7.9);
        assert!(report.redundancy_score < 0.1);
        assert!(report.huffman_gap() < 0.05);
        assert_eq!(report.recommendation, Algorithm::Huffman);
    }

    #[test]
    fn test_power_of_two_alphabet_prefers_huffman() {
        let data = random_over(b"ACGT", 20_000, 11);
        let report = analyze(&data);
        assert_eq!(report.distinct_symbols, 4);
        assert_eq!(report.huffman_average_length, 2.0);
        assert_eq!(report.recommendation, Algorithm::Huffman);
    }

    #[test]
    fn test_average_length_matches_encoded_size() {
        let data = b"abracadabra";
        let report = analyze(data);
        let container = huffman::encode(data).unwrap();
        let bits = container.payload_bit_len() as f64;
        assert!((report.huffman_average_length - bits / data.len() as f64).abs() < 1e-12);
    }

    #[test]
    fn test_three_symbol_alphabet_prefers_arithmetic() {
        let data = random_over(b"xyz", 30_000, 3);
        let report = analyze(&data);
        // log2(3) ~ 1.585 vs. Huffman's 5/3
        assert!((report.entropy - 3f64.log2()).abs() < 0.01);
        assert!(report.huffman_gap() > 0.05);
        assert_eq!(report.recommendation, Algorithm::Arithmetic);
    }

    #[test]
    fn test_policy_is_tunable() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789".repeat(20);
        let strict = RecommendationPolicy {
            repetition_threshold: 1.0,
            ..RecommendationPolicy::default()
        };
        assert_eq!(analyze(text.as_bytes()).recommendation, Algorithm::Lzw);
        assert_ne!(analyze_with(text.as_bytes(), &strict).recommendation, Algorithm::Lzw);
    }

    #[test]
    fn test_export_text() {
        let text = analyze(b"abracadabra").export_text();
        assert!(text.contains("len=11"));
        assert!(text.contains("distinct_symbols=5"));
        assert!(text.contains("recommendation="));
    }
}
