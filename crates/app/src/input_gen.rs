//! Sample data generation for benchmarking.
//!
//! When no input file is given, we generate a buffer that exercises every
//! codec differently.
//!
//! # Design
//!
//! Generated data is a sequence of 8 KiB sections, each one of:
//! - Runs of a single byte (LZW and arithmetic shine)
//! - Word-based text (LZW picks up repeated words)
//! - Short repeating patterns
//! - Skewed byte distributions (arithmetic beats whole-bit Huffman codes)
//! - Uniform random bytes (nobody compresses these)

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SECTION_BYTES: usize = 8192;

const WORDS: &[&str] = &[
    "the", "of", "and", "to", "in", "codec", "entropy", "symbol", "table", "stream", "bit",
    "dictionary", "interval", "frequency", "length", "prefix", "header", "payload", "model",
    "tree", "code", "byte", "buffer", "encode", "decode",
];

/// Generate a sample buffer with mixed compressibility.
///
/// The same `seed` and `size_bytes` always produce the same bytes.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let section = (size_bytes - data.len()).min(SECTION_BYTES);
        let end = data.len() + section;

        match rng.gen_range(0..10) {
            // 20% runs
            0..=1 => {
                let byte: u8 = rng.gen();
                data.resize(end, byte);
            }

            // 30% text
            2..=4 => {
                while data.len() < end {
                    let word = WORDS[rng.gen_range(0..WORDS.len())];
                    data.extend_from_slice(word.as_bytes());
                    data.push(if rng.gen_bool(0.1) { b'\n' } else { b' ' });
                }
                data.truncate(end);
            }

            // 20% repeating pattern
            5..=6 => {
                let pattern = generate_pattern(&mut rng);
                data.extend(pattern.iter().cycle().take(section));
            }

            // 10% skewed: symbol k with probability ~2^-(k+1)
            7 => {
                for _ in 0..section {
                    let mut symbol = 0u8;
                    while symbol < 15 && rng.gen_bool(0.5) {
                        symbol += 1;
                    }
                    data.push(b'A' + symbol);
                }
            }

            // 20% random
            _ => {
                data.extend((0..section).map(|_| rng.gen::<u8>()));
            }
        }
    }

    data
}

/// Generate a small repeating pattern.
fn generate_pattern(rng: &mut ChaCha8Rng) -> Vec<u8> {
    let pattern_len = rng.gen_range(4..=32);
    (0..pattern_len).map(|_| rng.gen()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sample_data() {
        let data = generate_sample_data(42, 1000);
        assert_eq!(data.len(), 1000);
    }

    #[test]
    fn test_determinism() {
        let data1 = generate_sample_data(12345, 50_000);
        let data2 = generate_sample_data(12345, 50_000);

        assert_eq!(data1, data2);
    }

    #[test]
    fn test_different_seeds() {
        let data1 = generate_sample_data(1, 20_000);
        let data2 = generate_sample_data(2, 20_000);

        assert_ne!(data1, data2);
    }

    #[test]
    fn test_various_sizes() {
        for size in [0, 1, 100, 8192, 8193, 100_000] {
            let data = generate_sample_data(999, size);
            assert_eq!(data.len(), size);
        }
    }

    #[test]
    fn test_sample_round_trips() {
        let data = generate_sample_data(7, 64 * 1024);
        for algorithm in codec_lab_core::Algorithm::ALL {
            let (container, _) = codec_lab_core::compress(algorithm, &data).unwrap();
            assert_eq!(codec_lab_core::decompress(algorithm, &container).unwrap(), data);
        }
    }
}
