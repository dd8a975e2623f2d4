//! Canonical Huffman codec.
//!
//! Code lengths come from a classic Huffman tree built with an explicit
//! min-priority queue; the codes themselves are then reassigned canonically
//! (sorted by `(length, symbol)`, increasing numeric order per length). Only
//! the 256 code lengths are stored in the container, so the tree never has to
//! be transmitted.
//!
//! # Determinism
//!
//! Ties in the priority queue are broken by creation order: leaves are
//! created in symbol order, merged nodes after them. Among equally frequent
//! symbols the lower byte value is merged first, so it may end up with the
//! longer code (`a:1 b:1 c:1` gives lengths 2, 2, 1). Combined with canonical
//! code assignment, identical input always yields identical output.
//!
//! # Special Cases
//!
//! - Empty input: all lengths zero, empty payload
//! - One distinct symbol: that symbol gets a 1-bit code (`0`) and the payload
//!   is one bit per input byte

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::bitio::{BitReader, BitWriter};
use crate::codec::Algorithm;
use crate::error::{HeaderError, Result};
use crate::framing::Container;

/// Longest code length the codec will emit.
///
/// Trees deeper than this are rebuilt from halved frequencies.
pub const MAX_CODE_LENGTH: usize = 32;

/// Size of the serialized code-length table.
pub const METADATA_LEN: usize = 256;

/// Count occurrences of every byte value.
pub fn frequencies(data: &[u8]) -> [u64; 256] {
    let mut freqs = [0u64; 256];
    for &byte in data {
        freqs[byte as usize] += 1;
    }
    freqs
}

/// Compute length-limited Huffman code lengths for a frequency table.
///
/// Symbols with zero frequency get length 0. A lone symbol gets length 1.
pub fn code_lengths(freqs: &[u64; 256]) -> [u8; 256] {
    let mut lengths = tree_lengths(freqs);
    let mut scaled = *freqs;
    let mut rounds = 0;

    while lengths.iter().any(|&l| l as usize > MAX_CODE_LENGTH) {
        for f in scaled.iter_mut().filter(|f| **f > 0) {
            *f = (*f >> 1).max(1);
        }
        lengths = tree_lengths(&scaled);
        rounds += 1;
    }

    if rounds > 0 {
        log::debug!("huffman: halved frequencies {rounds} times to fit {MAX_CODE_LENGTH}-bit codes");
    }
    lengths
}

/// Build a Huffman tree iteratively and return the depth of every leaf.
fn tree_lengths(freqs: &[u64; 256]) -> [u8; 256] {
    let mut lengths = [0u8; 256];

    // Node arena: parent[i] is the index of node i's parent. Children are
    // always created before their parent, so parent[i] > i.
    let mut parent: Vec<usize> = Vec::with_capacity(511);
    let mut leaves: Vec<(u8, usize)> = Vec::with_capacity(256);
    let mut heap = BinaryHeap::with_capacity(256);

    for (symbol, &freq) in freqs.iter().enumerate() {
        if freq > 0 {
            let idx = parent.len();
            parent.push(usize::MAX);
            leaves.push((symbol as u8, idx));
            heap.push(Reverse((freq, idx)));
        }
    }

    match leaves.len() {
        0 => return lengths,
        1 => {
            lengths[leaves[0].0 as usize] = 1;
            return lengths;
        }
        _ => {}
    }

    while heap.len() > 1 {
        let (Some(Reverse((fa, a))), Some(Reverse((fb, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        let idx = parent.len();
        parent.push(usize::MAX);
        parent[a] = idx;
        parent[b] = idx;
        heap.push(Reverse((fa.saturating_add(fb), idx)));
    }

    // Walk the arena from the root down; a parent's depth is always known
    // before any of its children are visited.
    let mut depth = vec![0usize; parent.len()];
    for idx in (0..parent.len()).rev() {
        if parent[idx] != usize::MAX {
            depth[idx] = depth[parent[idx]] + 1;
        }
    }

    for &(symbol, idx) in &leaves {
        lengths[symbol as usize] = depth[idx].min(u8::MAX as usize) as u8;
    }
    lengths
}

/// A canonical Huffman code table: symbol -> (code, length).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    lengths: [u8; 256],
    codes: [u32; 256],
    /// Number of codes of each length (index = length)
    length_counts: [u32; MAX_CODE_LENGTH + 1],
    /// Present symbols sorted by (length, symbol)
    sorted_symbols: Vec<u8>,
}

impl Codebook {
    /// Build a codebook from symbol frequencies.
    pub fn from_frequencies(freqs: &[u64; 256]) -> Result<Self> {
        Self::from_lengths(code_lengths(freqs))
    }

    /// Rebuild the canonical codebook from code lengths alone.
    ///
    /// # Errors
    /// `HeaderError::InvalidCodeLengths` if the lengths don't form a complete
    /// prefix code (Kraft sum of exactly 1), except for the empty table and
    /// the single-symbol table whose only length is 1.
    pub fn from_lengths(lengths: [u8; 256]) -> Result<Self> {
        let mut length_counts = [0u32; MAX_CODE_LENGTH + 1];
        for &len in lengths.iter().filter(|&&l| l > 0) {
            if len as usize > MAX_CODE_LENGTH {
                return Err(invalid_lengths(format!(
                    "length {len} exceeds maximum {MAX_CODE_LENGTH}"
                )));
            }
            length_counts[len as usize] += 1;
        }

        let present: u32 = length_counts.iter().sum();
        match present {
            0 => {}
            1 => {
                if length_counts[1] != 1 {
                    return Err(invalid_lengths(
                        "single symbol must have a 1-bit code".to_string(),
                    ));
                }
            }
            _ => {
                // Kraft sum scaled by 2^MAX_CODE_LENGTH must be exactly 2^MAX_CODE_LENGTH.
                let kraft: u64 = length_counts
                    .iter()
                    .enumerate()
                    .skip(1)
                    .map(|(len, &count)| (count as u64) << (MAX_CODE_LENGTH - len))
                    .sum();
                let full = 1u64 << MAX_CODE_LENGTH;
                if kraft != full {
                    let state = if kraft > full {
                        "oversubscribed"
                    } else {
                        "incomplete"
                    };
                    return Err(invalid_lengths(format!(
                        "{state} code (kraft sum {kraft}/{full})"
                    )));
                }
            }
        }

        let mut sorted_symbols: Vec<u8> = (0..=255u8).filter(|&s| lengths[s as usize] > 0).collect();
        sorted_symbols.sort_by_key(|&s| (lengths[s as usize], s));

        // First code of each length, DEFLATE style.
        let mut next_code = [0u64; MAX_CODE_LENGTH + 2];
        let mut code = 0u64;
        for len in 1..=MAX_CODE_LENGTH {
            code = (code + length_counts[len - 1] as u64) << 1;
            next_code[len] = code;
        }

        let mut codes = [0u32; 256];
        for &symbol in &sorted_symbols {
            let len = lengths[symbol as usize] as usize;
            codes[symbol as usize] = next_code[len] as u32;
            next_code[len] += 1;
        }

        Ok(Self {
            lengths,
            codes,
            length_counts,
            sorted_symbols,
        })
    }

    /// Code lengths by symbol (0 = absent).
    pub fn lengths(&self) -> &[u8; 256] {
        &self.lengths
    }

    /// Code and length for `symbol`, if present.
    pub fn code(&self, symbol: u8) -> Option<(u32, u8)> {
        let len = self.lengths[symbol as usize];
        (len > 0).then(|| (self.codes[symbol as usize], len))
    }

    /// Number of symbols with a code.
    pub fn symbol_count(&self) -> usize {
        self.sorted_symbols.len()
    }

    /// Sum of `2^-length` over every present symbol.
    pub fn kraft_sum(&self) -> f64 {
        self.lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| (-(l as f64)).exp2())
            .sum()
    }

    /// Average code length in bits/symbol, weighted by `freqs`.
    pub fn average_length(&self, freqs: &[u64; 256]) -> f64 {
        let total: u64 = freqs.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let bits: u64 = freqs
            .iter()
            .zip(self.lengths.iter())
            .map(|(&f, &l)| f * l as u64)
            .sum();
        bits as f64 / total as f64
    }

    /// Serialize the code-length table (256 bytes, one per symbol).
    pub fn serialize_metadata(&self) -> Vec<u8> {
        self.lengths.to_vec()
    }

    /// Parse and validate a serialized code-length table.
    pub fn deserialize_metadata(metadata: &[u8]) -> Result<Self> {
        if metadata.len() != METADATA_LEN {
            return Err(HeaderError::MetadataLength {
                algorithm: Algorithm::Huffman.name(),
                expected: METADATA_LEN,
                actual: metadata.len(),
            }
            .into());
        }
        let mut lengths = [0u8; 256];
        lengths.copy_from_slice(metadata);
        Self::from_lengths(lengths)
    }

    /// Encode `data`, returning the payload and its pad-bit count.
    ///
    /// # Errors
    /// `HeaderError::InvalidCodeLengths` if `data` holds a symbol with no code.
    pub fn encode(&self, data: &[u8]) -> Result<(Vec<u8>, u8)> {
        let mut writer = BitWriter::with_capacity(data.len() / 2);
        for &byte in data {
            let (code, len) = self.code(byte).ok_or_else(|| {
                invalid_lengths(format!("symbol {byte:#04x} has no code"))
            })?;
            writer.write_bits(code as u64, len as usize)?;
        }
        Ok(writer.finish())
    }

    /// Decode exactly `expected_len` symbols from the first `bit_len` bits of
    /// `payload`.
    pub fn decode(&self, payload: &[u8], bit_len: usize, expected_len: usize) -> Result<Vec<u8>> {
        if expected_len > 0 && self.sorted_symbols.is_empty() {
            return Err(invalid_lengths(format!(
                "no codes for {expected_len} output bytes"
            )));
        }

        let mut reader = BitReader::with_bit_len(payload, bit_len);
        // Every symbol costs at least one bit.
        let mut output = Vec::with_capacity(expected_len.min(bit_len));

        while output.len() < expected_len {
            output.push(self.decode_symbol(&mut reader)?);
        }

        // Leftover bits mean the declared length is short.
        if !reader.is_empty() {
            let mut extra = 0;
            while !reader.is_empty() && self.decode_symbol(&mut reader).is_ok() {
                extra += 1;
            }
            return Err(HeaderError::LengthMismatch {
                expected: expected_len,
                actual: expected_len + extra.max(1),
            }
            .into());
        }

        Ok(output)
    }

    /// Walk one code bit by bit through the canonical tables.
    fn decode_symbol(&self, reader: &mut BitReader<'_>) -> Result<u8> {
        let start = reader.position();
        let mut code = 0u64;
        let mut first = 0u64;
        let mut index = 0usize;

        for len in 1..=MAX_CODE_LENGTH {
            code |= reader.read_bit()? as u64;
            let count = self.length_counts[len] as u64;
            if code >= first && code - first < count {
                return Ok(self.sorted_symbols[index + (code - first) as usize]);
            }
            index += count as usize;
            if index >= self.sorted_symbols.len() {
                break;
            }
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(HeaderError::InvalidHuffmanCode { position: start }.into())
    }
}

fn invalid_lengths(reason: String) -> crate::error::Error {
    HeaderError::InvalidCodeLengths { reason }.into()
}

/// Compress `data` into a Huffman container.
pub fn encode(data: &[u8]) -> Result<Container> {
    let freqs = frequencies(data);
    let codebook = Codebook::from_frequencies(&freqs)?;
    let (payload, pad_bits) = codebook.encode(data)?;

    log::debug!(
        "huffman: {} symbols, {} payload bytes for {} input bytes",
        codebook.symbol_count(),
        payload.len(),
        data.len()
    );

    Ok(Container {
        algorithm: Algorithm::Huffman,
        original_len: data.len(),
        metadata: codebook.serialize_metadata(),
        payload,
        pad_bits,
    })
}

/// Decompress a Huffman container.
pub fn decode(container: &Container) -> Result<Vec<u8>> {
    let codebook = Codebook::deserialize_metadata(&container.metadata)?;
    codebook.decode(
        &container.payload,
        container.payload_bit_len(),
        container.original_len,
    )
}
