//! LZW codec with fixed 12-bit codes.
//!
//! Both sides start from the 256 single-byte entries (codes 0-255) and assign
//! new codes from 256 upward, strictly increasing, up to 4096 entries.
//!
//! # Dictionary-full policy
//!
//! - [`DictionaryPolicy::Freeze`] (default): once 4096 entries exist, stop
//!   adding entries and keep coding with the frozen dictionary.
//! - [`DictionaryPolicy::Reset`]: when a new entry would be added to a full
//!   dictionary, drop back to the 256 single-byte entries instead.
//!
//! The policy is stored in the container metadata, so the decoder always
//! mirrors whatever the encoder did.
//!
//! # Dictionaries
//!
//! Entries are stored as `(prefix code, last byte)` pairs rather than whole
//! byte strings; the decoder rebuilds strings by walking prefix links. Both
//! dictionaries are plain values passed into [`LzwCoder::encode_with`] and
//! [`LzwCoder::decode_with`].

use std::collections::HashMap;

use crate::bitio::{BitReader, BitWriter};
use crate::codec::Algorithm;
use crate::error::{Error, HeaderError, Result};
use crate::framing::Container;

/// Width of every emitted code.
pub const CODE_WIDTH: u8 = 12;

/// Maximum number of dictionary entries (the 12-bit code space).
pub const MAX_ENTRIES: usize = 1 << CODE_WIDTH;

/// First code available for multi-byte entries.
const FIRST_FREE: usize = 256;

/// Metadata length: code width byte + policy byte.
pub const METADATA_LEN: usize = 2;

/// What to do once the dictionary holds [`MAX_ENTRIES`] entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DictionaryPolicy {
    /// Keep encoding with the full dictionary.
    #[default]
    Freeze,
    /// Start over from the 256 single-byte entries.
    Reset,
}

impl DictionaryPolicy {
    /// Byte stored in container metadata.
    pub fn id(self) -> u8 {
        match self {
            DictionaryPolicy::Freeze => 0,
            DictionaryPolicy::Reset => 1,
        }
    }

    /// Parse a metadata policy byte.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(DictionaryPolicy::Freeze),
            1 => Ok(DictionaryPolicy::Reset),
            other => Err(HeaderError::UnknownLzwPolicy(other).into()),
        }
    }
}

/// Encoder-side dictionary: `(prefix code, next byte) -> code`.
#[derive(Debug, Clone)]
pub struct EncodeDictionary {
    entries: HashMap<(u16, u8), u16>,
    next_code: usize,
}

impl EncodeDictionary {
    /// A dictionary holding only the 256 single-byte entries.
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_capacity(MAX_ENTRIES - FIRST_FREE),
            next_code: FIRST_FREE,
        }
    }

    /// Number of entries, single-byte entries included.
    pub fn len(&self) -> usize {
        self.next_code
    }

    /// Always false: the single-byte entries are never removed.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the 12-bit code space is exhausted.
    pub fn is_full(&self) -> bool {
        self.next_code >= MAX_ENTRIES
    }

    /// Code for `prefix` extended by `byte`, if that string is known.
    pub fn lookup(&self, prefix: u16, byte: u8) -> Option<u16> {
        self.entries.get(&(prefix, byte)).copied()
    }

    /// Add `prefix + byte` at the next free code.
    ///
    /// # Errors
    /// `Error::DictionaryOverflow` if the dictionary is already full.
    pub fn insert(&mut self, prefix: u16, byte: u8) -> Result<u16> {
        if self.is_full() {
            return Err(Error::DictionaryOverflow {
                entries: self.next_code,
                max: MAX_ENTRIES,
            });
        }
        let code = self.next_code as u16;
        self.entries.insert((prefix, byte), code);
        self.next_code += 1;
        Ok(code)
    }

    /// Drop every multi-byte entry.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.next_code = FIRST_FREE;
    }
}

impl Default for EncodeDictionary {
    fn default() -> Self {
        Self::new()
    }
}

/// A decoder dictionary entry: the string for `prefix` followed by `byte`.
#[derive(Debug, Clone, Copy)]
struct Entry {
    prefix: Option<u16>,
    byte: u8,
    first: u8,
    len: usize,
}

/// Decoder-side dictionary: `code -> byte string` via prefix links.
#[derive(Debug, Clone)]
pub struct DecodeDictionary {
    entries: Vec<Entry>,
}

impl DecodeDictionary {
    /// A dictionary holding only the 256 single-byte entries.
    pub fn new() -> Self {
        let mut entries = Vec::with_capacity(MAX_ENTRIES);
        entries.extend((0..=255u8).map(|byte| Entry {
            prefix: None,
            byte,
            first: byte,
            len: 1,
        }));
        Self { entries }
    }

    /// Number of entries, single-byte entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the single-byte entries are never removed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the 12-bit code space is exhausted.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_ENTRIES
    }

    /// Drop every multi-byte entry.
    pub fn reset(&mut self) {
        self.entries.truncate(FIRST_FREE);
    }

    /// Add the string for `prefix` followed by `byte`.
    ///
    /// # Errors
    /// `Error::DictionaryOverflow` if the dictionary is already full.
    pub fn insert(&mut self, prefix: u16, byte: u8) -> Result<u16> {
        if self.is_full() {
            return Err(Error::DictionaryOverflow {
                entries: self.entries.len(),
                max: MAX_ENTRIES,
            });
        }
        let parent = self.entries[prefix as usize];
        let code = self.entries.len() as u16;
        self.entries.push(Entry {
            prefix: Some(prefix),
            byte,
            first: parent.first,
            len: parent.len + 1,
        });
        Ok(code)
    }

    fn first_byte(&self, code: u16) -> u8 {
        self.entries[code as usize].first
    }

    /// Append the string for `code` to `out`.
    fn expand(&self, code: u16, out: &mut Vec<u8>) {
        let len = self.entries[code as usize].len;
        let start = out.len();
        out.resize(start + len, 0);

        let mut pos = start + len;
        let mut current = Some(code);
        while let Some(c) = current {
            let entry = &self.entries[c as usize];
            pos -= 1;
            out[pos] = entry.byte;
            current = entry.prefix;
        }
    }
}

impl Default for DecodeDictionary {
    fn default() -> Self {
        Self::new()
    }
}

/// LZW codec parameterized by its dictionary-full policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LzwCoder {
    pub policy: DictionaryPolicy,
}

impl LzwCoder {
    pub fn new(policy: DictionaryPolicy) -> Self {
        Self { policy }
    }

    /// Compress `data` with a fresh dictionary.
    pub fn encode(&self, data: &[u8]) -> Result<Container> {
        self.encode_with(data, &mut EncodeDictionary::new())
    }

    /// Compress `data` using `dict` as working state.
    ///
    /// `dict` is reset to the single-byte entries first; afterwards it holds
    /// the final dictionary, which callers may inspect.
    pub fn encode_with(&self, data: &[u8], dict: &mut EncodeDictionary) -> Result<Container> {
        dict.reset();

        let mut writer = BitWriter::with_capacity(data.len());
        let mut codes = 0usize;
        let mut resets = 0usize;

        let mut bytes = data.iter().copied();
        if let Some(first) = bytes.next() {
            let mut w = first as u16;

            for c in bytes {
                if let Some(code) = dict.lookup(w, c) {
                    w = code;
                    continue;
                }

                writer.write_bits(w as u64, CODE_WIDTH as usize)?;
                codes += 1;

                if !dict.is_full() {
                    dict.insert(w, c)?;
                    if dict.is_full() {
                        log::debug!("lzw: dictionary full after {codes} codes");
                    }
                } else if self.policy == DictionaryPolicy::Reset {
                    dict.reset();
                    resets += 1;
                }

                w = c as u16;
            }

            writer.write_bits(w as u64, CODE_WIDTH as usize)?;
            codes += 1;
        }

        let (payload, pad_bits) = writer.finish();
        log::debug!(
            "lzw: {} input bytes -> {codes} codes, {} entries, {resets} resets",
            data.len(),
            dict.len()
        );

        Ok(Container {
            algorithm: Algorithm::Lzw,
            original_len: data.len(),
            metadata: vec![CODE_WIDTH, self.policy.id()],
            payload,
            pad_bits,
        })
    }

    /// Decompress an LZW container with a fresh dictionary.
    ///
    /// The policy recorded in the container wins over `self.policy`.
    pub fn decode(&self, container: &Container) -> Result<Vec<u8>> {
        self.decode_with(container, &mut DecodeDictionary::new())
    }

    /// Decompress an LZW container using `dict` as working state.
    pub fn decode_with(&self, container: &Container, dict: &mut DecodeDictionary) -> Result<Vec<u8>> {
        let policy = parse_metadata(&container.metadata)?;
        dict.reset();

        let width = CODE_WIDTH as usize;
        let bits = container.payload_bit_len();
        if bits % width != 0 {
            return Err(HeaderError::RaggedLzwPayload { bits, width }.into());
        }
        let code_count = bits / width;

        let expected = container.original_len;
        // No code expands to more than MAX_ENTRIES bytes.
        let mut output = Vec::with_capacity(expected.min(code_count.saturating_mul(MAX_ENTRIES)));
        let mut reader = BitReader::with_bit_len(&container.payload, bits);
        let mut prev: Option<u16> = None;

        for index in 0..code_count {
            let code = reader.read_bits(width)? as u16;

            if prev.is_some() && dict.is_full() && policy == DictionaryPolicy::Reset {
                dict.reset();
                prev = None;
            }

            match prev {
                None => {
                    if code as usize >= FIRST_FREE {
                        return Err(invalid_code(code, index, dict.len()));
                    }
                }
                Some(p) => {
                    let size = dict.len();
                    let first = if (code as usize) < size {
                        dict.first_byte(code)
                    } else if code as usize == size {
                        // Code inserted by the encoder on this very step:
                        // previous string + its own first byte.
                        dict.first_byte(p)
                    } else {
                        return Err(invalid_code(code, index, size));
                    };
                    if !dict.is_full() {
                        dict.insert(p, first)?;
                    }
                }
            }

            dict.expand(code, &mut output);
            if output.len() > expected {
                return Err(HeaderError::LengthMismatch {
                    expected,
                    actual: output.len(),
                }
                .into());
            }
            prev = Some(code);
        }

        if output.len() != expected {
            return Err(HeaderError::LengthMismatch {
                expected,
                actual: output.len(),
            }
            .into());
        }
        Ok(output)
    }
}

fn parse_metadata(metadata: &[u8]) -> Result<DictionaryPolicy> {
    let [width, policy] = metadata else {
        return Err(HeaderError::MetadataLength {
            algorithm: Algorithm::Lzw.name(),
            expected: METADATA_LEN,
            actual: metadata.len(),
        }
        .into());
    };
    if *width != CODE_WIDTH {
        return Err(HeaderError::UnsupportedCodeWidth(*width).into());
    }
    DictionaryPolicy::from_id(*policy)
}

fn invalid_code(code: u16, index: usize, dictionary_size: usize) -> Error {
    HeaderError::InvalidLzwCode {
        code,
        index,
        dictionary_size,
    }
    .into()
}

/// Compress `data` with the default (freeze) policy.
pub fn encode(data: &[u8]) -> Result<Container> {
    LzwCoder::default().encode(data)
}

/// Decompress an LZW container.
pub fn decode(container: &Container) -> Result<Vec<u8>> {
    LzwCoder::default().decode(container)
}
