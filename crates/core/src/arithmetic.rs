//! Static-model arithmetic coder.
//!
//! The coder keeps an inclusive integer interval `[low, high]` inside a
//! 32-bit code space and narrows it for every symbol in proportion to the
//! symbol's cumulative-frequency range. Whenever the interval falls entirely
//! into one half of the code space, the shared top bit is emitted and both
//! bounds are shifted left. When the interval straddles the midpoint but has
//! shrunk into the middle two quarters, it is expanded around the midpoint
//! and a pending bit is counted; pending bits are written, inverted, after
//! the next resolved bit.
//!
//! The model is static: byte frequencies are counted once over the input,
//! scaled so the total stays well below a quarter of the code space, and
//! stored in the container. Symbol 256 is an end-of-stream marker with
//! frequency 1.
//!
//! # Precision
//!
//! After renormalization the interval is always wider than a quarter of the
//! code space (2^30), and the model total never exceeds 2^24, so every
//! symbol keeps a sub-interval of at least 2^6 values.

use crate::bitio::{BitReader, BitWriter};
use crate::codec::Algorithm;
use crate::error::{Error, HeaderError, Result};
use crate::framing::Container;

/// Width of the coding registers in bits.
pub const PRECISION: u32 = 32;

const TOP: u64 = (1 << PRECISION) - 1;
const HALF: u64 = 1 << (PRECISION - 1);
const QUARTER: u64 = 1 << (PRECISION - 2);
const THREE_QUARTERS: u64 = 3 * QUARTER;

/// End-of-stream symbol.
pub const EOF_SYMBOL: usize = 256;

/// Number of model symbols (256 bytes + end-of-stream).
pub const SYMBOL_COUNT: usize = 257;

/// Upper bound for the model's total frequency.
pub const MAX_TOTAL: u64 = 1 << 24;

/// Cumulative-frequency model over the 256 byte values plus end-of-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyModel {
    /// Frequency of each symbol; EOF is always 1
    freqs: Vec<u32>,
    /// cumulative[s] = sum of freqs below s; cumulative[257] = total
    cumulative: Vec<u64>,
}

impl FrequencyModel {
    /// Count `data` and build a scaled model.
    pub fn from_data(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self::from_counts(&counts)
    }

    /// Build a model from raw byte counts, halving them (keeping every
    /// present symbol at 1 or more) until the total fits [`MAX_TOTAL`].
    pub fn from_counts(counts: &[u64; 256]) -> Self {
        let mut scaled = *counts;
        let mut rounds = 0;
        while scaled.iter().sum::<u64>() + 1 > MAX_TOTAL {
            for c in scaled.iter_mut().filter(|c| **c > 0) {
                *c = (*c >> 1).max(1);
            }
            rounds += 1;
        }
        if rounds > 0 {
            log::debug!("arithmetic: scaled model down {rounds} times");
        }

        let mut freqs: Vec<u32> = scaled.iter().map(|&c| c as u32).collect();
        freqs.push(1);
        Self::build(freqs)
    }

    fn build(freqs: Vec<u32>) -> Self {
        let mut cumulative = Vec::with_capacity(SYMBOL_COUNT + 1);
        let mut running = 0u64;
        cumulative.push(0);
        for &f in &freqs {
            running += f as u64;
            cumulative.push(running);
        }
        Self { freqs, cumulative }
    }

    /// Total frequency, end-of-stream included.
    pub fn total(&self) -> u64 {
        self.cumulative[SYMBOL_COUNT]
    }

    /// Frequency of `symbol` (0-256).
    pub fn frequency(&self, symbol: usize) -> u32 {
        self.freqs[symbol]
    }

    /// Cumulative range `[low, high)` of `symbol`.
    pub fn range(&self, symbol: usize) -> (u64, u64) {
        (self.cumulative[symbol], self.cumulative[symbol + 1])
    }

    /// Symbol whose cumulative range contains `target`.
    pub fn symbol_for(&self, target: u64) -> Option<usize> {
        if target >= self.total() {
            return None;
        }
        // First index whose cumulative value exceeds target, minus one.
        let upper = self.cumulative.partition_point(|&c| c <= target);
        Some(upper - 1)
    }

    /// Serialize present byte symbols as `count u16` + `(symbol u8, freq u32)*`.
    pub fn serialize_metadata(&self) -> Vec<u8> {
        let present: Vec<(u8, u32)> = self.freqs[..256]
            .iter()
            .enumerate()
            .filter(|(_, &f)| f > 0)
            .map(|(s, &f)| (s as u8, f))
            .collect();

        let mut out = Vec::with_capacity(2 + present.len() * 5);
        out.extend_from_slice(&(present.len() as u16).to_le_bytes());
        for (symbol, freq) in present {
            out.push(symbol);
            out.extend_from_slice(&freq.to_le_bytes());
        }
        out
    }

    /// Parse and validate a serialized model.
    pub fn deserialize_metadata(metadata: &[u8]) -> Result<Self> {
        if metadata.len() < 2 {
            return Err(metadata_length(2, metadata.len()));
        }
        let count = u16::from_le_bytes([metadata[0], metadata[1]]) as usize;
        if count > 256 {
            return Err(invalid_table(format!("{count} symbols")));
        }
        let expected = 2 + count * 5;
        if metadata.len() != expected {
            return Err(metadata_length(expected, metadata.len()));
        }

        let mut freqs = vec![0u32; SYMBOL_COUNT];
        let mut previous: Option<u8> = None;
        for entry in metadata[2..].chunks_exact(5) {
            let symbol = entry[0];
            let freq = u32::from_le_bytes([entry[1], entry[2], entry[3], entry[4]]);
            if previous.is_some_and(|p| p >= symbol) {
                return Err(invalid_table(format!("symbol {symbol} out of order")));
            }
            if freq == 0 {
                return Err(invalid_table(format!("symbol {symbol} has zero frequency")));
            }
            freqs[symbol as usize] = freq;
            previous = Some(symbol);
        }
        freqs[EOF_SYMBOL] = 1;

        let total: u64 = freqs.iter().map(|&f| f as u64).sum();
        if total > MAX_TOTAL {
            return Err(invalid_table(format!("total {total} exceeds {MAX_TOTAL}")));
        }

        Ok(Self::build(freqs))
    }
}

fn metadata_length(expected: usize, actual: usize) -> Error {
    HeaderError::MetadataLength {
        algorithm: Algorithm::Arithmetic.name(),
        expected,
        actual,
    }
    .into()
}

fn invalid_table(reason: String) -> Error {
    HeaderError::InvalidFrequencyTable { reason }.into()
}

/// Narrow `[low, high]` to `symbol`'s share of the interval.
fn narrow(low: u64, high: u64, model: &FrequencyModel, symbol: usize, index: usize) -> Result<(u64, u64)> {
    let range = high - low + 1;
    let total = model.total();
    let (cum_low, cum_high) = model.range(symbol);

    let span_low = range * cum_low / total;
    let span_high = range * cum_high / total;
    if span_high <= span_low {
        return Err(Error::PrecisionUnderflow {
            symbol_index: index,
        });
    }
    Ok((low + span_low, low + span_high - 1))
}

/// Interval encoder writing into a [`BitWriter`].
struct Encoder {
    low: u64,
    high: u64,
    pending: u64,
    writer: BitWriter,
}

impl Encoder {
    fn new(capacity: usize) -> Self {
        Self {
            low: 0,
            high: TOP,
            pending: 0,
            writer: BitWriter::with_capacity(capacity),
        }
    }

    fn emit(&mut self, bit: bool) {
        self.writer.write_bit(bit);
        for _ in 0..self.pending {
            self.writer.write_bit(!bit);
        }
        self.pending = 0;
    }

    fn encode(&mut self, model: &FrequencyModel, symbol: usize, index: usize) -> Result<()> {
        let (low, high) = narrow(self.low, self.high, model, symbol, index)?;
        self.low = low;
        self.high = high;

        loop {
            if self.high < HALF {
                self.emit(false);
            } else if self.low >= HALF {
                self.emit(true);
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= QUARTER && self.high < THREE_QUARTERS {
                self.pending += 1;
                self.low -= QUARTER;
                self.high -= QUARTER;
            } else {
                break;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
        }
        Ok(())
    }

    /// Emit enough bits to pin a value inside the final interval.
    fn finish(mut self) -> (Vec<u8>, u8) {
        self.pending += 1;
        if self.low < QUARTER {
            self.emit(false);
        } else {
            self.emit(true);
        }
        self.writer.finish()
    }
}

/// Interval decoder reading from a [`BitReader`].
///
/// Past the end of the payload it feeds zero bits, at most [`PRECISION`] of
/// them; needing more means the payload was cut short.
struct Decoder<'a> {
    low: u64,
    high: u64,
    value: u64,
    reader: BitReader<'a>,
    padding: u32,
}

impl<'a> Decoder<'a> {
    fn new(reader: BitReader<'a>) -> Result<Self> {
        let mut decoder = Self {
            low: 0,
            high: TOP,
            value: 0,
            reader,
            padding: 0,
        };
        for _ in 0..PRECISION {
            decoder.value = (decoder.value << 1) | decoder.next_bit()?;
        }
        Ok(decoder)
    }

    fn next_bit(&mut self) -> Result<u64> {
        if self.reader.is_empty() {
            if self.padding >= PRECISION {
                // Surface the reader's own out-of-bounds error.
                return Ok(self.reader.read_bit()? as u64);
            }
            self.padding += 1;
            return Ok(0);
        }
        Ok(self.reader.read_bit()? as u64)
    }

    fn decode(&mut self, model: &FrequencyModel, index: usize) -> Result<usize> {
        let out_of_range = || -> Error { HeaderError::ArithmeticOutOfRange { symbol_index: index }.into() };

        let range = self.high - self.low + 1;
        let offset = self.value.checked_sub(self.low).ok_or_else(out_of_range)?;
        let target = ((offset + 1) * model.total() - 1) / range;
        let symbol = model.symbol_for(target).ok_or_else(out_of_range)?;

        let (low, high) = narrow(self.low, self.high, model, symbol, index)?;
        self.low = low;
        self.high = high;

        loop {
            let shift = if self.high < HALF {
                0
            } else if self.low >= HALF {
                HALF
            } else if self.low >= QUARTER && self.high < THREE_QUARTERS {
                QUARTER
            } else {
                break;
            };
            self.low -= shift;
            self.high -= shift;
            self.value = self.value.checked_sub(shift).ok_or_else(out_of_range)?;

            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.value = (self.value << 1) | self.next_bit()?;
        }
        Ok(symbol)
    }
}

/// Encode `data` against `model`, followed by the end-of-stream symbol.
pub fn encode_with(data: &[u8], model: &FrequencyModel) -> Result<(Vec<u8>, u8)> {
    let mut encoder = Encoder::new(data.len() / 2);
    for (index, &byte) in data.iter().enumerate() {
        encoder.encode(model, byte as usize, index)?;
    }
    encoder.encode(model, EOF_SYMBOL, data.len())?;
    Ok(encoder.finish())
}

/// Decode symbols until end-of-stream; the result must be `expected_len` long.
pub fn decode_with(
    payload: &[u8],
    bit_len: usize,
    model: &FrequencyModel,
    expected_len: usize,
) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(BitReader::with_bit_len(payload, bit_len))?;
    let mut output = Vec::with_capacity(expected_len.min(MAX_TOTAL as usize));

    for index in 0.. {
        let symbol = decoder.decode(model, index)?;
        if symbol == EOF_SYMBOL {
            break;
        }
        if output.len() == expected_len {
            return Err(HeaderError::LengthMismatch {
                expected: expected_len,
                actual: output.len() + 1,
            }
            .into());
        }
        output.push(symbol as u8);
    }

    if output.len() != expected_len {
        return Err(HeaderError::LengthMismatch {
            expected: expected_len,
            actual: output.len(),
        }
        .into());
    }
    Ok(output)
}

/// Compress `data` into an arithmetic-coded container.
pub fn encode(data: &[u8]) -> Result<Container> {
    let model = FrequencyModel::from_data(data);
    let (payload, pad_bits) = encode_with(data, &model)?;

    log::debug!(
        "arithmetic: model total {}, {} payload bytes for {} input bytes",
        model.total(),
        payload.len(),
        data.len()
    );

    Ok(Container {
        algorithm: Algorithm::Arithmetic,
        original_len: data.len(),
        metadata: model.serialize_metadata(),
        payload,
        pad_bits,
    })
}

/// Decompress an arithmetic-coded container.
pub fn decode(container: &Container) -> Result<Vec<u8>> {
    let model = FrequencyModel::deserialize_metadata(&container.metadata)?;
    decode_with(
        &container.payload,
        container.payload_bit_len(),
        &model,
        container.original_len,
    )
}
