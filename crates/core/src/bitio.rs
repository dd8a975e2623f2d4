//! Bit-level I/O shared by all three codecs.
//!
//! `BitWriter` and `BitReader` operate in MSB-first (most significant bit
//! first) order so that a given sequence of writes always produces the same
//! bytes.
//!
//! # Padding Rules
//! - BitWriter: pads the final partial byte with zero bits and reports how
//!   many pad bits it added
//! - BitReader: can be limited to an exact bit length so that pad bits are
//!   never mistaken for data
//!
//! # Example
//! ```
//! use codec_lab_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3).unwrap();  // Write 3 bits: 1, 0, 1
//! writer.write_bits(0b11, 2).unwrap();   // Write 2 bits: 1, 1
//! // Total: 10111 -> padded to 10111000
//!
//! let (bytes, pad_bits) = writer.finish();
//! assert_eq!(pad_bits, 3);
//!
//! let mut reader = BitReader::with_bit_len(&bytes, 5);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b11);
//! assert!(reader.read_bits(1).is_err());
//! ```

use crate::error::{BitIoError, Result};

/// Writes bits MSB-first into a byte buffer.
///
/// Accumulates bits in a buffer and flushes complete bytes to the output.
/// When finished, pads the final partial byte with zeros.
///
/// # Invariants
/// - `bit_buffer` contains up to 7 bits (never a full byte)
/// - `bit_count` is always < 8
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// Create a new BitWriter with empty output.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a BitWriter that expects roughly `bytes` bytes of output.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    /// Write up to 64 bits to the output.
    ///
    /// Bits are written MSB-first. For example, writing value=0b101 with count=3
    /// writes bits 1, 0, 1 in that order. Bits of `value` above `count` are ignored.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        while remaining > 0 {
            let free = 8 - self.bit_count as usize;
            let take = remaining.min(free);
            let shift = remaining - take;
            let bits = ((value >> shift) & ((1u64 << take) - 1)) as u8;

            self.bit_buffer |= bits << (free - take);
            self.bit_count += take as u8;

            if self.bit_count == 8 {
                self.bytes.push(self.bit_buffer);
                self.bit_buffer = 0;
                self.bit_count = 0;
            }

            remaining -= take;
        }

        Ok(())
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.bit_buffer |= (bit as u8) << (7 - self.bit_count);
        self.bit_count += 1;
        if self.bit_count == 8 {
            self.bytes.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
    }

    /// Finish writing and return the output bytes plus the number of zero
    /// pad bits appended to complete the final byte (0-7).
    ///
    /// This consumes the writer.
    pub fn finish(mut self) -> (Vec<u8>, u8) {
        let mut pad_bits = 0;
        if self.bit_count > 0 {
            pad_bits = 8 - self.bit_count;
            self.bytes.push(self.bit_buffer);
        }
        (self.bytes, pad_bits)
    }

    /// Return the total number of bits written (including partial byte).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads bits MSB-first from a byte buffer.
///
/// # Invariants
/// - `bit_position` never exceeds `bit_len`
/// - `bit_len` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Number of meaningful bits in `data`
    bit_len: usize,
    /// Current bit position (0 = MSB of first byte)
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new BitReader over every bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_bit_len(data, data.len() * 8)
    }

    /// Create a BitReader over the first `bit_len` bits of `data`.
    ///
    /// `bit_len` is clamped to the bits actually present.
    pub fn with_bit_len(data: &'a [u8], bit_len: usize) -> Self {
        Self {
            data,
            bit_len: bit_len.min(data.len() * 8),
            bit_position: 0,
        }
    }

    /// Read up to 64 bits from the input.
    ///
    /// Bits are read MSB-first. For example, reading 3 bits from byte 0b10110000
    /// returns 0b101.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::OutOfBounds` if not enough bits remain
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let available = self.bits_remaining();
        if count > available {
            return Err(BitIoError::OutOfBounds {
                requested: count,
                available,
                position: self.bit_position,
            }
            .into());
        }

        let mut result = 0u64;
        let mut remaining = count;

        while remaining > 0 {
            let bit_offset = self.bit_position % 8;
            let bits_in_byte = 8 - bit_offset;
            let take = remaining.min(bits_in_byte);

            let byte = self.data[self.bit_position / 8];
            let mask = ((1u16 << take) - 1) as u8;
            let bits = (byte >> (bits_in_byte - take)) & mask;

            result = (result << take) | bits as u64;

            self.bit_position += take;
            remaining -= take;
        }

        Ok(result)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bit_position >= self.bit_len {
            return Err(BitIoError::OutOfBounds {
                requested: 1,
                available: 0,
                position: self.bit_position,
            }
            .into());
        }
        let byte = self.data[self.bit_position / 8];
        let bit = (byte >> (7 - self.bit_position % 8)) & 1;
        self.bit_position += 1;
        Ok(bit == 1)
    }

    /// Return the number of bits remaining.
    pub fn bits_remaining(&self) -> usize {
        self.bit_len - self.bit_position
    }

    /// Return the current bit position.
    pub fn position(&self) -> usize {
        self.bit_position
    }

    /// Check if every meaningful bit has been consumed.
    pub fn is_empty(&self) -> bool {
        self.bit_position >= self.bit_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_write_read_single_byte() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b10110011, 8).unwrap();

        let (bytes, pad_bits) = writer.finish();
        assert_eq!(bytes, vec![0b10110011]);
        assert_eq!(pad_bits, 0);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(8).unwrap(), 0b10110011);
    }

    #[test]
    fn test_write_read_partial_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        writer.write_bits(0b000, 3).unwrap();

        let (bytes, _) = writer.finish();
        assert_eq!(bytes, vec![0b10111000]);

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        assert_eq!(reader.read_bits(3).unwrap(), 0b000);
    }

    #[test]
    fn test_padding_is_recorded() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1, 1).unwrap();

        let (bytes, pad_bits) = writer.finish();
        assert_eq!(bytes, vec![0b10000000]);
        assert_eq!(pad_bits, 7);
    }

    #[test]
    fn test_twelve_bit_codes() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xABC, 12).unwrap();
        writer.write_bits(0x123, 12).unwrap();
        writer.write_bits(0xFFF, 12).unwrap();

        assert_eq!(writer.bit_len(), 36);
        let (bytes, pad_bits) = writer.finish();
        assert_eq!(bytes.len(), 5);
        assert_eq!(pad_bits, 4);

        let mut reader = BitReader::with_bit_len(&bytes, 36);
        assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
        assert_eq!(reader.read_bits(12).unwrap(), 0x123);
        assert_eq!(reader.read_bits(12).unwrap(), 0xFFF);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_value_is_masked_to_width() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 4).unwrap();
        let (bytes, _) = writer.finish();
        assert_eq!(bytes, vec![0b11110000]);
    }

    #[test]
    fn test_read_past_end() {
        let data = vec![0b10101010];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.read_bits(8).unwrap(), 0b10101010);
        let err = reader.read_bits(1).unwrap_err();
        assert!(matches!(
            err,
            Error::BitIo(BitIoError::OutOfBounds {
                requested: 1,
                available: 0,
                position: 8
            })
        ));
    }

    #[test]
    fn test_bit_len_hides_padding() {
        let data = vec![0b11100000];
        let mut reader = BitReader::with_bit_len(&data, 3);
        assert_eq!(reader.read_bits(3).unwrap(), 0b111);
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn test_zero_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 0).unwrap();
        let (bytes, pad_bits) = writer.finish();
        assert!(bytes.is_empty());
        assert_eq!(pad_bits, 0);

        let mut reader = BitReader::new(&[0xFF]);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut writer = BitWriter::new();
        assert!(writer.write_bits(0, 65).is_err());
        let mut reader = BitReader::new(&[0u8; 16]);
        assert!(reader.read_bits(65).is_err());
    }

    #[test]
    fn test_64_bit_values() {
        let mut writer = BitWriter::new();
        let val = 0x123456789ABCDEF0u64;
        writer.write_bits(val, 64).unwrap();

        let (bytes, _) = writer.finish();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(64).unwrap(), val);
    }

    #[test]
    fn test_bit_by_bit() {
        let mut writer = BitWriter::new();
        for &bit in &[true, false, true, true, false, false, true, false] {
            writer.write_bit(bit);
        }

        let (bytes, _) = writer.finish();
        assert_eq!(bytes, vec![0b10110010]);

        let mut reader = BitReader::new(&bytes);
        let expected = [true, false, true, true, false, false, true, false];
        for &exp in &expected {
            assert_eq!(reader.read_bit().unwrap(), exp);
        }
    }

    #[test]
    fn test_bits_remaining() {
        let data = vec![0xFF, 0xFF];
        let mut reader = BitReader::new(&data);

        assert_eq!(reader.bits_remaining(), 16);
        reader.read_bits(5).unwrap();
        assert_eq!(reader.bits_remaining(), 11);
        reader.read_bits(11).unwrap();
        assert_eq!(reader.bits_remaining(), 0);
        assert!(reader.is_empty());
    }
}
