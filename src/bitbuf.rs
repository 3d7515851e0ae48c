use crate::codec;
use crate::error::{Result, StegError};
use std::fmt;

/// Growable sequence of bits, independent of byte alignment.
///
/// Bits are packed MSB-first into `bytes`; the live window is `start..end`
/// (absolute bit positions). Consuming extraction (`next_*`) advances `start`
/// and compacts the storage once the dead prefix dominates it. Extracted units
/// are reconstructed MSB-first: the first bit consumed becomes the most
/// significant bit of the returned byte or integer.
///
/// Storage bits at or after `end` are always zero.
#[derive(Debug, Clone, Default)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    start: usize,
    end: usize,
}

/// Maximum width accepted by [`BitBuffer::next_int`]
pub const MAX_INT_WIDTH: usize = 32;

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer holding `bytes`, each byte MSB-first
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            start: 0,
            end: bytes.len() * 8,
        }
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        bits.iter().copied().collect()
    }

    /// Number of live bits
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Bit at `index`, counted from the front of the buffer
    pub fn get(&self, index: usize) -> Option<bool> {
        if index < self.len() {
            Some(self.bit_at(self.start + index))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (self.start..self.end).map(move |pos| self.bit_at(pos))
    }

    fn bit_at(&self, pos: usize) -> bool {
        (self.bytes[pos / 8] >> (7 - pos % 8)) & 1 == 1
    }

    fn push(&mut self, bit: bool) {
        if self.end % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[self.end / 8] |= 0x80 >> (self.end % 8);
        }
        self.end += 1;
    }

    // ------------------------------------------------------------------
    // Append
    // ------------------------------------------------------------------

    pub fn append_bit(&mut self, bit: bool) -> &mut Self {
        self.push(bit);
        self
    }

    pub fn append_bits(&mut self, bits: &[bool]) -> &mut Self {
        for &bit in bits {
            self.push(bit);
        }
        self
    }

    pub fn append_buffer(&mut self, other: &BitBuffer) -> &mut Self {
        if self.end % 8 == 0 && other.start % 8 == 0 {
            let first = other.start / 8;
            self.bytes.extend_from_slice(&other.bytes[first..]);
            self.end += other.len();
            return self;
        }
        for bit in other.iter() {
            self.push(bit);
        }
        self
    }

    pub fn append_byte(&mut self, byte: u8) -> &mut Self {
        if self.end % 8 == 0 {
            self.bytes.push(byte);
            self.end += 8;
        } else {
            for shift in (0..8).rev() {
                self.push((byte >> shift) & 1 == 1);
            }
        }
        self
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        if self.end % 8 == 0 {
            self.bytes.extend_from_slice(bytes);
            self.end += bytes.len() * 8;
        } else {
            for &byte in bytes {
                self.append_byte(byte);
            }
        }
        self
    }

    /// Append `value` as exactly `width` bits, most significant first.
    ///
    /// Widths above 32 zero-extend the value. Fails with
    /// [`StegError::Width`] when `value` needs more than `width` bits.
    pub fn append_int(&mut self, value: u32, width: usize) -> Result<&mut Self> {
        check_fits(value, width)?;
        for shift in (0..width).rev() {
            self.push(shift < 32 && (value >> shift) & 1 == 1);
        }
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Prepend
    // ------------------------------------------------------------------

    fn put_front(&mut self, mut front: BitBuffer) -> &mut Self {
        front.append_buffer(self);
        *self = front;
        self
    }

    pub fn prepend_bit(&mut self, bit: bool) -> &mut Self {
        let mut front = BitBuffer::new();
        front.append_bit(bit);
        self.put_front(front)
    }

    pub fn prepend_bits(&mut self, bits: &[bool]) -> &mut Self {
        self.put_front(BitBuffer::from_bits(bits))
    }

    pub fn prepend_buffer(&mut self, other: &BitBuffer) -> &mut Self {
        self.put_front(other.clone())
    }

    pub fn prepend_byte(&mut self, byte: u8) -> &mut Self {
        self.put_front(BitBuffer::from_bytes(&[byte]))
    }

    pub fn prepend_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.put_front(BitBuffer::from_bytes(bytes))
    }

    /// Insert `value` as `width` bits in front of the existing content.
    /// Used for headers built after the payload is already staged.
    pub fn prepend_int(&mut self, value: u32, width: usize) -> Result<&mut Self> {
        let mut front = BitBuffer::new();
        front.append_int(value, width)?;
        Ok(self.put_front(front))
    }

    // ------------------------------------------------------------------
    // Consuming extraction
    // ------------------------------------------------------------------

    fn ensure(&self, requested: usize) -> Result<()> {
        if self.len() < requested {
            return Err(StegError::InsufficientBits {
                requested,
                available: self.len(),
            });
        }
        Ok(())
    }

    fn advance(&mut self, count: usize) {
        self.start += count;
        if self.start == self.end {
            self.bytes.clear();
            self.start = 0;
            self.end = 0;
            return;
        }
        let dead = self.start / 8;
        if dead > 0 && dead * 2 >= self.bytes.len() {
            self.bytes.drain(..dead);
            self.start -= dead * 8;
            self.end -= dead * 8;
        }
    }

    /// Read `count` (<= 32) live bits from the front without consuming them
    fn peek_int(&self, count: usize) -> u32 {
        (self.start..self.start + count).fold(0u32, |acc, pos| {
            (acc << 1) | u32::from(self.bit_at(pos))
        })
    }

    pub fn next_bit(&mut self) -> Result<bool> {
        self.ensure(1)?;
        let bit = self.bit_at(self.start);
        self.advance(1);
        Ok(bit)
    }

    /// Remove the first `count` bits and return them as a new buffer
    pub fn next_bits(&mut self, count: usize) -> Result<BitBuffer> {
        self.ensure(count)?;
        let taken = (self.start..self.start + count)
            .map(|pos| self.bit_at(pos))
            .collect();
        self.advance(count);
        Ok(taken)
    }

    pub fn next_byte(&mut self) -> Result<u8> {
        self.ensure(8)?;
        let byte = if self.start % 8 == 0 {
            self.bytes[self.start / 8]
        } else {
            self.peek_int(8) as u8
        };
        self.advance(8);
        Ok(byte)
    }

    /// Remove `width` bits and reconstruct them as an integer, MSB-first.
    ///
    /// Integer extraction is bounded to 32 bits; wider requests fail with
    /// [`StegError::WidthTooLarge`] before anything is consumed.
    pub fn next_int(&mut self, width: usize) -> Result<u32> {
        if width > MAX_INT_WIDTH {
            return Err(StegError::WidthTooLarge(width));
        }
        self.ensure(width)?;
        let value = self.peek_int(width);
        self.advance(width);
        Ok(value)
    }

    pub fn next_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let bits = count.checked_mul(8).ok_or(StegError::InsufficientBits {
            requested: usize::MAX,
            available: self.len(),
        })?;
        self.ensure(bits)?;

        let out = if self.start % 8 == 0 {
            let first = self.start / 8;
            self.bytes[first..first + count].to_vec()
        } else {
            (0..count)
                .map(|i| {
                    let pos = self.start + i * 8;
                    (pos..pos + 8).fold(0u8, |acc, p| (acc << 1) | u8::from(self.bit_at(p)))
                })
                .collect()
        };
        self.advance(bits);
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Whole-buffer operations
    // ------------------------------------------------------------------

    /// Append `pad_bit` until the length is a multiple of 8 (`target_len == 0`)
    /// or equals `target_len`. The buffer never shrinks.
    pub fn pad_to_boundary(&mut self, pad_bit: bool, target_len: usize) -> Result<&mut Self> {
        if target_len == 0 {
            while self.len() % 8 != 0 {
                self.push(pad_bit);
            }
            return Ok(self);
        }

        if target_len < self.len() {
            return Err(StegError::PadTarget {
                target: target_len,
                len: self.len(),
            });
        }
        while self.len() < target_len {
            self.push(pad_bit);
        }
        Ok(self)
    }

    /// Bit-reverse the whole stream (`whole`) or each byte independently
    pub fn reverse(&mut self, whole: bool) -> Result<&mut Self> {
        let bytes = self.to_bytes()?;
        *self = BitBuffer::from_bytes(&codec::binary_reverse(&bytes, whole));
        Ok(self)
    }

    /// Copy the content out as bytes without consuming it
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.len() % 8 != 0 {
            return Err(StegError::NotByteAligned(self.len()));
        }
        if self.start % 8 == 0 {
            let first = self.start / 8;
            return Ok(self.bytes[first..first + self.len() / 8].to_vec());
        }
        self.clone().next_bytes(self.len() / 8)
    }

    pub fn to_hex(&self) -> Result<String> {
        Ok(codec::bytes_to_hex(&self.to_bytes()?))
    }
}

fn check_fits(value: u32, width: usize) -> Result<()> {
    if width < 32 && u64::from(value) >> width != 0 {
        return Err(StegError::Width {
            value: u64::from(value),
            width,
        });
    }
    Ok(())
}

impl PartialEq for BitBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for BitBuffer {}

impl FromIterator<bool> for BitBuffer {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut buffer = BitBuffer::new();
        buffer.extend(iter);
        buffer
    }
}

impl Extend<bool> for BitBuffer {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        for bit in iter {
            self.push(bit);
        }
    }
}

/// Renders each byte as `bbbbbbbb(HH)`; a trailing partial byte is shown
/// zero-padded.
impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: Vec<bool> = self.iter().collect();
        for (i, chunk) in bits.chunks(8).enumerate() {
            let byte = chunk
                .iter()
                .chain(std::iter::repeat(&false))
                .take(8)
                .fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit));
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:08b}({:02X})", byte, byte)?;
        }
        Ok(())
    }
}
