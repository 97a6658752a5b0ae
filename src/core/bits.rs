//! # Bit-Field Reader
//!
//! Non-byte-aligned field extraction over a raw byte buffer.
//!
//! Every protocol decoder in this crate is written as a sequence of reads
//! against a [`BitCursor`]: the cursor tracks a running bit offset, and each
//! read pulls an arbitrary-width field out of the buffer as an integer or as a
//! raw byte range. Implementing the bit arithmetic once here keeps the manual
//! shifting logic out of the protocol decoders entirely.
//!
//! ## Semantics
//! - Bit 0 is the most significant bit of byte 0 (network bit order).
//! - Integer reads return the field value right-aligned in the result type.
//! - Byte-range reads return `ceil(width / 8)` bytes with the field value
//!   right-aligned in the output (a leading partial byte holds `width % 8`
//!   bits).
//! - Any read whose `offset + width` exceeds the buffer length in bits fails
//!   with [`DecodeError::TruncatedBuffer`] and consumes nothing.
//!
//! All operations are pure computation over the borrowed buffer.

use crate::error::{DecodeError, Result};

/// A forward-only cursor for extracting bit fields from a byte buffer.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitCursor<'a> {
    /// Create a cursor positioned at bit 0 of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a cursor positioned at `bit_offset`.
    ///
    /// The offset may point past the end of the buffer; the first read will
    /// then fail with `TruncatedBuffer` rather than this constructor.
    pub fn at(data: &'a [u8], bit_offset: usize) -> Self {
        Self {
            data,
            pos: bit_offset,
        }
    }

    /// Current position in bits from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current position in whole bytes, rounding down.
    pub fn byte_position(&self) -> usize {
        self.pos / 8
    }

    /// Bits left between the current position and the end of the buffer.
    pub fn remaining_bits(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.pos)
    }

    /// Advance the cursor by `width` bits without reading.
    pub fn skip(&mut self, width: usize) -> Result<()> {
        self.check(width)?;
        self.pos += width;
        Ok(())
    }

    /// Move the cursor to an absolute bit offset.
    ///
    /// Like [`BitCursor::at`], the offset may point past the end; the next
    /// read fails rather than this call.
    pub fn seek(&mut self, bit_offset: usize) {
        self.pos = bit_offset;
    }

    fn check(&self, width: usize) -> Result<()> {
        let available = self.data.len() * 8;
        if self.pos + width > available {
            return Err(DecodeError::TruncatedBuffer {
                offset: self.pos,
                width,
                available: available.saturating_sub(self.pos),
            });
        }
        Ok(())
    }

    /// Unchecked read of up to 64 bits. Callers must have run `check` first.
    fn take(&mut self, width: usize) -> u64 {
        debug_assert!(width <= 64);
        let mut value = 0u64;
        for _ in 0..width {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | u64::from(bit);
            self.pos += 1;
        }
        value
    }

    /// Read `width` bits (1..=8) as a `u8`.
    pub fn read_u8(&mut self, width: usize) -> Result<u8> {
        debug_assert!(width >= 1 && width <= 8);
        self.check(width)?;
        Ok(self.take(width) as u8)
    }

    /// Read `width` bits (1..=16) as a `u16`.
    pub fn read_u16(&mut self, width: usize) -> Result<u16> {
        debug_assert!(width >= 1 && width <= 16);
        self.check(width)?;
        Ok(self.take(width) as u16)
    }

    /// Read `width` bits (1..=32) as a `u32`.
    pub fn read_u32(&mut self, width: usize) -> Result<u32> {
        debug_assert!(width >= 1 && width <= 32);
        self.check(width)?;
        Ok(self.take(width) as u32)
    }

    /// Read `width` bits (1..=64) as a `u64`.
    pub fn read_u64(&mut self, width: usize) -> Result<u64> {
        debug_assert!(width >= 1 && width <= 64);
        self.check(width)?;
        Ok(self.take(width))
    }

    /// Read a single bit as a flag.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.check(1)?;
        Ok(self.take(1) == 1)
    }

    /// Read `width` bits as a raw byte range, right-aligned.
    ///
    /// Used for fields wider than a machine word (addresses) and for opaque
    /// data runs (IPv4 options, extension-header bodies). When the read is
    /// byte-aligned this is a straight copy of the underlying slice.
    pub fn read_bytes(&mut self, width: usize) -> Result<Vec<u8>> {
        self.check(width)?;

        // Fast path for the common byte-aligned case.
        if self.pos % 8 == 0 && width % 8 == 0 {
            let start = self.pos / 8;
            let end = start + width / 8;
            self.pos += width;
            return Ok(self.data[start..end].to_vec());
        }

        let num_bytes = width.div_ceil(8);
        let mut out = vec![0u8; num_bytes];
        let lead = width % 8;
        let mut idx = 0;
        if lead != 0 {
            out[0] = self.take(lead) as u8;
            idx = 1;
        }
        for slot in out.iter_mut().skip(idx) {
            *slot = self.take(8) as u8;
        }
        Ok(out)
    }
}

/// One-off read of `width` bits at `start_bit`, without constructing a cursor
/// at the call site.
pub fn get_bits(data: &[u8], start_bit: usize, width: usize) -> Result<Vec<u8>> {
    BitCursor::at(data, start_bit).read_bytes(width)
}
