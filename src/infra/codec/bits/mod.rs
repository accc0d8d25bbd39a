//! Low-level components dedicated to bit manipulation for CAN payloads.
//! Fields are addressed LSB-first: bit `n` is bit `n % 8` of byte `n / 8`.
use crate::error::{BitReaderError, BitWriterError};

/// Reader extracting bit segments from a `&[u8]` without copies.
pub struct BitReader<'a> {
    buffer: &'a [u8],
    /// Current index expressed as number of bits from the beginning.
    bit_cursor: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the start of the buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::at(buffer, 0)
    }

    /// Create a reader positioned at an absolute bit offset.
    pub fn at(buffer: &'a [u8], bit_cursor: usize) -> Self {
        Self { buffer, bit_cursor }
    }

    pub fn bit_cursor(&self) -> usize {
        self.bit_cursor
    }

    fn check(&self, num_bits: u8) -> Result<(), BitReaderError> {
        if !(1..=64).contains(&num_bits) {
            return Err(BitReaderError::TooLongForType {
                max: 64,
                asked: num_bits,
            });
        }
        let buffer_len_bits = self.buffer.len() * 8;
        if self.bit_cursor + num_bits as usize > buffer_len_bits {
            return Err(BitReaderError::OutOfBounds {
                asked: num_bits as usize,
                available: buffer_len_bits.saturating_sub(self.bit_cursor),
            });
        }
        Ok(())
    }

    /// Read `num_bits` (1..=64) bits at the cursor and advance it.
    pub fn read_u64(&mut self, num_bits: u8) -> Result<u64, BitReaderError> {
        self.check(num_bits)?;

        let mut result: u64 = 0;
        let mut bits_read: usize = 0;
        let num_bits = num_bits as usize;

        while bits_read < num_bits {
            let position = self.bit_cursor + bits_read;
            let byte = self.buffer[position / 8];
            let shift = position % 8;

            // Bits still available in this byte.
            let chunk = (8 - shift).min(num_bits - bits_read);
            let mask = ((1u16 << chunk) - 1) as u8;

            result |= (((byte >> shift) & mask) as u64) << bits_read;
            bits_read += chunk;
        }

        self.bit_cursor += num_bits;
        Ok(result)
    }

    /// Read up to 32 bits.
    pub fn read_u32(&mut self, num_bits: u8) -> Result<u32, BitReaderError> {
        if num_bits > 32 {
            return Err(BitReaderError::TooLongForType {
                max: 32,
                asked: num_bits,
            });
        }
        self.read_u64(num_bits).map(|val| val as u32)
    }
}
//==================================================================================BITWRITER

/// Writer laying bit segments into a `&mut [u8]`. Bits outside the written
/// range are preserved.
pub struct BitWriter<'a> {
    buffer: &'a mut [u8],
    bit_cursor: usize,
}

impl<'a> BitWriter<'a> {
    /// Create a writer positioned at the start of the buffer.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self::at(buffer, 0)
    }

    /// Create a writer positioned at an absolute bit offset.
    pub fn at(buffer: &'a mut [u8], bit_cursor: usize) -> Self {
        Self { buffer, bit_cursor }
    }

    pub fn bit_cursor(&self) -> usize {
        self.bit_cursor
    }

    /// Write the low `num_bits` (1..=64) bits of `value` and advance the cursor.
    /// Higher bits of `value` are discarded.
    pub fn write_u64(&mut self, value: u64, num_bits: u8) -> Result<(), BitWriterError> {
        if !(1..=64).contains(&num_bits) {
            return Err(BitWriterError::TooLongForType {
                max: 64,
                asked: num_bits,
            });
        }

        let buffer_len_bits = self.buffer.len() * 8;
        if self.bit_cursor + num_bits as usize > buffer_len_bits {
            return Err(BitWriterError::OutOfBounds {
                asked: num_bits as usize,
                available: buffer_len_bits.saturating_sub(self.bit_cursor),
            });
        }

        let mut remaining = value;
        let mut bits_written: usize = 0;
        let num_bits = num_bits as usize;

        while bits_written < num_bits {
            let position = self.bit_cursor + bits_written;
            let index = position / 8;
            let shift = position % 8;

            let chunk = (8 - shift).min(num_bits - bits_written);
            let mask = ((1u16 << chunk) - 1) as u8;

            // Clear then set only the bits owned by the field.
            self.buffer[index] &= !(mask << shift);
            self.buffer[index] |= (remaining as u8 & mask) << shift;

            remaining = remaining.checked_shr(chunk as u32).unwrap_or(0);
            bits_written += chunk;
        }

        self.bit_cursor += num_bits;
        Ok(())
    }

    /// Write up to 32 bits.
    pub fn write_u32(&mut self, value: u32, num_bits: u8) -> Result<(), BitWriterError> {
        if num_bits > 32 {
            return Err(BitWriterError::TooLongForType {
                max: 32,
                asked: num_bits,
            });
        }
        self.write_u64(value as u64, num_bits)
    }
}
