//! Defines the "data contract" between the static payload layouts
//! (`protocol::messages`) and the signal codec.
//!
//! Every layout is a `&'static [SignalDescriptor]`. The `infra::codec::signal`
//! module consumes those descriptors to read or write one value at a time
//! inside an 8-byte CAN payload.
use crate::error::SignalError;

/// Payload size of every frame handled by the protocol (classic CAN).
pub const PAYLOAD_LEN: usize = 8;
/// Total number of bits available in a payload.
pub const PAYLOAD_BITS: u16 = (PAYLOAD_LEN * 8) as u16;

/// Raw payload buffer.
pub type Payload = [u8; PAYLOAD_LEN];

/// Byte order used to lay a signal inside the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    /// Intel layout: bit 0 of the field is the LSB of the first involved byte.
    LittleEndian,
    /// Motorola layout: the payload is read as one big-endian 64-bit word.
    BigEndian,
}

/// Interpretation of the raw bits of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalKind {
    Unsigned,
    /// Two's complement, sign bit is the top bit of the field.
    Signed,
    /// Raw IEEE-754 pattern (32 or 64 bits), no fixed-point transform.
    Float,
}

/// Placement and scaling of one value inside an 8-byte payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDescriptor {
    /// Human-readable identifier (diagnostics only).
    pub name: &'static str,
    /// Position of the first bit.
    pub bit_offset: u8,
    /// Field width in bits (1..=64).
    pub bit_length: u8,
    pub byte_order: ByteOrder,
    pub kind: SignalKind,
    /// Physical value = raw * scale + offset.
    pub scale: f32,
    pub offset: f32,
}

impl SignalDescriptor {
    const fn base(name: &'static str, bit_offset: u8, bit_length: u8, kind: SignalKind) -> Self {
        Self {
            name,
            bit_offset,
            bit_length,
            byte_order: ByteOrder::LittleEndian,
            kind,
            scale: 1.0,
            offset: 0.0,
        }
    }

    /// Unsigned little-endian integer field.
    pub const fn unsigned(name: &'static str, bit_offset: u8, bit_length: u8) -> Self {
        Self::base(name, bit_offset, bit_length, SignalKind::Unsigned)
    }

    /// Signed little-endian integer field.
    pub const fn signed(name: &'static str, bit_offset: u8, bit_length: u8) -> Self {
        Self::base(name, bit_offset, bit_length, SignalKind::Signed)
    }

    /// Full-precision `f32` field.
    pub const fn float32(name: &'static str, bit_offset: u8) -> Self {
        Self::base(name, bit_offset, 32, SignalKind::Float)
    }

    /// Apply a fixed-point transform.
    pub const fn scaled(mut self, scale: f32, offset: f32) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// Switch to Motorola byte order.
    pub const fn big_endian(mut self) -> Self {
        self.byte_order = ByteOrder::BigEndian;
        self
    }

    /// `true` when no fixed-point transform is configured.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }

    /// Exclusive end of the bit range.
    #[inline]
    pub fn bit_end(&self) -> u16 {
        self.bit_offset as u16 + self.bit_length as u16
    }

    /// Check that the descriptor can be applied to an 8-byte payload.
    pub fn validate(&self) -> Result<(), SignalError> {
        if !(1..=64).contains(&self.bit_length) {
            return Err(SignalError::InvalidLength {
                signal: self.name,
                bit_length: self.bit_length,
            });
        }
        if self.bit_end() > PAYLOAD_BITS {
            return Err(SignalError::OutOfPayload {
                signal: self.name,
                bit_end: self.bit_end(),
            });
        }
        if self.kind == SignalKind::Float && !matches!(self.bit_length, 32 | 64) {
            return Err(SignalError::InvalidFloatWidth {
                signal: self.name,
                bit_length: self.bit_length,
            });
        }
        if self.scale == 0.0 {
            return Err(SignalError::ZeroScale { signal: self.name });
        }
        Ok(())
    }
}

/// Validate every descriptor of a layout and reject overlapping ranges.
pub fn validate_layout(layout: &[SignalDescriptor]) -> Result<(), SignalError> {
    for (idx, desc) in layout.iter().enumerate() {
        desc.validate()?;
        for other in &layout[idx + 1..] {
            if (desc.bit_offset as u16) < other.bit_end()
                && (other.bit_offset as u16) < desc.bit_end()
            {
                return Err(SignalError::Overlap {
                    first: desc.name,
                    second: other.name,
                });
            }
        }
    }
    Ok(())
}

/// Decoded signal value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalValue {
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl SignalValue {
    /// Normalize to `f64` (used when a fixed-point transform must be applied).
    pub fn as_f64(&self) -> f64 {
        match *self {
            SignalValue::U64(v) => v as f64,
            SignalValue::I64(v) => v as f64,
            SignalValue::F32(v) => v as f64,
            SignalValue::F64(v) => v,
        }
    }

    pub fn as_f32(&self) -> f32 {
        match *self {
            SignalValue::F32(v) => v,
            other => other.as_f64() as f32,
        }
    }

    /// Integer view; floats are rounded half away from zero.
    pub fn as_i64(&self) -> i64 {
        match *self {
            SignalValue::U64(v) => v as i64,
            SignalValue::I64(v) => v,
            SignalValue::F32(v) => round_to_i64(v as f64),
            SignalValue::F64(v) => round_to_i64(v),
        }
    }

    /// Unsigned view; signed values keep their two's complement bits.
    pub fn as_u64(&self) -> u64 {
        match *self {
            SignalValue::U64(v) => v,
            other => other.as_i64() as u64,
        }
    }

    pub fn as_i32(&self) -> i32 {
        self.as_i64() as i32
    }

    pub fn as_u32(&self) -> u32 {
        self.as_u64() as u32
    }
}

impl From<u32> for SignalValue {
    fn from(value: u32) -> Self {
        SignalValue::U64(value as u64)
    }
}

impl From<u64> for SignalValue {
    fn from(value: u64) -> Self {
        SignalValue::U64(value)
    }
}

impl From<i16> for SignalValue {
    fn from(value: i16) -> Self {
        SignalValue::I64(value as i64)
    }
}

impl From<i32> for SignalValue {
    fn from(value: i32) -> Self {
        SignalValue::I64(value as i64)
    }
}

impl From<i64> for SignalValue {
    fn from(value: i64) -> Self {
        SignalValue::I64(value)
    }
}

impl From<f32> for SignalValue {
    fn from(value: f32) -> Self {
        SignalValue::F32(value)
    }
}

impl From<f64> for SignalValue {
    fn from(value: f64) -> Self {
        SignalValue::F64(value)
    }
}

/// Round half away from zero without `std` (the `as` cast truncates and saturates).
#[inline]
pub(crate) fn round_to_i64(value: f64) -> i64 {
    let truncated = value as i64;
    let remainder = value - truncated as f64;
    if remainder >= 0.5 {
        truncated.saturating_add(1)
    } else if remainder <= -0.5 {
        truncated.saturating_sub(1)
    } else {
        truncated
    }
}
