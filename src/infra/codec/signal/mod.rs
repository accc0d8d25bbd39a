//! Signal engine: reads and writes one scaled value inside an 8-byte payload,
//! driven by a static [`SignalDescriptor`].
//!
//! Little-endian signals are addressed LSB-first through [`BitReader`] /
//! [`BitWriter`]. Big-endian signals treat the payload as one big-endian
//! 64-bit word: reversing the bytes turns that word into a little-endian one,
//! where the field starts at bit `64 - bit_offset - bit_length`.
//!
//! Descriptors are trusted here: layouts are validated once when the node is
//! built, and the bit layer still refuses any access past the payload.
use super::bits::{BitReader, BitWriter};
use crate::core::{
    round_to_i64, ByteOrder, Payload, SignalDescriptor, SignalKind, SignalValue, PAYLOAD_BITS,
};
use crate::error::CodecError;

/// Decode the value described by `desc` from `payload`.
///
/// * integer fields without transform return exact `U64` / `I64`;
/// * fixed-point fields return `raw * scale + offset` (`F32` up to 32 bits,
///   `F64` beyond);
/// * float fields reinterpret the raw IEEE-754 pattern.
pub fn decode(payload: &Payload, desc: &SignalDescriptor) -> Result<SignalValue, CodecError> {
    let raw = read_raw(payload, desc)?;

    let value = match desc.kind {
        SignalKind::Float => {
            let value = if desc.bit_length == 32 {
                SignalValue::F32(f32::from_bits(raw as u32))
            } else {
                SignalValue::F64(f64::from_bits(raw))
            };
            if desc.is_identity() {
                value
            } else {
                apply_transform(value.as_f64(), desc)
            }
        }
        SignalKind::Signed => {
            let signed = sign_extend(raw, desc.bit_length);
            if desc.is_identity() {
                SignalValue::I64(signed)
            } else {
                apply_transform(signed as f64, desc)
            }
        }
        SignalKind::Unsigned => {
            if desc.is_identity() {
                SignalValue::U64(raw)
            } else {
                apply_transform(raw as f64, desc)
            }
        }
    };

    Ok(value)
}

/// Encode `value` into the bit range described by `desc`.
///
/// Writes `round((value - offset) / scale)` (or the float bit pattern) and
/// never touches bits outside `[bit_offset, bit_offset + bit_length)`.
/// Integer raw values beyond the field range saturate to its nearest bound.
pub fn encode(
    payload: &mut Payload,
    desc: &SignalDescriptor,
    value: impl Into<SignalValue>,
) -> Result<(), CodecError> {
    let value = value.into();

    let raw = match desc.kind {
        SignalKind::Float => {
            let physical = if desc.is_identity() {
                value
            } else {
                SignalValue::F64((value.as_f64() - desc.offset as f64) / desc.scale as f64)
            };
            if desc.bit_length == 32 {
                physical.as_f32().to_bits() as u64
            } else {
                physical.as_f64().to_bits()
            }
        }
        SignalKind::Signed | SignalKind::Unsigned => {
            let raw = if desc.is_identity() {
                integer_raw(value, desc)?
            } else {
                let scaled = (value.as_f64() - desc.offset as f64) / desc.scale as f64;
                round_to_i64(scaled) as i128
            };
            saturate(raw, desc)
        }
    };

    write_raw(payload, desc, raw)?;
    Ok(())
}

//==================================================================================RAW_ACCESS

fn read_raw(payload: &Payload, desc: &SignalDescriptor) -> Result<u64, CodecError> {
    match desc.byte_order {
        ByteOrder::LittleEndian => {
            Ok(BitReader::at(payload, desc.bit_offset as usize).read_u64(desc.bit_length)?)
        }
        ByteOrder::BigEndian => {
            let mut reversed = *payload;
            reversed.reverse();
            Ok(BitReader::at(&reversed, motorola_start(desc)).read_u64(desc.bit_length)?)
        }
    }
}

fn write_raw(payload: &mut Payload, desc: &SignalDescriptor, raw: u64) -> Result<(), CodecError> {
    match desc.byte_order {
        ByteOrder::LittleEndian => {
            BitWriter::at(payload, desc.bit_offset as usize).write_u64(raw, desc.bit_length)?
        }
        ByteOrder::BigEndian => {
            payload.reverse();
            let written =
                BitWriter::at(payload, motorola_start(desc)).write_u64(raw, desc.bit_length);
            payload.reverse();
            written?
        }
    }
    Ok(())
}

/// LSB position of a big-endian field once the payload bytes are reversed.
/// A field ending past the payload starts past its end, so the bit layer
/// rejects it.
#[inline]
fn motorola_start(desc: &SignalDescriptor) -> usize {
    PAYLOAD_BITS
        .checked_sub(desc.bit_end())
        .unwrap_or(PAYLOAD_BITS) as usize
}

//==================================================================================CONVERSIONS

fn apply_transform(raw: f64, desc: &SignalDescriptor) -> SignalValue {
    let physical = raw * desc.scale as f64 + desc.offset as f64;
    if desc.bit_length <= 32 {
        SignalValue::F32(physical as f32)
    } else {
        SignalValue::F64(physical)
    }
}

/// Integer value for an untransformed field. Floats are only accepted when
/// they hold an integral value.
fn integer_raw(value: SignalValue, desc: &SignalDescriptor) -> Result<i128, CodecError> {
    match value {
        SignalValue::U64(v) => Ok(v as i128),
        SignalValue::I64(v) => Ok(v as i128),
        SignalValue::F32(v) if v as f64 == round_to_i64(v as f64) as f64 => {
            Ok(value.as_i64() as i128)
        }
        SignalValue::F64(v) if v == round_to_i64(v) as f64 => Ok(value.as_i64() as i128),
        _ => Err(CodecError::DataTypeMismatch {
            value,
            signal: desc.name,
        }),
    }
}

/// Clamp to the field range and return its two's complement bits.
fn saturate(raw: i128, desc: &SignalDescriptor) -> u64 {
    let bits = desc.bit_length.clamp(1, 64) as u32;
    let (min, max) = match desc.kind {
        SignalKind::Signed => (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1),
        _ => (0, (1i128 << bits) - 1),
    };
    raw.clamp(min, max) as u64
}

/// Two's complement helper: propagate the top bit of a `bits`-wide field.
fn sign_extend(value: u64, bits: u8) -> i64 {
    if bits >= 64 {
        return value as i64;
    }
    let sign_bit = 1u64 << (bits - 1);
    if value & sign_bit != 0 {
        (value | (u64::MAX << bits)) as i64
    } else {
        value as i64
    }
}

//==================================================================================TESTS
