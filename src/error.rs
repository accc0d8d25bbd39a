//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (layout validation, bit-level
//! access, value conversion, transmission).
use crate::core::SignalValue;
use thiserror_no_std::Error;

//================================================================================LAYOUT_ERROR

#[derive(Error, Debug, PartialEq, Eq)]
/// A signal descriptor cannot be applied to an 8-byte payload.
///
/// Raised once at startup while validating the command table, never per frame.
pub enum SignalError {
    /// Field width outside the 1..=64 range.
    #[error("Invalid bit length {bit_length} for signal {signal}")]
    InvalidLength { signal: &'static str, bit_length: u8 },
    /// Field extends past the last payload bit.
    #[error("Signal {signal} ends at bit {bit_end}, beyond the payload")]
    OutOfPayload { signal: &'static str, bit_end: u16 },
    /// Raw float fields must be 32 or 64 bits wide.
    #[error("Float signal {signal} must be 32 or 64 bits, got {bit_length}")]
    InvalidFloatWidth { signal: &'static str, bit_length: u8 },
    /// A zero scale makes the inverse transform undefined.
    #[error("Signal {signal} has a zero scale")]
    ZeroScale { signal: &'static str },
    /// Two signals of the same layout share bits.
    #[error("Signals {first} and {second} overlap")]
    Overlap {
        first: &'static str,
        second: &'static str,
    },
    /// A command table slot does not hold the command matching its index.
    #[error("Command table slot {slot} holds command {found}")]
    MisplacedCommand { slot: u8, found: u8 },
}

//================================================================================CODEC_ERROR

#[derive(Error, Debug)]
/// Failures of the signal codec.
pub enum CodecError {
    /// Bit-level read failed.
    #[error("BitReader error: {0}")]
    Read(#[from] BitReaderError),
    /// Bit-level write failed.
    #[error("BitWriter error: {0}")]
    Write(#[from] BitWriterError),
    /// Value cannot be represented by the descriptor.
    #[error("Data type mismatch for value {value:?} in {signal}")]
    DataTypeMismatch {
        value: SignalValue,
        signal: &'static str,
    },
}

//================================================================================PROTOCOL_ERROR

#[derive(Error, Debug)]
/// Errors surfaced while dispatching a frame or firing periodic telemetry.
pub enum ProtocolError<E: core::fmt::Debug> {
    /// Encoding or decoding a payload failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// CAN layer refused or failed to send the frame.
    #[error("CAN bus send error: {0:?}")]
    Send(E),
    /// Unable to receive frames from the bus.
    #[error("CAN bus receive error: {0:?}")]
    Receive(E),
}

//==================================================================================BITREADER_ERRORS
#[derive(Debug, Error, PartialEq, Eq)]
/// Errors raised during bitwise buffer reads.
pub enum BitReaderError {
    /// Attempted to read past the end of the buffer.
    #[error("Attempted to read out of bounds -> asked: {asked}, available: {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Requested more bits than the target type can hold.
    #[error("Cannot read more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}
//==================================================================================BITWRITER_ERRORS
#[derive(Debug, Error, PartialEq, Eq)]
/// Errors raised during bitwise writes into a buffer.
pub enum BitWriterError {
    /// Attempted to write beyond the provided capacity.
    #[error("Attempted to write out of bounds -> asked: {asked}, available: {available}")]
    OutOfBounds { asked: usize, available: usize },
    /// Field is too large for the provided type.
    #[error("Cannot write more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}
