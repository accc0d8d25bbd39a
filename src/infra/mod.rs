//! Infrastructure shared by the protocol layer: the bit-level signal codec.
pub mod codec;
