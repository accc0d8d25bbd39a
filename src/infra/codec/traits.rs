//! Public traits exposed by the codec. They decouple the typed payload
//! structures of `protocol::messages` from the signal engine and provide a
//! uniform API to the dispatcher.
use crate::core::{Payload, SignalDescriptor};
use crate::error::CodecError;

//==================================================================================LAYOUT
/// Static description of a payload: one descriptor per carried value.
pub trait SignalLayout {
    /// Ordered signal descriptors. Validated once at startup.
    const LAYOUT: &'static [SignalDescriptor];
}
//==================================================================================TO_PAYLOAD
/// Serialize a typed structure into an 8-byte payload.
pub trait ToPayload: SignalLayout {
    /// Write every signal into `payload`; bits not covered by the layout are
    /// left as they are.
    fn write_payload(&self, payload: &mut Payload) -> Result<(), CodecError>;

    /// Serialize into a fresh zero-padded payload.
    fn to_payload(&self) -> Result<Payload, CodecError> {
        let mut payload = Payload::default();
        self.write_payload(&mut payload)?;
        Ok(payload)
    }
}
//==================================================================================FROM_PAYLOAD
/// Rebuild a typed structure from an 8-byte payload.
pub trait FromPayload: SignalLayout + Sized {
    fn from_payload(payload: &Payload) -> Result<Self, CodecError>;
}
