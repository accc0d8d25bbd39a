//! In-memory representation of a CAN-simple frame, plus conversions to and
//! from any HAL frame implementing [`embedded_can::Frame`].
use crate::core::{Payload, PAYLOAD_LEN};
use crate::protocol::transport::can_id::CanId;
use embedded_can::{ExtendedId, Id, StandardId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw frame as read from / written to the CAN bus.
pub struct CanFrame {
    /// Arbitration identifier (11-bit standard or 29-bit extended).
    pub id: CanId,
    /// `true` for 29-bit identifiers. Standard and extended frames are
    /// independent address spaces.
    pub extended: bool,
    /// Remote transmission request: a query carrying no meaningful payload.
    pub remote_request: bool,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: Payload,
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// Build a data frame; `data` is zero-padded (and clamped) to eight bytes.
    pub fn new(id: CanId, extended: bool, data: &[u8]) -> Self {
        let len = data.len().min(PAYLOAD_LEN);
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[..len].copy_from_slice(&data[..len]);
        Self {
            id,
            extended,
            remote_request: false,
            data: payload,
            len,
        }
    }

    /// Build a remote request (query) frame.
    pub fn remote(id: CanId, extended: bool) -> Self {
        Self {
            id,
            extended,
            remote_request: true,
            data: [0; PAYLOAD_LEN],
            len: 0,
        }
    }

    /// Full 8-byte response frame, as every outgoing frame of the protocol is.
    pub fn response(id: CanId, extended: bool, data: Payload) -> Self {
        Self {
            id,
            extended,
            remote_request: false,
            data,
            len: PAYLOAD_LEN,
        }
    }

    /// Valid payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len.min(PAYLOAD_LEN)]
    }

    /// Convert a HAL frame received from the bus.
    pub fn from_embedded<F: embedded_can::Frame>(frame: &F) -> Self {
        let (raw, extended) = match frame.id() {
            Id::Standard(id) => (id.as_raw() as u32, false),
            Id::Extended(id) => (id.as_raw(), true),
        };
        if frame.is_remote_frame() {
            let mut converted = Self::remote(CanId(raw), extended);
            converted.len = frame.dlc().min(PAYLOAD_LEN);
            converted
        } else {
            Self::new(CanId(raw), extended, frame.data())
        }
    }

    /// Convert into a HAL frame. Returns `None` when the identifier does not fit
    /// the requested format (11 or 29 bits).
    pub fn to_embedded<F: embedded_can::Frame>(&self) -> Option<F> {
        let id: Id = if self.extended {
            ExtendedId::new(self.id.raw())?.into()
        } else {
            StandardId::new(u16::try_from(self.id.raw()).ok()?)?.into()
        };
        if self.remote_request {
            F::new_remote(id, self.len)
        } else {
            F::new(id, self.payload())
        }
    }
}
