//! Creation and extraction of the arbitration identifiers used by the
//! CAN-simple protocol.
//!
//! ```text
//!  bit: 10        5 4       0
//!      | node id   | command |
//!      |  6 bits   | 5 bits  |
//! ```
//!
//! The codec itself does not bound the node id: only the transport (11-bit
//! standard or 29-bit extended frames) limits its width.

/// Number of low bits carrying the command id.
pub const NUM_CMD_ID_BITS: u32 = 5;
/// Mask isolating the command id.
pub const CMD_ID_MASK: u32 = (1 << NUM_CMD_ID_BITS) - 1;

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Arbitration identifier multiplexing a node id and a command id.
pub struct CanId(pub u32);

impl CanId {
    /// Join a node id and a command id: `(node_id << 5) | command_id`.
    /// The command id is masked to its 5 bits.
    pub const fn new(node_id: u32, command_id: u8) -> Self {
        CanId((node_id << NUM_CMD_ID_BITS) | (command_id as u32 & CMD_ID_MASK))
    }

    /// Node id: every bit above the command field.
    pub const fn node_id(&self) -> u32 {
        self.0 >> NUM_CMD_ID_BITS
    }

    /// Command id (0..=31).
    pub const fn command_id(&self) -> u8 {
        (self.0 & CMD_ID_MASK) as u8
    }

    /// Raw identifier value.
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl From<u32> for CanId {
    fn from(raw: u32) -> Self {
        CanId(raw)
    }
}
