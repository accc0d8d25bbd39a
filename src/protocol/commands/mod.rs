//! Static command table: maps each 5-bit command id to its semantic command,
//! its direction, and its payload layout.
//!
//! The table is a plain array indexed by command id, built at compile time and
//! never mutated. A slot holding `None` is a reserved / unknown id: frames
//! carrying it are accepted and ignored.
use crate::core::{validate_layout, SignalDescriptor};
use crate::error::SignalError;
use crate::infra::codec::traits::SignalLayout;
use crate::protocol::messages::{
    EncoderCount, ErrorReport, Estimates, Heartbeat, Iq, SetAxisNodeId, SetAxisRequestedState,
    SetControllerModes, SetInputPos, SetInputTorque, SetInputVel, SetLinearCount,
    SetPeriodicUpdate, SetTrajAccelLimits, SetTrajInertia, SetTrajVelLimit, SetVelLimit,
    VbusVoltage,
};
use crate::protocol::transport::can_id::CMD_ID_MASK;

/// Size of the command id space.
pub const COMMAND_COUNT: usize = (CMD_ID_MASK + 1) as usize;

/// Every command understood by the node, with its wire id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    NmtControl = 0x00,
    Heartbeat = 0x01,
    Estop = 0x02,
    GetMotorError = 0x03,
    GetEncoderError = 0x04,
    GetSensorlessError = 0x05,
    SetAxisNodeId = 0x06,
    SetAxisRequestedState = 0x07,
    SetAxisStartupConfig = 0x08,
    GetEncoderEstimates = 0x09,
    GetEncoderCount = 0x0A,
    SetControllerModes = 0x0B,
    SetInputPos = 0x0C,
    SetInputVel = 0x0D,
    SetInputTorque = 0x0E,
    SetVelLimit = 0x0F,
    StartAnticogging = 0x10,
    SetTrajVelLimit = 0x11,
    SetTrajAccelLimits = 0x12,
    SetTrajInertia = 0x13,
    GetIq = 0x14,
    GetSensorlessEstimates = 0x15,
    Reboot = 0x16,
    GetVbusVoltage = 0x17,
    ClearErrors = 0x18,
    SetLinearCount = 0x19,
    SetPeriodicUpdate = 0x1A,
}

impl Command {
    /// Wire command id.
    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Resolve a command id through the table.
    pub fn from_id(command_id: u8) -> Option<Self> {
        lookup(command_id).map(|desc| desc.command)
    }
}

/// Direction / semantics of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Payload decoded into axis state on receipt.
    Control,
    /// Answered with a data frame when received as a remote request.
    QueryResponse,
    /// Sent by the node on its own (heartbeat); never answered on request.
    Broadcast,
    /// Side effect without payload.
    Action,
    /// Accepted for interoperability, no effect.
    Reserved,
}

/// One entry of the command table.
#[derive(Debug, Clone, Copy)]
pub struct CommandDescriptor {
    pub command: Command,
    pub kind: CommandKind,
    /// Payload layout (empty for actions and reserved ids).
    pub layout: &'static [SignalDescriptor],
}

impl CommandDescriptor {
    const fn new(command: Command, kind: CommandKind, layout: &'static [SignalDescriptor]) -> Self {
        Self {
            command,
            kind,
            layout,
        }
    }

    /// Commands with an outgoing encoder can be requested periodically.
    #[inline]
    pub fn is_subscribable(&self) -> bool {
        matches!(self.kind, CommandKind::QueryResponse | CommandKind::Broadcast)
    }
}

const NO_PAYLOAD: &[SignalDescriptor] = &[];

const fn entry(
    command: Command,
    kind: CommandKind,
    layout: &'static [SignalDescriptor],
) -> Option<CommandDescriptor> {
    Some(CommandDescriptor::new(command, kind, layout))
}

/// The command table, indexed by command id.
pub static COMMAND_TABLE: [Option<CommandDescriptor>; COMMAND_COUNT] = {
    use CommandKind::*;
    let mut table: [Option<CommandDescriptor>; COMMAND_COUNT] = [None; COMMAND_COUNT];
    table[0x00] = entry(Command::NmtControl, Reserved, NO_PAYLOAD);
    table[0x01] = entry(Command::Heartbeat, Broadcast, Heartbeat::LAYOUT);
    table[0x02] = entry(Command::Estop, Action, NO_PAYLOAD);
    table[0x03] = entry(Command::GetMotorError, QueryResponse, ErrorReport::LAYOUT);
    table[0x04] = entry(Command::GetEncoderError, QueryResponse, ErrorReport::LAYOUT);
    table[0x05] = entry(Command::GetSensorlessError, QueryResponse, ErrorReport::LAYOUT);
    table[0x06] = entry(Command::SetAxisNodeId, Control, SetAxisNodeId::LAYOUT);
    table[0x07] = entry(Command::SetAxisRequestedState, Control, SetAxisRequestedState::LAYOUT);
    table[0x08] = entry(Command::SetAxisStartupConfig, Reserved, NO_PAYLOAD);
    table[0x09] = entry(Command::GetEncoderEstimates, QueryResponse, Estimates::LAYOUT);
    table[0x0A] = entry(Command::GetEncoderCount, QueryResponse, EncoderCount::LAYOUT);
    table[0x0B] = entry(Command::SetControllerModes, Control, SetControllerModes::LAYOUT);
    table[0x0C] = entry(Command::SetInputPos, Control, SetInputPos::LAYOUT);
    table[0x0D] = entry(Command::SetInputVel, Control, SetInputVel::LAYOUT);
    table[0x0E] = entry(Command::SetInputTorque, Control, SetInputTorque::LAYOUT);
    table[0x0F] = entry(Command::SetVelLimit, Control, SetVelLimit::LAYOUT);
    table[0x10] = entry(Command::StartAnticogging, Action, NO_PAYLOAD);
    table[0x11] = entry(Command::SetTrajVelLimit, Control, SetTrajVelLimit::LAYOUT);
    table[0x12] = entry(Command::SetTrajAccelLimits, Control, SetTrajAccelLimits::LAYOUT);
    table[0x13] = entry(Command::SetTrajInertia, Control, SetTrajInertia::LAYOUT);
    table[0x14] = entry(Command::GetIq, QueryResponse, Iq::LAYOUT);
    table[0x15] = entry(Command::GetSensorlessEstimates, QueryResponse, Estimates::LAYOUT);
    table[0x16] = entry(Command::Reboot, Action, NO_PAYLOAD);
    table[0x17] = entry(Command::GetVbusVoltage, QueryResponse, VbusVoltage::LAYOUT);
    table[0x18] = entry(Command::ClearErrors, Action, NO_PAYLOAD);
    table[0x19] = entry(Command::SetLinearCount, Control, SetLinearCount::LAYOUT);
    table[0x1A] = entry(Command::SetPeriodicUpdate, Control, SetPeriodicUpdate::LAYOUT);
    table
};

/// Table lookup; `None` for unknown ids (including ids above 31).
#[inline]
pub fn lookup(command_id: u8) -> Option<&'static CommandDescriptor> {
    COMMAND_TABLE.get(command_id as usize)?.as_ref()
}

/// `true` when `command_id` may be the target of a periodic subscription.
pub fn is_subscribable(command_id: u32) -> bool {
    u8::try_from(command_id)
        .ok()
        .and_then(lookup)
        .is_some_and(CommandDescriptor::is_subscribable)
}

/// Check the whole table once: slot/command consistency and every layout.
pub fn validate_table() -> Result<(), SignalError> {
    for (slot, desc) in COMMAND_TABLE.iter().enumerate() {
        let Some(desc) = desc else { continue };
        if desc.command.id() as usize != slot {
            return Err(SignalError::MisplacedCommand {
                slot: slot as u8,
                found: desc.command.id(),
            });
        }
        validate_layout(desc.layout)?;
    }
    Ok(())
}

//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
