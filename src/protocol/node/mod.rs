//! Frame dispatcher and cyclic telemetry driver for the axes hosted by one
//! node.
//!
//! [`Node::route`] and [`Node::poll_cyclic`] are synchronous and never touch
//! the bus; [`Node::handle_frame`] and [`Node::send_cyclic`] wrap them around a
//! [`CanBus`]. Every handler runs to completion before the next frame is
//! looked at.
use crate::{
    error::{CodecError, ProtocolError, SignalError},
    protocol::{
        axis::{Axis, AxisError, AxisEvents},
        commands::{self, Command, CommandKind},
        periodic::PERIODIC_SLOTS,
        transport::{can_frame::CanFrame, can_id::CanId, traits::can_bus::CanBus},
    },
};

mod handlers;
pub mod service;
pub mod shared;

//==================================================================================DISPATCH

/// Outcome of routing one incoming frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// No hosted axis owns the `(node id, format)` pair.
    Unroutable,
    /// Routed, but nothing to do: unknown id, reserved id, broadcast, or a
    /// query without the remote-request flag.
    Ignored,
    /// Control payload or action applied to the axis.
    Applied,
    /// Query answered; the frame must go out on the bus.
    Respond(CanFrame),
    /// The node must restart. No response is sent.
    Restart,
}

/// Due subscriptions of one axis, snapshotted before any frame goes out.
#[derive(Clone, Copy)]
pub(crate) struct DueSlots {
    slots: [(usize, u8); PERIODIC_SLOTS],
    len: usize,
}

impl DueSlots {
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.slots[..self.len].iter().copied()
    }
}

//==================================================================================NODE

/// The axes hosted by this node plus node-wide measurements.
pub struct Node<E: AxisEvents, const AXES: usize> {
    axes: [Axis<E>; AXES],
    /// DC bus voltage, shared by every axis.
    pub vbus_voltage: f32,
}

impl<E: AxisEvents, const AXES: usize> Node<E, AXES> {
    /// Build the node. The command table is validated once here.
    pub fn new(axes: [Axis<E>; AXES]) -> Result<Self, SignalError> {
        commands::validate_table()?;
        Ok(Self {
            axes,
            vbus_voltage: 0.0,
        })
    }

    pub fn axes(&self) -> &[Axis<E>; AXES] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Axis<E>; AXES] {
        &mut self.axes
    }

    /// First axis owning `(node_id, extended)`.
    pub fn find_axis(&self, node_id: u32, extended: bool) -> Option<usize> {
        self.axes.iter().position(|axis| axis.matches(node_id, extended))
    }

    /// Route one incoming frame and apply it.
    pub fn route(&mut self, frame: &CanFrame) -> Result<Dispatch, CodecError> {
        let node_id = frame.id.node_id();
        let command_id = frame.id.command_id();

        let Some(index) = self.find_axis(node_id, frame.extended) else {
            #[cfg(feature = "defmt")]
            defmt::trace!("no axis for node {} (extended: {})", node_id, frame.extended);
            return Ok(Dispatch::Unroutable);
        };

        self.axes[index].events.watchdog_feed();

        let Some(desc) = commands::lookup(command_id) else {
            #[cfg(feature = "defmt")]
            defmt::trace!("unknown command {:#x} for node {}", command_id, node_id);
            return Ok(Dispatch::Ignored);
        };

        match desc.kind {
            CommandKind::Control => {
                handlers::apply_control(&mut self.axes[index], desc.command, &frame.data)?;
                Ok(Dispatch::Applied)
            }
            CommandKind::QueryResponse if frame.remote_request => {
                match self.telemetry_frame(index, desc.command)? {
                    Some(response) => Ok(Dispatch::Respond(response)),
                    None => Ok(Dispatch::Ignored),
                }
            }
            CommandKind::QueryResponse => Ok(Dispatch::Ignored),
            CommandKind::Action => Ok(self.apply_action(index, desc.command)),
            CommandKind::Broadcast | CommandKind::Reserved => Ok(Dispatch::Ignored),
        }
    }

    fn apply_action(&mut self, index: usize, command: Command) -> Dispatch {
        match command {
            Command::Estop => {
                #[cfg(feature = "defmt")]
                defmt::warn!("e-stop requested on node {}", self.axes[index].node_id());
                self.axes[index].error.insert(AxisError::ESTOP_REQUESTED);
                Dispatch::Applied
            }
            Command::StartAnticogging => {
                self.axes[index].events.start_anticogging_calibration();
                Dispatch::Applied
            }
            Command::ClearErrors => {
                self.clear_errors();
                Dispatch::Applied
            }
            Command::Reboot => {
                #[cfg(feature = "defmt")]
                defmt::info!("restart requested");
                Dispatch::Restart
            }
            _ => Dispatch::Ignored,
        }
    }

    /// Clear the error state of every hosted axis.
    pub fn clear_errors(&mut self) {
        for axis in self.axes.iter_mut() {
            axis.clear_errors();
        }
    }

    /// Outgoing frame of `command` for the axis at `index`, carrying the axis's
    /// own node id and format.
    pub fn telemetry_frame(
        &self,
        index: usize,
        command: Command,
    ) -> Result<Option<CanFrame>, CodecError> {
        let Some(axis) = self.axes.get(index) else {
            return Ok(None);
        };
        let payload = handlers::telemetry(axis, self.vbus_voltage, command)?;
        Ok(payload.map(|data| {
            CanFrame::response(CanId::new(axis.node_id(), command.id()), axis.is_extended(), data)
        }))
    }

    /// Route `frame` and send the response, if any.
    pub async fn handle_frame<C: CanBus>(
        &mut self,
        bus: &mut C,
        frame: &CanFrame,
    ) -> Result<Dispatch, ProtocolError<C::Error>> {
        let dispatch = self.route(frame)?;
        if let Dispatch::Respond(response) = &dispatch {
            bus.send(response).await.map_err(ProtocolError::Send)?;
        }
        Ok(dispatch)
    }

    //==============================================================================CYCLIC

    pub(crate) fn due_slots(&self, index: usize, now_ms: u32) -> DueSlots {
        let mut due = DueSlots {
            slots: [(0, 0); PERIODIC_SLOTS],
            len: 0,
        };
        if let Some(axis) = self.axes.get(index) {
            for (dst, src) in due.slots.iter_mut().zip(axis.config.can.periodic.due(now_ms)) {
                *dst = src;
                due.len += 1;
            }
        }
        due
    }

    /// Record a fire time, provided `slot` still holds `command_id`.
    pub(crate) fn record_fire(&mut self, index: usize, slot: usize, command_id: u8, now_ms: u32) {
        let Some(axis) = self.axes.get_mut(index) else {
            return;
        };
        let periodic = &mut axis.config.can.periodic;
        if periodic.active().get(slot).map(|e| e.command_id) == Some(command_id) {
            periodic.mark_fired(slot, now_ms);
        }
    }

    /// Build the frame for one due entry; failures are logged and skipped.
    fn cyclic_frame(&self, index: usize, command_id: u8) -> Option<CanFrame> {
        let command = Command::from_id(command_id)?;
        match self.telemetry_frame(index, command) {
            Ok(frame) => frame,
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("cannot encode periodic {:#x}", command_id);
                None
            }
        }
    }

    /// Scan every subscription table and hand each due frame to `sink`.
    ///
    /// The fire time is only recorded when `sink` accepts the frame, so a
    /// refused frame is retried on the next scan. Returns the number of frames
    /// accepted.
    pub fn poll_cyclic<F, Err>(&mut self, now_ms: u32, mut sink: F) -> usize
    where
        F: FnMut(&CanFrame) -> Result<(), Err>,
    {
        let mut sent = 0;
        for index in 0..AXES {
            let due = self.due_slots(index, now_ms);
            for (slot, command_id) in due.iter() {
                let Some(frame) = self.cyclic_frame(index, command_id) else {
                    continue;
                };
                match sink(&frame) {
                    Ok(()) => {
                        self.record_fire(index, slot, command_id, now_ms);
                        sent += 1;
                    }
                    Err(_) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("periodic {:#x} not sent, retrying", command_id);
                    }
                }
            }
        }
        sent
    }

    /// Async counterpart of [`Node::poll_cyclic`] sending on `bus`.
    pub async fn send_cyclic<C: CanBus>(&mut self, bus: &mut C, now_ms: u32) -> usize {
        let mut sent = 0;
        for index in 0..AXES {
            let due = self.due_slots(index, now_ms);
            for (slot, command_id) in due.iter() {
                let Some(frame) = self.cyclic_frame(index, command_id) else {
                    continue;
                };
                match bus.send(&frame).await {
                    Ok(()) => {
                        self.record_fire(index, slot, command_id, now_ms);
                        sent += 1;
                    }
                    Err(_err) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("periodic {:#x} not sent, retrying", command_id);
                    }
                }
            }
        }
        sent
    }
}

//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
