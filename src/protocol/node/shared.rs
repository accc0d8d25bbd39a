//! [`Node`] behind a blocking mutex, for firmware where frame reception and the
//! cyclic tick run in different contexts (interrupt handler, second executor).
//!
//! Each operation takes the lock for one dispatch or one scan entry. Frames are
//! built under the lock and sent once it is released, so no send ever waits
//! while holding axis state.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};

use crate::{
    error::ProtocolError,
    protocol::{
        axis::AxisEvents,
        node::{Dispatch, Node},
        transport::{can_frame::CanFrame, traits::can_bus::CanBus},
    },
};

/// Node shared between execution contexts.
pub struct SharedNode<M: RawMutex, E: AxisEvents, const AXES: usize> {
    inner: Mutex<M, RefCell<Node<E, AXES>>>,
}

impl<M: RawMutex, E: AxisEvents, const AXES: usize> SharedNode<M, E, AXES> {
    pub const fn new(node: Node<E, AXES>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(node)),
        }
    }

    /// Run `f` with exclusive access to the node.
    ///
    /// `f` must not call back into this `SharedNode`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Node<E, AXES>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Route `frame` under the lock, then send the response outside it.
    pub async fn handle_frame<C: CanBus>(
        &self,
        bus: &mut C,
        frame: &CanFrame,
    ) -> Result<Dispatch, ProtocolError<C::Error>> {
        let dispatch = self.lock(|node| node.route(frame))?;
        if let Dispatch::Respond(response) = &dispatch {
            bus.send(response).await.map_err(ProtocolError::Send)?;
        }
        Ok(dispatch)
    }

    /// Cyclic scan with one lock per entry. Returns the number of frames sent.
    pub async fn send_cyclic<C: CanBus>(&self, bus: &mut C, now_ms: u32) -> usize {
        let mut sent = 0;
        for index in 0..AXES {
            let due = self.lock(|node| node.due_slots(index, now_ms));
            for (slot, command_id) in due.iter() {
                let Some(frame) = self.lock(|node| node.cyclic_frame(index, command_id)) else {
                    continue;
                };
                match bus.send(&frame).await {
                    Ok(()) => {
                        self.lock(|node| node.record_fire(index, slot, command_id, now_ms));
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
