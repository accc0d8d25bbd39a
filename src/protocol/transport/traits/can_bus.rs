//! Minimal abstraction for an asynchronous CAN bus. The protocol layer never
//! touches the controller directly: it receives fully formed frames and hands
//! fully formed frames back.
use crate::protocol::transport::can_frame::CanFrame;
use futures_util::Future;

/// Contract to send and receive CAN frames asynchronously.
pub trait CanBus {
    type Error: core::fmt::Debug;
    /// Queue a frame for transmission. An `Err` means the frame was not
    /// accepted; the protocol layer never retransmits on its own.
    fn send<'a>(
        &'a mut self,
        frame: &'a CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
    /// Retrieve the next available frame. Asynchronously waits until data arrives.
    fn recv<'a>(&'a mut self) -> impl Future<Output = Result<CanFrame, Self::Error>> + 'a;
}
