//! Runner owning a [`Node`], its bus and its timer.
//!
//! One task, one loop: wait for either the next frame or the next cyclic tick,
//! handle it to completion, repeat. A steady stream of incoming frames does not
//! starve the telemetry: the scan also runs after a frame whenever a full
//! period has elapsed since the previous one. Only a receive error ends the
//! loop with an error.
use embassy_time::Duration;
use futures_util::{future::select, future::Either, pin_mut};

use crate::{
    error::ProtocolError,
    protocol::{
        axis::AxisEvents,
        node::{Dispatch, Node},
        transport::{
            can_frame::CanFrame,
            traits::{can_bus::CanBus, can_timer::CanTimer},
            DEFAULT_CYCLIC_PERIOD_MS,
        },
    },
};

/// Runner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Period of the telemetry scan.
    pub cyclic_period: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            cyclic_period: Duration::from_millis(DEFAULT_CYCLIC_PERIOD_MS),
        }
    }
}

impl RunnerConfig {
    fn period_ms(&self) -> u32 {
        u32::try_from(self.cyclic_period.as_millis())
            .unwrap_or(u32::MAX)
            .max(1)
    }
}

/// Why [`NodeRunner::drive`] returned without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunnerExit {
    /// A reboot command was received; the caller performs the reset.
    RestartRequested,
}

enum Event<E> {
    Frame(Result<CanFrame, E>),
    Tick,
}

/// Drives a node on a bus.
pub struct NodeRunner<C: CanBus, T: CanTimer, E: AxisEvents, const AXES: usize> {
    node: Node<E, AXES>,
    bus: C,
    timer: T,
    config: RunnerConfig,
}

impl<C, T, E, const AXES: usize> NodeRunner<C, T, E, AXES>
where
    C: CanBus,
    T: CanTimer,
    E: AxisEvents,
{
    pub fn new(node: Node<E, AXES>, bus: C, timer: T, config: RunnerConfig) -> Self {
        Self {
            node,
            bus,
            timer,
            config,
        }
    }

    pub fn node(&self) -> &Node<E, AXES> {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut Node<E, AXES> {
        &mut self.node
    }

    /// Give back the node, the bus and the timer.
    pub fn into_parts(self) -> (Node<E, AXES>, C, T) {
        (self.node, self.bus, self.timer)
    }

    /// Serve frames and telemetry until a restart is requested or reception fails.
    ///
    /// Codec failures on a single frame and refused responses are logged and
    /// the loop goes on; the host simply re-queries.
    pub async fn drive(&mut self) -> Result<RunnerExit, ProtocolError<C::Error>> {
        let period_ms = self.config.period_ms();
        let mut last_scan = self.timer.now_ms();

        loop {
            let elapsed = self.timer.now_ms().wrapping_sub(last_scan);
            let wait_ms = period_ms.saturating_sub(elapsed);

            let event = {
                let recv_future = self.bus.recv();
                let tick_future = self.timer.delay_ms(wait_ms);
                pin_mut!(recv_future);
                pin_mut!(tick_future);

                match select(recv_future, tick_future).await {
                    Either::Left((result, _pending_tick)) => Event::Frame(result),
                    Either::Right(((), _pending_recv)) => Event::Tick,
                }
            };

            if let Event::Frame(result) = event {
                let frame = result.map_err(ProtocolError::Receive)?;
                match self.node.handle_frame(&mut self.bus, &frame).await {
                    Ok(Dispatch::Restart) => return Ok(RunnerExit::RestartRequested),
                    Ok(_) => {}
                    Err(ProtocolError::Codec(_err)) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("dropping frame {:#x}", frame.id.raw());
                    }
                    Err(ProtocolError::Send(_err)) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("response to {:#x} not sent", frame.id.raw());
                    }
                    Err(err) => return Err(err),
                }
            }

            let now = self.timer.now_ms();
            if now.wrapping_sub(last_scan) >= period_ms {
                last_scan = now;
                let _sent = self.node.send_cyclic(&mut self.bus, now).await;
                #[cfg(feature = "defmt")]
                defmt::trace!("{} periodic frames sent", _sent);
            }
        }
    }
}
