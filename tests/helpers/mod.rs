/// Test doubles to simulate the CAN bus and the millisecond clock during
/// integration tests.
use axis_can::protocol::transport::{
    can_frame::CanFrame,
    can_id::CanId,
    traits::{can_bus::CanBus, can_timer::CanTimer},
};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Duration, Instant};

// Links the `std` critical-section implementation used by `CriticalSectionRawMutex`.
use critical_section as _;

#[derive(Clone)]
#[allow(dead_code)]
/// In-memory CAN bus reproducing the `CanBus` trait behavior.
pub struct MockCanBus {
    tx: mpsc::UnboundedSender<CanFrame>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<CanFrame>>>,
}

#[allow(dead_code)]
impl MockCanBus {
    /// Construct a pair of interconnected buses (node ↔ host).
    pub fn create_pair() -> (Self, Self) {
        let (node_tx, host_rx) = mpsc::unbounded_channel();
        let (host_tx, node_rx) = mpsc::unbounded_channel();

        let node_bus = Self {
            tx: node_tx,
            rx: Arc::new(Mutex::new(node_rx)),
        };

        let host_bus = Self {
            tx: host_tx,
            rx: Arc::new(Mutex::new(host_rx)),
        };

        (node_bus, host_bus)
    }
}

impl CanBus for MockCanBus {
    type Error = ();

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.tx.send(frame.clone()).map_err(|_| ())?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<CanFrame, Self::Error> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(())
    }
}

#[allow(dead_code)]
/// Bus refusing the first `failures` sends, then recording every frame.
pub struct FlakyBus {
    pub failures: usize,
    pub sent: Vec<CanFrame>,
}

#[allow(dead_code)]
impl FlakyBus {
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            sent: Vec::new(),
        }
    }
}

impl CanBus for FlakyBus {
    type Error = &'static str;

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err("mailbox full");
        }
        self.sent.push(frame.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<CanFrame, Self::Error> {
        std::future::pending().await
    }
}

#[allow(dead_code)]
/// Connected bus whose next `refusals` sends fail, as with a full TX mailbox.
pub struct RefusingBus {
    pub inner: MockCanBus,
    pub refusals: usize,
}

#[allow(dead_code)]
impl RefusingBus {
    pub fn new(inner: MockCanBus, refusals: usize) -> Self {
        Self { inner, refusals }
    }
}

impl CanBus for RefusingBus {
    type Error = &'static str;

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        if self.refusals > 0 {
            self.refusals -= 1;
            return Err("mailbox full");
        }
        self.inner.send(frame).await.map_err(|_| "bus closed")
    }

    async fn recv(&mut self) -> Result<CanFrame, Self::Error> {
        self.inner.recv().await.map_err(|_| "bus closed")
    }
}

#[allow(dead_code)]
/// Clock based on `tokio::time`, so paused-time tests stay deterministic.
pub struct MockTimer {
    origin: Instant,
}

#[allow(dead_code)]
impl MockTimer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl CanTimer for MockTimer {
    fn now_ms(&self) -> u32 {
        self.origin.elapsed().as_millis() as u32
    }

    async fn delay_ms(&mut self, millis: u32) {
        sleep(Duration::from_millis(millis as u64)).await;
    }
}

#[allow(dead_code)]
/// Data frame for `command_id` on `node_id` (standard format).
pub fn data_frame(node_id: u32, command_id: u8, payload: &[u8]) -> CanFrame {
    CanFrame::new(CanId::new(node_id, command_id), false, payload)
}

#[allow(dead_code)]
/// Remote request for `command_id` on `node_id` (standard format).
pub fn query_frame(node_id: u32, command_id: u8) -> CanFrame {
    CanFrame::remote(CanId::new(node_id, command_id), false)
}

#[allow(dead_code)]
/// Payload of a periodic update request.
pub fn periodic_payload(command_id: u32, interval_ms: u32) -> [u8; 8] {
    let mut payload = [0u8; 8];
    payload[..4].copy_from_slice(&command_id.to_le_bytes());
    payload[4..].copy_from_slice(&interval_ms.to_le_bytes());
    payload
}
