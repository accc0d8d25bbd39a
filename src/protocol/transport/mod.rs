//! CAN-simple transport layer: frame representation, arbitration identifier
//! codec, and bus/timer abstraction traits.
//!
//! ## Timing
//!
//! The periodic telemetry driver runs on a fixed tick; the default period
//! mirrors the 1 kHz control-loop cadence of the firmware it serves.

pub mod can_frame;
pub mod can_id;
pub mod traits;

/// Default period of the cyclic telemetry tick (ms).
///
/// Subscription intervals are checked at this granularity: an entry with a
/// 10 ms interval fires on the first tick at least 10 ms after its last fire.
pub const DEFAULT_CYCLIC_PERIOD_MS: u64 = 1;
