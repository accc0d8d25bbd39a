//! Timer abstraction providing the monotonic clock and the tick delay used by
//! the periodic telemetry driver.

/// Monotonic millisecond clock plus an asynchronous delay.
pub trait CanTimer {
    /// Current monotonic time in milliseconds. Wraps around; consumers use
    /// wrapping subtraction.
    fn now_ms(&self) -> u32;

    /// Asynchronously wait for `millis` milliseconds.
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl core::future::Future<Output = ()> + 'a;
}
