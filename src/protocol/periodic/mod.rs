//! Periodic telemetry subscriptions of one axis.
//!
//! Fixed-capacity table whose active entries always form a contiguous prefix:
//! insertion uses the first free slot, removal moves the last active entry
//! into the freed slot and clears the vacated one. Scans stop at the first
//! inactive slot.
use crate::protocol::commands;

//==================================================================================Constants

/// Slots per axis.
pub const PERIODIC_SLOTS: usize = 5;

//==================================================================================Enums and Structs

/// One subscription. `interval_ms == 0` marks a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodicEntry {
    pub command_id: u8,
    pub interval_ms: u32,
    pub last_fire_ms: u32,
}

impl PeriodicEntry {
    const FREE: Self = Self {
        command_id: 0,
        interval_ms: 0,
        last_fire_ms: 0,
    };

    #[inline]
    pub fn is_active(&self) -> bool {
        self.interval_ms != 0
    }

    /// Wraparound-safe due check.
    #[inline]
    pub fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_fire_ms) >= self.interval_ms
    }
}

/// Result of a subscription request. The protocol has no NACK frame; callers
/// only use this for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubscribeOutcome {
    /// New entry inserted with a zero fire time.
    Added,
    /// Existing entry got a new interval, phase untouched.
    Updated,
    /// Interval 0 on an existing entry removed it.
    Removed,
    /// Command cannot be subscribed, or interval 0 for an unknown entry.
    Rejected,
    /// No free slot left.
    Full,
}

/// Subscription table with an explicit active count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTable<const N: usize = PERIODIC_SLOTS> {
    entries: [PeriodicEntry; N],
    active: usize,
}

impl<const N: usize> Default for PeriodicTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PeriodicTable<N> {
    /// Empty table.
    pub const fn new() -> Self {
        Self {
            entries: [PeriodicEntry::FREE; N],
            active: 0,
        }
    }

    /// Number of active subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Raw slots, including the inactive tail.
    pub fn entries(&self) -> &[PeriodicEntry; N] {
        &self.entries
    }

    /// Active prefix.
    pub fn active(&self) -> &[PeriodicEntry] {
        &self.entries[..self.active]
    }

    fn position(&self, command_id: u8) -> Option<usize> {
        self.active().iter().position(|e| e.command_id == command_id)
    }

    /// Create, retime, or cancel the subscription for `command_id`.
    pub fn subscribe(&mut self, command_id: u32, interval_ms: u32) -> SubscribeOutcome {
        if !commands::is_subscribable(command_id) {
            return SubscribeOutcome::Rejected;
        }
        // Subscribable ids come from the 5-bit table.
        let command_id = command_id as u8;

        if let Some(index) = self.position(command_id) {
            if interval_ms == 0 {
                self.remove_at(index);
                return SubscribeOutcome::Removed;
            }
            self.entries[index].interval_ms = interval_ms;
            return SubscribeOutcome::Updated;
        }

        if interval_ms == 0 {
            return SubscribeOutcome::Rejected;
        }
        if self.active == N {
            return SubscribeOutcome::Full;
        }

        self.entries[self.active] = PeriodicEntry {
            command_id,
            interval_ms,
            last_fire_ms: 0,
        };
        self.active += 1;
        SubscribeOutcome::Added
    }

    /// Cancel the subscription for `command_id`. Returns `true` if one existed.
    pub fn unsubscribe(&mut self, command_id: u8) -> bool {
        match self.position(command_id) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Swap-with-last removal; does not keep insertion order.
    fn remove_at(&mut self, index: usize) {
        let last = self.active - 1;
        self.entries[index] = self.entries[last];
        self.entries[last] = PeriodicEntry::FREE;
        self.active = last;
    }

    /// Due entries as `(slot, command_id)`, scanning up to the first free slot.
    pub fn due(&self, now_ms: u32) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.entries
            .iter()
            .take_while(|e| e.is_active())
            .enumerate()
            .filter(move |(_, e)| e.is_due(now_ms))
            .map(|(index, e)| (index, e.command_id))
    }

    /// Record a successful transmission for `slot`.
    pub fn mark_fired(&mut self, slot: usize, now_ms: u32) {
        if let Some(entry) = self.entries[..self.active].get_mut(slot) {
            entry.last_fire_ms = now_ms;
        }
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
