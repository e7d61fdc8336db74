//! Lamport logical clock shared by the protocol handlers of one process.

use std::sync::atomic::{AtomicU64, Ordering};


/// Monotonic event counter. Every mutating call returns a value strictly
/// greater than any value previously returned by this clock.
///
/// The counter is atomic so the clock can be peeked from other threads while
/// the engine advances it.
#[derive(Debug, Default)]
pub struct LamportClock {
    counter: AtomicU64,
}

impl LamportClock {
    pub fn new() -> LamportClock {
        LamportClock::default()
    }

    /// Advances the clock for a local event and returns the new value.
    /// Saturates at `u64::MAX`.
    pub fn tick(&self) -> u64 {
        let previous = self
            .counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(1))
            })
            .unwrap_or_else(|current| current);

        previous.saturating_add(1)
    }

    /// Merges a received timestamp: the clock becomes `max(local, received) + 1`,
    /// saturating at `u64::MAX`.
    pub fn update(&self, received: u64) -> u64 {
        let previous = self
            .counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.max(received).saturating_add(1))
            })
            .unwrap_or_else(|current| current);

        previous.max(received).saturating_add(1)
    }

    /// Current value. Never mutates.
    pub fn read(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}
