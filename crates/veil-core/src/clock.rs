//! # Logical Clock Primitives
//!
//! Deadlines, reveal windows, and commitment ages are all expressed in
//! `Tick`s — the environment's logical clock (block height or an equivalent
//! monotone counter). Wall-clock time never participates in admission
//! decisions; it appears only in audit records (see [`crate::temporal`]).
//!
//! The engine reads time through the [`Clock`] trait and never advances it.
//! [`ManualClock`] is the in-process source used by tests and the CLI demo;
//! it refuses to move backwards, matching the monotonicity the environment
//! guarantees.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A logical clock reading (block height or equivalent monotone counter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Tick(pub u64);

impl Tick {
    /// Construct a tick from a raw counter value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw counter value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Ticks elapsed since `earlier`, saturating at zero if `earlier` is in
    /// the future.
    pub fn age_since(&self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tick:{}", self.0)
    }
}

/// A monotonically non-decreasing logical clock source.
///
/// Read-only to the engine; whoever drives the environment advances it.
pub trait Clock {
    /// The current logical tick.
    fn now(&self) -> Tick;
}

/// An in-process clock advanced by hand.
///
/// Used by tests and the CLI demo to script timing scenarios. Rejects any
/// attempt to move backwards.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current: Tick,
}

impl ManualClock {
    /// Create a clock starting at the given tick.
    pub fn starting_at(tick: Tick) -> Self {
        Self { current: tick }
    }

    /// Advance the clock by `ticks`.
    pub fn advance(&mut self, ticks: u64) {
        self.current = Tick(self.current.0.saturating_add(ticks));
    }

    /// Set the clock to an absolute tick, rejecting regression.
    pub fn set(&mut self, tick: Tick) -> Result<(), CoreError> {
        if tick < self.current {
            return Err(CoreError::ClockRegression {
                current: self.current.0,
                requested: tick.0,
            });
        }
        self.current = tick;
        Ok(())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Tick {
        self.current
    }
}
