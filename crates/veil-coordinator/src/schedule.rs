//! # Phase Schedule
//!
//! Validated timing configuration for a commit-reveal round. All three
//! parameters are logical ticks read from the environment's clock:
//!
//! - `commit_deadline` — commits are accepted strictly before this tick.
//! - `reveal_start` — reveals are accepted from this tick on.
//! - `max_age` — a commitment older than this many ticks is expired.
//!
//! Because commits close strictly before `commit_deadline` and reveals open
//! at `reveal_start >= commit_deadline`, at least one full tick separates
//! any commit from any reveal — no single party can place both transactions
//! inside one ordering opportunity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use veil_core::Tick;

/// Schedule validation failures, raised at construction only.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    /// The reveal phase would open before commits close.
    #[error("reveal start {reveal_start} precedes commit deadline {commit_deadline}")]
    RevealBeforeCommitClose {
        /// Configured commit deadline.
        commit_deadline: Tick,
        /// Configured reveal start.
        reveal_start: Tick,
    },

    /// A zero maximum age would expire every commitment instantly.
    #[error("maximum commitment age must be at least one tick")]
    ZeroMaxAge,

    /// Even a commitment made at the last admissible tick would expire
    /// before the reveal phase opens.
    #[error(
        "maximum age {max_age} leaves no reveal window: a commit at tick {edge_commit} expires at or before reveal start {reveal_start}"
    )]
    MaxAgeTooShort {
        /// The last tick at which a commit is admissible.
        edge_commit: Tick,
        /// Configured reveal start.
        reveal_start: Tick,
        /// Configured maximum age.
        max_age: u64,
    },
}

/// Timing configuration for one commit-reveal round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSchedule {
    commit_deadline: Tick,
    reveal_start: Tick,
    max_age: u64,
}

impl PhaseSchedule {
    /// Build a schedule, validating the phase geometry.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::RevealBeforeCommitClose`] if `reveal_start <
    ///   commit_deadline`.
    /// - [`ScheduleError::ZeroMaxAge`] if `max_age == 0`.
    /// - [`ScheduleError::MaxAgeTooShort`] if a commitment made at the last
    ///   admissible tick (`commit_deadline - 1`) would already be expired
    ///   when the reveal phase opens. Earlier commits may still expire
    ///   before `reveal_start`; that is the committing participant's risk.
    pub fn new(
        commit_deadline: Tick,
        reveal_start: Tick,
        max_age: u64,
    ) -> Result<Self, ScheduleError> {
        if reveal_start < commit_deadline {
            return Err(ScheduleError::RevealBeforeCommitClose {
                commit_deadline,
                reveal_start,
            });
        }
        if max_age == 0 {
            return Err(ScheduleError::ZeroMaxAge);
        }
        let edge_commit = Tick::new(commit_deadline.value().saturating_sub(1));
        if edge_commit.value().saturating_add(max_age) <= reveal_start.value() {
            return Err(ScheduleError::MaxAgeTooShort {
                edge_commit,
                reveal_start,
                max_age,
            });
        }
        Ok(Self {
            commit_deadline,
            reveal_start,
            max_age,
        })
    }

    /// The tick at which commits stop being accepted (exclusive).
    pub fn commit_deadline(&self) -> Tick {
        self.commit_deadline
    }

    /// The tick from which reveals are accepted (inclusive).
    pub fn reveal_start(&self) -> Tick {
        self.reveal_start
    }

    /// The maximum commitment age in ticks.
    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    /// Whether a commit is admissible at `now`.
    pub fn commit_open(&self, now: Tick) -> bool {
        now < self.commit_deadline
    }

    /// Whether the reveal phase has opened at `now`.
    pub fn reveal_open(&self, now: Tick) -> bool {
        now >= self.reveal_start
    }

    /// Whether a commitment made at `committed_at` is expired at `now`.
    ///
    /// The reveal window is the half-open interval
    /// `[reveal_start, committed_at + max_age)`.
    pub fn expired(&self, committed_at: Tick, now: Tick) -> bool {
        now.age_since(committed_at) >= self.max_age
    }
}
