//! # Commitment Records and the Event Log
//!
//! The commitment record binds a participant to a digest at a logical tick.
//! Per-participant lifecycle:
//!
//! ```text
//! NoCommitment ──commit()──▶ Committed ──reveal()──▶ (entry removed)
//!                                │
//!                                └──expire()───────▶ (entry removed)
//! ```
//!
//! Both exits are terminal for the entry; the participant is then free to
//! commit again in a later round (or in the same round, while the commit
//! window is still open, if the previous commitment expired).
//!
//! Every accepted transition appends a [`CommitmentEvent`] to the engine's
//! log: the logical tick that drove the decision plus a UTC timestamp for
//! audit readers.

use serde::{Deserialize, Serialize};

use veil_core::{Address, Digest, Tick, Timestamp};

/// A live commitment: one per participant at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// The committing participant (unique key).
    pub owner: Address,
    /// The opaque digest of the participant's `(value, secret)` pair.
    pub digest: Digest,
    /// Logical tick at which the commitment was accepted.
    pub committed_at: Tick,
}

/// Runtime view of a participant's position in the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantPhase {
    /// No live commitment.
    NoCommitment,
    /// A live commitment is outstanding.
    Committed,
}

impl ParticipantPhase {
    /// The canonical phase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoCommitment => "NO_COMMITMENT",
            Self::Committed => "COMMITTED",
        }
    }
}

impl std::fmt::Display for ParticipantPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened in a logged transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A commitment was accepted.
    Committed,
    /// A commitment was revealed and consumed.
    Revealed,
    /// A commitment was deleted after exceeding the maximum age — either by
    /// an explicit `expire()` call or evicted by a fresh `commit()`.
    Expired,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Committed => "COMMITTED",
            Self::Revealed => "REVEALED",
            Self::Expired => "EXPIRED",
        };
        f.write_str(s)
    }
}

/// One entry in the engine's append-only event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentEvent {
    /// The participant whose commitment transitioned.
    pub participant: Address,
    /// What happened.
    pub kind: EventKind,
    /// The logical tick the operation was evaluated against.
    pub tick: Tick,
    /// Wall-clock annotation for audit readers; never used in decisions.
    pub at: Timestamp,
}

impl CommitmentEvent {
    /// Build an event stamped with the current wall-clock time.
    pub fn now(participant: Address, kind: EventKind, tick: Tick) -> Self {
        Self {
            participant,
            kind,
            tick,
            at: Timestamp::now(),
        }
    }
}
