//! # The Commit-Reveal Engine
//!
//! Holds the per-participant commitment table, the embedded sentinel-linked
//! registry of participants with outstanding commitments, and the
//! append-only event log. All timing decisions are made against the caller-
//! supplied logical tick; the engine never reads a clock itself.
//!
//! Effect ordering discipline: every operation validates completely before
//! mutating, and [`CommitReveal::reveal_and_pay`] — the only operation with
//! an external call — commits all engine state strictly before the token
//! transfer and runs under the re-entrancy guard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use veil_core::{Address, Digest, HashOracle, Sha256Oracle, Tick};
use veil_registry::{RegistryError, SentinelSet};

use crate::commitment::{Commitment, CommitmentEvent, EventKind, ParticipantPhase};
use crate::guard::{ReentrancyError, ReentrancyGuard};
use crate::schedule::PhaseSchedule;
use crate::settlement::{credited_transfer, SettlementError, Token};

/// Engine operation failures. All are local validation failures surfaced
/// synchronously; the engine never retries, and a failed operation leaves
/// all state untouched.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// The commit window has closed.
    #[error("commit window closed at {deadline}, now {now}")]
    WindowClosed {
        /// The tick the operation was evaluated at.
        now: Tick,
        /// The configured commit deadline.
        deadline: Tick,
    },

    /// The participant already has a live, unexpired commitment.
    #[error("participant {participant} already committed at {committed_at}")]
    AlreadyCommitted {
        /// The participant.
        participant: Address,
        /// When the live commitment was made.
        committed_at: Tick,
    },

    /// The reveal phase has not opened yet.
    #[error("reveal phase opens at {reveal_start}, now {now}")]
    TooEarly {
        /// The tick the operation was evaluated at.
        now: Tick,
        /// The configured reveal start.
        reveal_start: Tick,
    },

    /// The commitment has exceeded the maximum age.
    #[error("commitment from {committed_at} is expired at {now} (max age {max_age} ticks)")]
    Expired {
        /// When the commitment was made.
        committed_at: Tick,
        /// The tick the operation was evaluated at.
        now: Tick,
        /// The configured maximum age.
        max_age: u64,
    },

    /// No live commitment exists for the participant.
    #[error("no live commitment for participant {participant}")]
    NoSuchCommitment {
        /// The participant.
        participant: Address,
    },

    /// The revealed `(value, secret)` pair does not reproduce the stored
    /// digest.
    #[error("revealed pair does not reproduce committed digest {expected}")]
    DigestMismatch {
        /// The digest stored at commit time.
        expected: Digest,
    },

    /// The commitment has not yet reached the maximum age.
    #[error("commitment from {committed_at} not yet expired at {now} (max age {max_age} ticks)")]
    NotExpired {
        /// When the commitment was made.
        committed_at: Tick,
        /// The tick the operation was evaluated at.
        now: Tick,
        /// The configured maximum age.
        max_age: u64,
    },

    /// The participant address is one of the reserved markers.
    #[error("participant address {participant} is reserved")]
    ReservedParticipant {
        /// The rejected address.
        participant: Address,
    },

    /// Outstanding-set bookkeeping failed; indicates an internal invariant
    /// breach, never a caller error.
    #[error("outstanding-set bookkeeping failure: {0}")]
    Registry(#[from] RegistryError),

    /// The operation re-entered while an external call was in flight.
    #[error(transparent)]
    Reentrancy(#[from] ReentrancyError),

    /// The post-reveal token settlement failed. The reveal itself has
    /// already been applied; see [`CommitReveal::reveal_and_pay`].
    #[error("settlement failed: {0}")]
    Settlement(#[from] SettlementError),
}

/// Outcome of a successful [`CommitReveal::reveal_and_pay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    /// The revealed value, returned to the caller's business logic.
    pub value: Vec<u8>,
    /// The amount actually credited to the participant, measured by
    /// balance delta.
    pub credited: u128,
}

/// The commit-reveal coordination engine.
///
/// Generic over the hash oracle; [`Sha256Oracle`] is the reference choice.
/// Exclusively owned by the enclosing service — no shared mutable state.
#[derive(Debug)]
pub struct CommitReveal<H: HashOracle = Sha256Oracle> {
    schedule: PhaseSchedule,
    oracle: H,
    commitments: BTreeMap<Address, Commitment>,
    outstanding: SentinelSet<Address>,
    events: Vec<CommitmentEvent>,
    guard: ReentrancyGuard,
}

impl CommitReveal<Sha256Oracle> {
    /// Build an engine with the reference SHA-256 oracle.
    pub fn with_sha256(schedule: PhaseSchedule) -> Self {
        Self::new(schedule, Sha256Oracle)
    }
}

impl<H: HashOracle> CommitReveal<H> {
    /// Build an engine from a validated schedule and a hash oracle.
    pub fn new(schedule: PhaseSchedule, oracle: H) -> Self {
        Self {
            schedule,
            oracle,
            commitments: BTreeMap::new(),
            outstanding: SentinelSet::for_addresses(),
            events: Vec::new(),
            guard: ReentrancyGuard::new(),
        }
    }

    /// The schedule this engine enforces.
    pub fn schedule(&self) -> &PhaseSchedule {
        &self.schedule
    }

    /// The participant's current lifecycle phase.
    pub fn phase_of(&self, participant: Address) -> ParticipantPhase {
        if self.commitments.contains_key(&participant) {
            ParticipantPhase::Committed
        } else {
            ParticipantPhase::NoCommitment
        }
    }

    /// The participant's live commitment, if any.
    pub fn commitment_of(&self, participant: Address) -> Option<&Commitment> {
        self.commitments.get(&participant)
    }

    /// Participants with outstanding commitments, most recent first.
    pub fn outstanding(&self) -> impl Iterator<Item = Address> + '_ {
        self.outstanding.iter()
    }

    /// Number of outstanding commitments.
    pub fn outstanding_len(&self) -> usize {
        self.outstanding.len()
    }

    /// The append-only event log.
    pub fn events(&self) -> &[CommitmentEvent] {
        &self.events
    }

    /// Accept a commitment digest from a participant.
    ///
    /// An existing commitment that has already exceeded the maximum age is
    /// evicted (logged as `Expired`) and replaced; a live one is a
    /// [`CoordinatorError::AlreadyCommitted`] rejection.
    pub fn commit(
        &mut self,
        participant: Address,
        digest: Digest,
        now: Tick,
    ) -> Result<(), CoordinatorError> {
        if participant.is_reserved() {
            return Err(CoordinatorError::ReservedParticipant { participant });
        }
        if !self.schedule.commit_open(now) {
            return Err(CoordinatorError::WindowClosed {
                now,
                deadline: self.schedule.commit_deadline(),
            });
        }
        if let Some(existing) = self.commitments.get(&participant) {
            if !self.schedule.expired(existing.committed_at, now) {
                return Err(CoordinatorError::AlreadyCommitted {
                    participant,
                    committed_at: existing.committed_at,
                });
            }
            // Stale slot: evict, then fall through to the fresh insert.
            self.remove_entry(participant)?;
            self.events
                .push(CommitmentEvent::now(participant, EventKind::Expired, now));
        }
        self.outstanding.insert(participant)?;
        self.commitments.insert(
            participant,
            Commitment {
                owner: participant,
                digest,
                committed_at: now,
            },
        );
        self.events
            .push(CommitmentEvent::now(participant, EventKind::Committed, now));
        Ok(())
    }

    /// Disclose the `(value, secret)` pair for a live commitment.
    ///
    /// On success the commitment is consumed (single use — a second reveal
    /// fails with [`CoordinatorError::NoSuchCommitment`]) and the revealed
    /// value is returned for the caller's business logic to judge. On any
    /// failure the commitment is left untouched.
    pub fn reveal(
        &mut self,
        participant: Address,
        value: &[u8],
        secret: &[u8],
        now: Tick,
    ) -> Result<Vec<u8>, CoordinatorError> {
        if !self.schedule.reveal_open(now) {
            return Err(CoordinatorError::TooEarly {
                now,
                reveal_start: self.schedule.reveal_start(),
            });
        }
        let commitment = *self
            .commitments
            .get(&participant)
            .ok_or(CoordinatorError::NoSuchCommitment { participant })?;
        if self.schedule.expired(commitment.committed_at, now) {
            return Err(CoordinatorError::Expired {
                committed_at: commitment.committed_at,
                now,
                max_age: self.schedule.max_age(),
            });
        }
        let disclosed = self.oracle.commitment_digest(value, secret);
        if disclosed != commitment.digest {
            return Err(CoordinatorError::DigestMismatch {
                expected: commitment.digest,
            });
        }
        self.remove_entry(participant)?;
        self.events
            .push(CommitmentEvent::now(participant, EventKind::Revealed, now));
        Ok(value.to_vec())
    }

    /// Delete a commitment that has exceeded the maximum age, freeing the
    /// participant to commit again. Housekeeping only — never required for
    /// correctness, since `commit` evicts stale slots itself.
    pub fn expire(
        &mut self,
        participant: Address,
        now: Tick,
    ) -> Result<Commitment, CoordinatorError> {
        let commitment = *self
            .commitments
            .get(&participant)
            .ok_or(CoordinatorError::NoSuchCommitment { participant })?;
        if !self.schedule.expired(commitment.committed_at, now) {
            return Err(CoordinatorError::NotExpired {
                committed_at: commitment.committed_at,
                now,
                max_age: self.schedule.max_age(),
            });
        }
        self.remove_entry(participant)?;
        self.events
            .push(CommitmentEvent::now(participant, EventKind::Expired, now));
        Ok(commitment)
    }

    /// Reveal, then settle a payout to the participant through the external
    /// token collaborator.
    ///
    /// All engine state mutation happens before the token is touched, and
    /// the whole operation runs under the re-entrancy guard. If the token
    /// call fails the reveal stays applied — the event log records it — and
    /// the settlement error is surfaced for the caller to retry payment
    /// through its own channel.
    pub fn reveal_and_pay<T: Token + ?Sized>(
        &mut self,
        participant: Address,
        value: &[u8],
        secret: &[u8],
        now: Tick,
        token: &mut T,
        treasury: Address,
        amount: u128,
    ) -> Result<Payout, CoordinatorError> {
        self.guard.enter()?;
        let outcome = self.reveal_and_pay_inner(participant, value, secret, now, token, treasury, amount);
        self.guard.exit();
        outcome
    }

    fn reveal_and_pay_inner<T: Token + ?Sized>(
        &mut self,
        participant: Address,
        value: &[u8],
        secret: &[u8],
        now: Tick,
        token: &mut T,
        treasury: Address,
        amount: u128,
    ) -> Result<Payout, CoordinatorError> {
        // Effects first: the reveal is fully committed before the external
        // call below can observe anything.
        let revealed = self.reveal(participant, value, secret, now)?;
        let settled = credited_transfer(token, treasury, participant, amount)?;
        Ok(Payout {
            value: revealed,
            credited: settled.credited,
        })
    }

    /// Remove the commitment entry and its outstanding-set node together.
    fn remove_entry(&mut self, participant: Address) -> Result<(), CoordinatorError> {
        let predecessor = self
            .outstanding
            .predecessor_of(participant)
            .ok_or_else(|| RegistryError::BrokenChain {
                element: format!("{participant:?}"),
                predecessor: "<missing>".to_string(),
            })?;
        self.outstanding.remove(participant, predecessor)?;
        self.commitments.remove(&participant);
        Ok(())
    }
}

/// Snapshot of the engine state for serialization; the oracle and guard are
/// reconstructed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    /// The enforced schedule.
    pub schedule: PhaseSchedule,
    /// Live commitments by participant.
    pub commitments: Vec<Commitment>,
    /// The event log.
    pub events: Vec<CommitmentEvent>,
}

impl<H: HashOracle> CommitReveal<H> {
    /// Capture a serializable snapshot of the engine state.
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            schedule: self.schedule,
            commitments: self.commitments.values().copied().collect(),
            events: self.events.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::Sha256Oracle;

    const ORACLE: Sha256Oracle = Sha256Oracle;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn digest(value: &[u8], secret: &[u8]) -> Digest {
        ORACLE.commitment_digest(value, secret)
    }

    /// Deadline 100, reveal start 100, generous max age.
    fn make_engine() -> CommitReveal {
        let schedule = PhaseSchedule::new(Tick(100), Tick(100), 1000).unwrap();
        CommitReveal::with_sha256(schedule)
    }

    // ── Commit ───────────────────────────────────────────────────────

    #[test]
    fn test_commit_records_commitment() {
        let mut engine = make_engine();
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        assert_eq!(engine.phase_of(a), ParticipantPhase::Committed);
        assert_eq!(engine.commitment_of(a).unwrap().committed_at, Tick(10));
        assert_eq!(engine.outstanding_len(), 1);
        assert_eq!(engine.events().len(), 1);
        assert_eq!(engine.events()[0].kind, EventKind::Committed);
    }

    #[test]
    fn test_commit_at_deadline_is_window_closed() {
        let mut engine = make_engine();
        let err = engine.commit(addr(0x0A), digest(b"v", b"s"), Tick(100));
        assert!(matches!(err, Err(CoordinatorError::WindowClosed { .. })));
        assert_eq!(engine.outstanding_len(), 0);
    }

    #[test]
    fn test_double_commit_rejected() {
        let mut engine = make_engine();
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        let err = engine.commit(a, digest(b"w", b"t"), Tick(11));
        assert!(matches!(err, Err(CoordinatorError::AlreadyCommitted { .. })));
        // Original commitment untouched.
        assert_eq!(
            engine.commitment_of(a).unwrap().digest,
            digest(b"v", b"s")
        );
    }

    #[test]
    fn test_commit_evicts_stale_slot() {
        // Short max age: a commitment can expire while commits are open.
        let schedule = PhaseSchedule::new(Tick(100), Tick(100), 5).unwrap();
        let mut engine = CommitReveal::with_sha256(schedule);
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        // Age 5 >= max_age 5: the old slot is stale, the new commit lands.
        engine.commit(a, digest(b"w", b"t"), Tick(15)).unwrap();
        assert_eq!(engine.commitment_of(a).unwrap().digest, digest(b"w", b"t"));
        assert_eq!(engine.outstanding_len(), 1);
        let kinds: Vec<EventKind> = engine.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Committed, EventKind::Expired, EventKind::Committed]
        );
    }

    #[test]
    fn test_reserved_participant_rejected() {
        let mut engine = make_engine();
        for reserved in [Address::NULL, Address::SENTINEL] {
            assert!(matches!(
                engine.commit(reserved, digest(b"v", b"s"), Tick(10)),
                Err(CoordinatorError::ReservedParticipant { .. })
            ));
        }
    }

    // ── Reveal ───────────────────────────────────────────────────────

    #[test]
    fn test_reveal_too_early() {
        let mut engine = make_engine();
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        let err = engine.reveal(a, b"v", b"s", Tick(99));
        assert!(matches!(err, Err(CoordinatorError::TooEarly { .. })));
        // Commitment untouched on failure.
        assert!(engine.commitment_of(a).is_some());
    }

    #[test]
    fn test_reveal_success_consumes_commitment() {
        let mut engine = make_engine();
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        let value = engine.reveal(a, b"v", b"s", Tick(100)).unwrap();
        assert_eq!(value, b"v");
        assert_eq!(engine.phase_of(a), ParticipantPhase::NoCommitment);
        assert_eq!(engine.outstanding_len(), 0);
    }

    #[test]
    fn test_reveal_wrong_secret_is_digest_mismatch() {
        let mut engine = make_engine();
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        let err = engine.reveal(a, b"v", b"wrong", Tick(100));
        assert!(matches!(err, Err(CoordinatorError::DigestMismatch { .. })));
        assert!(engine.commitment_of(a).is_some());
    }

    #[test]
    fn test_reveal_without_commit_is_no_such_commitment() {
        let mut engine = make_engine();
        let err = engine.reveal(addr(0x0A), b"v", b"s", Tick(100));
        assert!(matches!(err, Err(CoordinatorError::NoSuchCommitment { .. })));
    }

    #[test]
    fn test_reveal_expired_commitment() {
        let schedule = PhaseSchedule::new(Tick(100), Tick(100), 200).unwrap();
        let mut engine = CommitReveal::with_sha256(schedule);
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        // Age 200 == max_age: expired, half-open window.
        let err = engine.reveal(a, b"v", b"s", Tick(210));
        assert!(matches!(err, Err(CoordinatorError::Expired { .. })));
        // Entry stays until expire() housekeeping.
        assert!(engine.commitment_of(a).is_some());
    }

    // ── Expire ───────────────────────────────────────────────────────

    #[test]
    fn test_expire_before_max_age_is_not_expired() {
        let mut engine = make_engine();
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        let err = engine.expire(a, Tick(500));
        assert!(matches!(err, Err(CoordinatorError::NotExpired { .. })));
        assert!(engine.commitment_of(a).is_some());
    }

    #[test]
    fn test_expire_frees_participant() {
        let mut engine = make_engine();
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();
        let removed = engine.expire(a, Tick(1010)).unwrap();
        assert_eq!(removed.committed_at, Tick(10));
        assert_eq!(engine.phase_of(a), ParticipantPhase::NoCommitment);
        assert_eq!(engine.outstanding_len(), 0);
        assert_eq!(engine.events().last().unwrap().kind, EventKind::Expired);
    }

    #[test]
    fn test_expire_without_commitment() {
        let mut engine = make_engine();
        assert!(matches!(
            engine.expire(addr(0x0A), Tick(1010)),
            Err(CoordinatorError::NoSuchCommitment { .. })
        ));
    }

    // ── Outstanding registry ─────────────────────────────────────────

    #[test]
    fn test_outstanding_tracks_head_first() {
        let mut engine = make_engine();
        let (a, b, c) = (addr(0x0A), addr(0x0B), addr(0x0C));
        engine.commit(a, digest(b"1", b"s"), Tick(10)).unwrap();
        engine.commit(b, digest(b"2", b"s"), Tick(11)).unwrap();
        engine.commit(c, digest(b"3", b"s"), Tick(12)).unwrap();
        assert_eq!(engine.outstanding().collect::<Vec<_>>(), vec![c, b, a]);

        engine.reveal(b, b"2", b"s", Tick(100)).unwrap();
        assert_eq!(engine.outstanding().collect::<Vec<_>>(), vec![c, a]);
    }

    // ── Guarded settlement ───────────────────────────────────────────

    #[test]
    fn test_reveal_and_pay_rejected_while_guard_entered() {
        struct NullToken;
        impl crate::settlement::Token for NullToken {
            fn balance_of(&self, _: Address) -> Result<u128, crate::settlement::SettlementError> {
                Ok(0)
            }
            fn transfer(
                &mut self,
                _: Address,
                _: Address,
                _: u128,
            ) -> Result<bool, crate::settlement::SettlementError> {
                Ok(true)
            }
        }

        let mut engine = make_engine();
        let a = addr(0x0A);
        engine.commit(a, digest(b"v", b"s"), Tick(10)).unwrap();

        // Simulate an external call in flight.
        engine.guard.enter().unwrap();
        let err = engine.reveal_and_pay(a, b"v", b"s", Tick(100), &mut NullToken, addr(0x77), 0);
        assert!(matches!(err, Err(CoordinatorError::Reentrancy(_))));
        // The blocked call must not have touched the commitment.
        assert!(engine.commitment_of(a).is_some());

        engine.guard.exit();
        assert!(engine
            .reveal_and_pay(a, b"v", b"s", Tick(100), &mut NullToken, addr(0x77), 0)
            .is_ok());
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    #[test]
    fn test_snapshot_serializes() {
        let mut engine = make_engine();
        engine
            .commit(addr(0x0A), digest(b"v", b"s"), Tick(10))
            .unwrap();
        let snapshot = engine.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: CoordinatorSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.commitments.len(), 1);
        assert_eq!(parsed.events.len(), 1);
    }
}
