//! # veil-coordinator — Commit-Reveal Coordination Engine
//!
//! Manages per-participant two-phase secret disclosure with deadline
//! enforcement. A participant submits an opaque digest during the commit
//! phase, then discloses the `(value, secret)` pair during the reveal phase;
//! the engine checks only that the pair reproduces the stored digest and
//! that the timing rules hold — whether the revealed value "wins" is the
//! caller's business logic.
//!
//! Splitting the phases defeats observation-then-preemption: the committed
//! digest is infeasible to invert without the paired secret, and the secret
//! is only disclosed after the window in which reordering could help an
//! observer has closed.
//!
//! ## Modules
//!
//! - [`schedule`] — validated phase timing (commit deadline, reveal start,
//!   maximum commitment age).
//! - [`commitment`] — the commitment record, per-participant phase enum,
//!   and the append-only event log types.
//! - [`coordinator`] — the engine: `commit`, `reveal`, `expire`, and the
//!   guarded `reveal_and_pay` settlement path.
//! - [`guard`] — the re-entrancy guard wrapping any operation that performs
//!   an external call.
//! - [`settlement`] — the external token collaborator contract and the
//!   balance-delta transfer helper.
//!
//! ## Concurrency Model
//!
//! One mutation completes fully before the next begins — the environment
//! serializes logical state transitions, so the engine takes `&mut self`
//! and never locks. Every operation is a bounded, synchronous transition;
//! all checks precede all effects, and the one operation that calls out to
//! an external collaborator mutates engine state strictly before the call.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Failed operations leave engine state untouched.

pub mod commitment;
pub mod coordinator;
pub mod guard;
pub mod schedule;
pub mod settlement;

// Re-export primary types for ergonomic imports.
pub use commitment::{Commitment, CommitmentEvent, EventKind, ParticipantPhase};
pub use coordinator::{CommitReveal, CoordinatorError, CoordinatorSnapshot, Payout};
pub use guard::{ReentrancyError, ReentrancyGuard};
pub use schedule::{PhaseSchedule, ScheduleError};
pub use settlement::{credited_transfer, Credited, SettlementError, Token, ENTIRE_BALANCE};
