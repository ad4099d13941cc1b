//! # veil-core — Foundational Types for the Veil Stack
//!
//! This crate is the bedrock of the Veil stack. It defines the type-system
//! primitives that the registry and coordinator crates build on. Every other
//! crate in the workspace depends on `veil-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Address`, `Digest`,
//!    `Tick` — all newtypes. No bare byte arrays or integers for
//!    identifiers, commitments, or clock readings.
//!
//! 2. **Reserved values are constants, not conventions.** `Address::NULL`
//!    and `Address::SENTINEL` live outside the valid participant domain and
//!    are rejected by every operation that accepts a participant.
//!
//! 3. **The hash oracle is a seam.** `HashOracle` is a trait; the engine
//!    never calls a concrete hash function directly. `Sha256Oracle` is the
//!    reference implementation, with length-prefixed input framing so that
//!    `(value, secret)` pairs cannot collide across split points.
//!
//! 4. **Logical time drives semantics.** Deadlines and ages are expressed in
//!    `Tick`s read from a `Clock`; wall-clock `Timestamp`s appear only in
//!    audit records, never in admission decisions.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `veil-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod address;
pub mod clock;
pub mod digest;
pub mod error;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use address::Address;
pub use clock::{Clock, ManualClock, Tick};
pub use digest::{Digest, HashOracle, Sha256Oracle};
pub use error::CoreError;
pub use temporal::Timestamp;
