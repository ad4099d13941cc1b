//! # veil-registry — Sentinel-Linked Unique-Membership Registry
//!
//! An order-preserving set of unique identities with O(1) insert and remove,
//! no auxiliary index array, and full enumeration — the building block the
//! coordinator uses to track participants with outstanding commitments, and
//! a standalone structure for eligibility and allow-list management.
//!
//! ## Structure
//!
//! The set is a singly linked chain expressed as an arena of identity-keyed
//! successor links, not a linked list of owned nodes. One reserved sentinel
//! value is both head and tail; "no successor" is a second reserved null
//! value, represented by absence from the link table. The chain starts as a
//! sentinel self-loop and always forms a single acyclic path from the
//! sentinel back to itself.
//!
//! ## Cost Model
//!
//! - `insert` — O(log n) map update at the head, no shifting.
//! - `remove` — O(log n) given the true predecessor; callers that do not
//!   know it discover it with the O(n) [`SentinelSet::predecessor_of`].
//! - `contains` / `len` — O(log n) / O(1).
//! - `iter` — O(n) head-to-tail walk; the `&self` borrow statically
//!   excludes interleaved mutation.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Failed operations leave the chain untouched.

pub mod set;

// Re-export primary types for ergonomic imports.
pub use set::{ConfigError, Element, Iter, RegistryError, SentinelSet};
