//! # veil-cli — Veil Stack Command-Line Interface
//!
//! Operator tooling for the commit-reveal engine.
//!
//! ## Subcommands
//!
//! - `digest` — compute the commitment digest a participant submits during
//!   the commit phase.
//! - `demo` — run a scripted sealed-bid round over the in-memory engine:
//!   eligibility registration, commits, the timed wait, reveals, and the
//!   winner decision.
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the domain crates — no engine logic here.

pub mod demo;
pub mod digest;
