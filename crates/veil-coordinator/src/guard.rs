//! # Re-Entrancy Guard
//!
//! Any engine operation that performs an external call does so only after
//! its own state mutation is complete, and runs the whole operation inside
//! this guard. Within one process the borrow checker already rules out
//! aliased mutation, but the engine is designed for environments where the
//! same instance sits behind shared storage and an external collaborator
//! can call back in mid-operation — the guard turns that re-entry into an
//! explicit error instead of a state corruption.

use thiserror::Error;

/// An operation re-entered while an external call was in flight.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation re-entered while an external call was in flight")]
pub struct ReentrancyError;

/// A non-reentrant entry flag. `enter()` must be paired with `exit()` on
/// every path; the engine keeps the pairing local to one method.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReentrancyGuard {
    entered: bool,
}

impl ReentrancyGuard {
    /// Create a guard in the open state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the guarded section entered.
    ///
    /// # Errors
    ///
    /// [`ReentrancyError`] if the section is already entered.
    pub fn enter(&mut self) -> Result<(), ReentrancyError> {
        if self.entered {
            return Err(ReentrancyError);
        }
        self.entered = true;
        Ok(())
    }

    /// Mark the guarded section exited.
    pub fn exit(&mut self) {
        self.entered = false;
    }

    /// Whether the guarded section is currently entered.
    pub fn is_entered(&self) -> bool {
        self.entered
    }
}
