//! # Token Settlement
//!
//! The external value-transfer collaborator contract and the defensive
//! transfer helper. Real-world token contracts misbehave in well-known
//! ways; every token-moving path in the engine goes through
//! [`credited_transfer`], which:
//!
//! - treats a `false` return from `transfer` identically to a revert,
//! - computes the amount actually credited by re-reading the recipient's
//!   balance before and after, so fee-on-transfer tokens report the real
//!   delta rather than the requested amount,
//! - accepts [`ENTIRE_BALANCE`] as a "transfer everything" request,
//! - assumes no fixed decimal precision — amounts are opaque base units.
//!
//! The helper itself performs only token calls; the caller (the engine's
//! `reveal_and_pay`) has already committed its own state before invoking it.

use thiserror::Error;

use veil_core::Address;

/// Request sentinel: move the holder's entire balance.
pub const ENTIRE_BALANCE: u128 = u128::MAX;

/// Settlement failures. A `false` transfer return surfaces here as
/// [`SettlementError::TransferFailed`], exactly like a revert.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettlementError {
    /// The token rejected or reverted the transfer.
    #[error("token transfer failed: {reason}")]
    TransferFailed {
        /// Token-supplied failure description.
        reason: String,
    },

    /// A balance query failed.
    #[error("token balance query failed: {reason}")]
    BalanceUnavailable {
        /// Token-supplied failure description.
        reason: String,
    },
}

/// The external ERC-20-style collaborator.
///
/// `transfer` may signal failure either by returning an error (a revert)
/// or by returning `Ok(false)`; the settlement helper treats both the same
/// way. Amounts are opaque base units with no decimal convention.
pub trait Token {
    /// Current balance of `holder` in base units.
    fn balance_of(&self, holder: Address) -> Result<u128, SettlementError>;

    /// Move `amount` base units from `from` to `to`. Returns whether the
    /// token accepted the transfer.
    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<bool, SettlementError>;
}

/// Outcome of a defensive transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credited {
    /// The amount asked of the token after resolving [`ENTIRE_BALANCE`].
    pub requested: u128,
    /// The balance delta actually observed on the recipient.
    pub credited: u128,
}

/// Transfer `requested` base units and report what actually arrived.
///
/// Resolves [`ENTIRE_BALANCE`] against the sender's current balance, then
/// measures the recipient's balance around the transfer. A fee-on-transfer
/// token therefore yields `credited < requested`; callers must account with
/// `credited`, never with the requested amount.
pub fn credited_transfer<T: Token + ?Sized>(
    token: &mut T,
    from: Address,
    to: Address,
    requested: u128,
) -> Result<Credited, SettlementError> {
    let amount = if requested == ENTIRE_BALANCE {
        token.balance_of(from)?
    } else {
        requested
    };
    let before = token.balance_of(to)?;
    let accepted = token.transfer(from, to, amount)?;
    if !accepted {
        return Err(SettlementError::TransferFailed {
            reason: "transfer returned false".to_string(),
        });
    }
    let after = token.balance_of(to)?;
    Ok(Credited {
        requested: amount,
        credited: after.saturating_sub(before),
    })
}
