//! Auction module error types.

use thiserror::Error;

use crate::ledger::{LedgerError, Version};
use auction_pda::PdaError;
use auction_types::LifecycleState;

/// Errors that can occur in the auction module.
///
/// Every error is terminal for the call that raised it; nothing has been
/// submitted to the ledger when one is returned from a precondition check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("Auction already initialized at {}", hex::encode(.0))]
    AlreadyInitialized([u8; 32]),

    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Not authorized")]
    Unauthorized,

    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("Auction not started (state {0:?})")]
    AuctionNotStarted(LifecycleState),

    #[error("Bid already recorded at {}", hex::encode(.0))]
    DuplicateBid([u8; 32]),

    #[error("Address derivation failed: {0}")]
    AddressCollision(#[from] PdaError),

    #[error("Supplied {role} address does not match its derivation")]
    AddressMismatch { role: &'static str },

    #[error("Auction not found: {}", hex::encode(.0))]
    AuctionNotFound([u8; 32]),

    #[error("Creator cannot bid on their own auction")]
    CreatorCannotBid,

    #[error("Bidder already holds the highest bid")]
    AlreadyLastBidder,

    #[error("Treasury already claimed")]
    AlreadyClaimed,

    #[error("Only the winner may claim the treasury")]
    NotWinner,

    #[error("Stale auction state: expected version {expected}, found {actual}")]
    StaleState { expected: Version, actual: Version },

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Deposit of {0} is too small to price the auction")]
    InvalidDepositAmount(u64),

    #[error("Treasury destination cannot be the bidders' chest")]
    InvalidTreasuryDestination,

    #[error("Invalid account data at {}", hex::encode(.0))]
    InvalidAccountData([u8; 32]),

    #[error("Ledger rejected transaction: {0}")]
    Ledger(#[from] LedgerError),
}
