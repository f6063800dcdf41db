//! Client SDK for escrow auctions.
//!
//! This crate provides a high-level API for:
//! - Deriving every address an auction needs before it exists
//! - Building the call messages for each lifecycle step
//! - Deriving bid-record addresses and building bids

pub mod bid;
pub mod setup;

pub use bid::{BidBuilder, PreparedBid};
pub use setup::{auction_id_from_clock, now_ms, AuctionSetup, ID_OFFSET_MS};

use thiserror::Error;

/// Errors that can occur while preparing calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Address derivation failed: {0}")]
    Derivation(#[from] auction_pda::PdaError),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Parse a hex address for the CLI and tests.
pub fn parse_address(s: &str) -> Result<auction_types::Address, ClientError> {
    auction_types::address_from_hex(s).ok_or_else(|| ClientError::InvalidAddress(s.to_string()))
}
