//! Call message types for the auction module.

use auction_types::Address;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::ledger::Version;

/// Accounts supplied to `Initialize`.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct InitializeAccounts {
    /// Auction record address
    pub state: Address,
    pub treasury: Address,
    /// Bidders' chest address
    pub chest: Address,
    pub treasury_mint: Address,
    /// Wallet the deposit is drawn from
    pub deposit_source: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BidAccounts {
    pub state: Address,
    pub chest: Address,
    /// Derived from (auction, bidder, timestamp)
    pub bid_record: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct EndAccounts {
    pub state: Address,
    pub chest: Address,
    /// Receives the remainder of the chest
    pub treasury_destination: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct ClaimAccounts {
    pub state: Address,
    pub treasury: Address,
    /// Receives the treasury deposit
    pub destination: Address,
}

/// Call messages for the auction module.
///
/// The signer is taken from the call context, never from the message.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum AuctionCall {
    // === Auction Lifecycle ===
    /// Escrow the deposit and create the auction in `Created`.
    Initialize {
        id: i64,
        state_bump: u8,
        deposit_amount: u64,
        accounts: InitializeAccounts,
    },

    /// Open bidding (creator only).
    Start {
        auction: Address,
        expected_version: Version,
    },

    /// Pay `next_bid` into the chest.
    Bid {
        timestamp: i64,
        expected_version: Version,
        accounts: BidAccounts,
    },

    /// Close bidding and split the chest (creator only).
    End {
        chest_bump: u8,
        expected_version: Version,
        accounts: EndAccounts,
    },

    // === Settlement ===
    /// Release the treasury deposit to the winner, or back to the creator.
    Claim {
        expected_version: Version,
        accounts: ClaimAccounts,
    },
}

impl AuctionCall {
    /// Address of the auction record the call targets.
    pub fn auction(&self) -> &Address {
        match self {
            AuctionCall::Initialize { accounts, .. } => &accounts.state,
            AuctionCall::Start { auction, .. } => auction,
            AuctionCall::Bid { accounts, .. } => &accounts.state,
            AuctionCall::End { accounts, .. } => &accounts.state,
            AuctionCall::Claim { accounts, .. } => &accounts.state,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuctionCall::Initialize { .. } => "initialize",
            AuctionCall::Start { .. } => "start",
            AuctionCall::Bid { .. } => "bid",
            AuctionCall::End { .. } => "end",
            AuctionCall::Claim { .. } => "claim",
        }
    }
}
