//! Query handlers for the auction module.
//!
//! These functions provide read-only access to auction records through the
//! ledger. Records are told apart by their account discriminator.

use crate::ledger::{Ledger, Version};
use auction_types::{AccountRecord, Address, AuctionState, BidRecord, LifecycleState};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// Query request types.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionQuery {
    /// Get an auction record and its version.
    GetAuction {
        #[serde_as(as = "Hex")]
        auction: Address,
    },

    /// Get all auctions (paginated).
    ListAuctions { offset: u64, limit: u64 },

    /// Get all bids for an auction, oldest first.
    GetAuctionBids {
        #[serde_as(as = "Hex")]
        auction: Address,
    },

    /// Get a bid record by its address.
    GetBid {
        #[serde_as(as = "Hex")]
        bid_record: Address,
    },

    /// Get any account's balance.
    GetBalance {
        #[serde_as(as = "Hex")]
        address: Address,
    },
}

/// Auction record together with the version a mutating call must quote.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedAuction {
    #[serde_as(as = "Hex")]
    pub address: Address,
    pub version: Version,
    pub auction: AuctionState,
}

/// Query response types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionQueryResponse {
    /// Auction details.
    Auction(Option<VersionedAuction>),

    /// List of auctions.
    AuctionList(Vec<VersionedAuction>),

    /// Bids for an auction.
    Bids(Vec<BidRecord>),

    /// Single bid.
    Bid(Option<BidRecord>),

    /// Balance in base units.
    Balance(u64),
}

/// Handle a query.
pub fn handle_query<L: Ledger + ?Sized>(
    ledger: &L,
    program_id: &Address,
    query: AuctionQuery,
) -> AuctionQueryResponse {
    match query {
        AuctionQuery::GetAuction { auction } => {
            AuctionQueryResponse::Auction(get_auction(ledger, program_id, &auction))
        }

        AuctionQuery::ListAuctions { offset, limit } => {
            let auctions = list_auctions(ledger, program_id)
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect();
            AuctionQueryResponse::AuctionList(auctions)
        }

        AuctionQuery::GetAuctionBids { auction } => {
            AuctionQueryResponse::Bids(get_auction_bids(ledger, program_id, &auction))
        }

        AuctionQuery::GetBid { bid_record } => {
            let bid = ledger
                .account(&bid_record)
                .filter(|account| account.owner == *program_id)
                .and_then(|account| BidRecord::from_account_data(&account.data));
            AuctionQueryResponse::Bid(bid)
        }

        AuctionQuery::GetBalance { address } => {
            AuctionQueryResponse::Balance(ledger.balance(&address))
        }
    }
}

pub fn get_auction<L: Ledger + ?Sized>(
    ledger: &L,
    program_id: &Address,
    address: &Address,
) -> Option<VersionedAuction> {
    let account = ledger.account(address)?;
    if account.owner != *program_id {
        return None;
    }
    Some(VersionedAuction {
        address: *address,
        version: account.version,
        auction: AuctionState::from_account_data(&account.data)?,
    })
}

/// Every auction record owned by the program, ordered by id.
pub fn list_auctions<L: Ledger + ?Sized>(ledger: &L, program_id: &Address) -> Vec<VersionedAuction> {
    let mut auctions: Vec<VersionedAuction> = ledger
        .accounts_owned_by(program_id)
        .into_iter()
        .filter_map(|(address, account)| {
            Some(VersionedAuction {
                address,
                version: account.version,
                auction: AuctionState::from_account_data(&account.data)?,
            })
        })
        .collect();
    auctions.sort_by_key(|v| (v.auction.id, v.address));
    auctions
}

/// Bid records of one auction, ordered by timestamp then bid value.
pub fn get_auction_bids<L: Ledger + ?Sized>(
    ledger: &L,
    program_id: &Address,
    auction: &Address,
) -> Vec<BidRecord> {
    let mut bids: Vec<BidRecord> = ledger
        .accounts_owned_by(program_id)
        .into_iter()
        .filter_map(|(_, account)| BidRecord::from_account_data(&account.data))
        .filter(|bid| bid.auction == *auction)
        .collect();
    bids.sort_by_key(|bid| (bid.ts, bid.bid_value));
    bids
}

/// Auctions currently accepting bids.
pub fn get_active_auctions<L: Ledger + ?Sized>(
    ledger: &L,
    program_id: &Address,
) -> Vec<VersionedAuction> {
    list_auctions(ledger, program_id)
        .into_iter()
        .filter(|v| v.auction.state == LifecycleState::Started)
        .collect()
}
