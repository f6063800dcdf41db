//! Seed layouts for the four auction domains.

use crate::derive::{create_program_address, find_program_address};
use crate::error::PdaError;
use auction_types::Address;
use serde::{Deserialize, Serialize};

/// Address domain, identified by its seed prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Auction record: creator, mint, id
    Auction,
    /// Treasury wallet: creator, mint, id
    Treasury,
    /// Bidders' chest: creator, id
    Wallet,
    /// Bid record: auction, bidder, ts
    Bidder,
}

impl Domain {
    pub const fn tag(&self) -> &'static [u8] {
        match self {
            Domain::Auction => b"auction",
            Domain::Treasury => b"treasury",
            Domain::Wallet => b"wallet",
            Domain::Bidder => b"bidder",
        }
    }
}

pub fn find_auction_address(
    program_id: &Address,
    creator: &Address,
    mint: &Address,
    id: i64,
) -> Result<(Address, u8), PdaError> {
    let id_bytes = id.to_le_bytes();
    find_program_address(
        &[Domain::Auction.tag(), creator, mint, &id_bytes],
        program_id,
    )
}

/// Recreate the auction address from a caller-supplied bump.
pub fn create_auction_address(
    program_id: &Address,
    creator: &Address,
    mint: &Address,
    id: i64,
    bump: u8,
) -> Result<Address, PdaError> {
    let id_bytes = id.to_le_bytes();
    create_program_address(
        &[Domain::Auction.tag(), creator, mint, &id_bytes, &[bump]],
        program_id,
    )
}

pub fn find_treasury_address(
    program_id: &Address,
    creator: &Address,
    mint: &Address,
    id: i64,
) -> Result<(Address, u8), PdaError> {
    let id_bytes = id.to_le_bytes();
    find_program_address(
        &[Domain::Treasury.tag(), creator, mint, &id_bytes],
        program_id,
    )
}

/// The chest is keyed by creator and id only; the mint is not a seed.
pub fn find_bidders_chest_address(
    program_id: &Address,
    creator: &Address,
    id: i64,
) -> Result<(Address, u8), PdaError> {
    let id_bytes = id.to_le_bytes();
    find_program_address(&[Domain::Wallet.tag(), creator, &id_bytes], program_id)
}

pub fn create_bidders_chest_address(
    program_id: &Address,
    creator: &Address,
    id: i64,
    bump: u8,
) -> Result<Address, PdaError> {
    let id_bytes = id.to_le_bytes();
    create_program_address(
        &[Domain::Wallet.tag(), creator, &id_bytes, &[bump]],
        program_id,
    )
}

/// Bid records include the client timestamp, so a replayed submission
/// lands on the same address.
pub fn find_bid_record_address(
    program_id: &Address,
    auction: &Address,
    bidder: &Address,
    ts: i64,
) -> Result<(Address, u8), PdaError> {
    let ts_bytes = ts.to_le_bytes();
    find_program_address(
        &[Domain::Bidder.tag(), auction, bidder, &ts_bytes],
        program_id,
    )
}

/// Every address an auction needs at initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionAddresses {
    pub id: i64,
    pub auction: Address,
    pub auction_bump: u8,
    pub treasury: Address,
    pub treasury_bump: u8,
    pub bidders_chest: Address,
    pub chest_bump: u8,
}

impl AuctionAddresses {
    pub fn derive(
        program_id: &Address,
        creator: &Address,
        mint: &Address,
        id: i64,
    ) -> Result<Self, PdaError> {
        let (auction, auction_bump) = find_auction_address(program_id, creator, mint, id)?;
        let (treasury, treasury_bump) = find_treasury_address(program_id, creator, mint, id)?;
        let (bidders_chest, chest_bump) = find_bidders_chest_address(program_id, creator, id)?;

        Ok(Self {
            id,
            auction,
            auction_bump,
            treasury,
            treasury_bump,
            bidders_chest,
            chest_bump,
        })
    }
}
