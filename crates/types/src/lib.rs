//! Core type definitions for escrow auctions.
//!
//! This crate provides the records persisted at program-derived addresses
//! and the small value types shared by the engine, the client SDK and the
//! mock chain.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =========================
// IDENTITIES
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Sentinel identity stored in `last_bidder` until the first bid lands.
///
/// This is the all-zero system address. The engine rejects every call sent
/// from it, so no bidder can take its place.
pub const NO_BIDDER: Address = [0u8; 32];

/// Base units per whole unit of the ledger's native currency.
pub const BASE_UNITS_PER_UNIT: u64 = 1_000_000_000;

/// Hex-encode an address for logs and RPC payloads.
pub fn address_to_hex(address: &Address) -> String {
    hex::encode(address)
}

/// Parse a hex address, with or without a `0x` prefix.
pub fn address_from_hex(s: &str) -> Option<Address> {
    hex::decode(s.trim_start_matches("0x"))
        .ok()?
        .try_into()
        .ok()
}

// =========================
// ACCOUNT DATA
// =========================

/// First 8 bytes of `sha256("account:<name>")`, prefixed to account data.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(b"account:");
    hasher.update(name.as_bytes());
    let hash: [u8; 32] = hasher.finalize().into();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

/// A record stored as the data of a program-owned account.
pub trait AccountRecord: BorshSerialize + BorshDeserialize {
    const NAME: &'static str;

    fn discriminator() -> [u8; 8] {
        account_discriminator(Self::NAME)
    }

    /// Discriminator followed by the borsh encoding.
    fn to_account_data(&self) -> std::io::Result<Vec<u8>> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }

    /// `None` if the data belongs to another record type or is malformed.
    fn from_account_data(data: &[u8]) -> Option<Self> {
        if data.len() < 8 || data[..8] != Self::discriminator() {
            return None;
        }
        borsh::from_slice(&data[8..]).ok()
    }
}

// =========================
// AUCTION RECORDS
// =========================

/// Auction lifecycle state
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum LifecycleState {
    /// Deposit escrowed, bidding not open yet
    Created,
    /// Accepting bids
    Started,
    /// Chest settled, terminal
    Ended,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::Started => "started",
            LifecycleState::Ended => "ended",
        }
    }
}

/// Persisted auction record, stored at the `auction` derived address.
///
/// Field order is the borsh layout; do not reorder.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct AuctionState {
    /// Creation-time uniquifier (milliseconds), part of every seed set
    pub id: i64,
    /// Creator of the auction
    pub authority: Address,
    /// Denomination identity the treasury deposit is held in
    pub treasury_mint: Address,
    /// Treasury wallet holding the creator's deposit
    pub treasury: Address,
    /// Collection wallet holding bid payments
    pub bidders_chest: Address,
    /// Amount escrowed into the treasury at initialization
    pub deposit: u64,
    pub starting_price: u64,
    /// Amount the next accepted bid must pay
    pub next_bid: u64,
    pub bid_count: u32,
    /// Whether the treasury deposit has been claimed after `end`
    pub claimed: bool,
    pub state: LifecycleState,
    pub last_bidder: Address,
    /// Bump of the auction's own derived address
    pub bump: u8,
}

impl AccountRecord for AuctionState {
    const NAME: &'static str = "AuctionState";
}

impl AuctionState {
    /// Serialized size in bytes, discriminator excluded.
    pub const LEN: usize = 8 // id
        + 32 // authority
        + 32 // treasury_mint
        + 32 // treasury
        + 32 // bidders_chest
        + 8 // deposit
        + 8 // starting_price
        + 8 // next_bid
        + 4 // bid_count
        + 1 // claimed
        + 1 // state
        + 32 // last_bidder
        + 1; // bump

    /// True once a bid has replaced the sentinel bidder.
    pub fn has_bids(&self) -> bool {
        self.last_bidder != NO_BIDDER
    }

    /// Account entitled to the treasury deposit once the auction has ended.
    pub fn winner(&self) -> Option<Address> {
        self.has_bids().then_some(self.last_bidder)
    }
}

/// One accepted bid, stored at the `bidder` derived address.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct BidRecord {
    /// Auction this bid belongs to
    pub auction: Address,
    pub bidder: Address,
    /// Amount paid into the chest
    pub bid_value: u64,
    /// Client-supplied timestamp, also part of the record's seeds
    pub ts: i64,
}

impl AccountRecord for BidRecord {
    const NAME: &'static str = "BidRecord";
}

impl BidRecord {
    pub const LEN: usize = 32 + 32 + 8 + 8;
}

/// Outcome of closing an auction.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct SettlementResult {
    pub auction: Address,
    /// Chest balance at the moment of settlement
    pub total: u64,
    pub creator_gain: u64,
    pub treasury_gain: u64,
    pub winner: Option<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_auction() -> AuctionState {
        AuctionState {
            id: 1_700_000_000_000,
            authority: [1u8; 32],
            treasury_mint: [2u8; 32],
            treasury: [3u8; 32],
            bidders_chest: [4u8; 32],
            deposit: 3 * BASE_UNITS_PER_UNIT,
            starting_price: 150_000_000,
            next_bid: 150_000_000,
            bid_count: 0,
            claimed: false,
            state: LifecycleState::Created,
            last_bidder: NO_BIDDER,
            bump: 254,
        }
    }

    #[test]
    fn test_auction_layout_is_fixed_size() {
        let encoded = borsh::to_vec(&sample_auction()).unwrap();
        assert_eq!(encoded.len(), AuctionState::LEN);

        let decoded: AuctionState = borsh::from_slice(&encoded).unwrap();
        assert_eq!(decoded, sample_auction());
    }

    #[test]
    fn test_bid_record_layout_is_fixed_size() {
        let record = BidRecord {
            auction: [9u8; 32],
            bidder: [8u8; 32],
            bid_value: 157_500_000,
            ts: -1,
        };
        assert_eq!(borsh::to_vec(&record).unwrap().len(), BidRecord::LEN);
    }

    #[test]
    fn test_account_data_rejects_other_records() {
        let data = sample_auction().to_account_data().unwrap();
        assert_eq!(data.len(), 8 + AuctionState::LEN);
        assert_eq!(AuctionState::from_account_data(&data), Some(sample_auction()));
        assert_eq!(BidRecord::from_account_data(&data), None);
        assert_eq!(AuctionState::from_account_data(&data[..4]), None);
    }

    #[test]
    fn test_winner_is_none_without_bids() {
        let mut auction = sample_auction();
        assert_eq!(auction.winner(), None);

        auction.last_bidder = [7u8; 32];
        assert_eq!(auction.winner(), Some([7u8; 32]));
    }

    #[test]
    fn test_address_hex_roundtrip_accepts_prefix() {
        let addr = [0xabu8; 32];
        let encoded = format!("0x{}", address_to_hex(&addr));
        assert_eq!(address_from_hex(&encoded), Some(addr));
        assert_eq!(address_from_hex("abcd"), None);
    }
}
