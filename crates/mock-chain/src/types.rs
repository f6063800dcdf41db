//! RPC-compatible types for the mock chain.
//!
//! These types are JSON-serializable versions of the core auction types.
//! Addresses travel as hex strings.

use auction_module::{
    AuctionCall, BidAccounts, ClaimAccounts, EndAccounts, FeeSchedule, InitializeAccounts,
    VersionedAuction,
};
use auction_types::{address_from_hex, Address, BidRecord, SettlementResult};
use serde::{Deserialize, Serialize};

/// Parse a hex address, naming the offending field on failure.
pub fn parse_address(field: &str, s: &str) -> Result<Address, String> {
    address_from_hex(s).ok_or_else(|| format!("Invalid {field} address: {s}"))
}

/// Chain info response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainInfo {
    pub slot: u64,
    pub program_id: String,
    pub fees: FeeSchedule,
}

/// Parameters for initializing an auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeParams {
    pub sender: String,
    pub id: i64,
    pub state_bump: u8,
    pub deposit_amount: u64,
    pub state: String,
    pub treasury: String,
    pub chest: String,
    pub treasury_mint: String,
    /// Defaults to the sender
    pub deposit_source: Option<String>,
}

impl InitializeParams {
    pub fn into_call(self) -> Result<(Address, AuctionCall), String> {
        let sender = parse_address("sender", &self.sender)?;
        let deposit_source = match &self.deposit_source {
            Some(source) => parse_address("deposit_source", source)?,
            None => sender,
        };
        let call = AuctionCall::Initialize {
            id: self.id,
            state_bump: self.state_bump,
            deposit_amount: self.deposit_amount,
            accounts: InitializeAccounts {
                state: parse_address("state", &self.state)?,
                treasury: parse_address("treasury", &self.treasury)?,
                chest: parse_address("chest", &self.chest)?,
                treasury_mint: parse_address("treasury_mint", &self.treasury_mint)?,
                deposit_source,
            },
        };
        Ok((sender, call))
    }
}

/// Parameters for starting an auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartParams {
    pub sender: String,
    pub auction: String,
    pub expected_version: u64,
}

impl StartParams {
    pub fn into_call(self) -> Result<(Address, AuctionCall), String> {
        let sender = parse_address("sender", &self.sender)?;
        let call = AuctionCall::Start {
            auction: parse_address("auction", &self.auction)?,
            expected_version: self.expected_version,
        };
        Ok((sender, call))
    }
}

/// Parameters for placing a bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidParams {
    pub sender: String,
    pub auction: String,
    pub chest: String,
    pub bid_record: String,
    pub timestamp: i64,
    pub expected_version: u64,
}

impl BidParams {
    pub fn into_call(self) -> Result<(Address, AuctionCall), String> {
        let sender = parse_address("sender", &self.sender)?;
        let call = AuctionCall::Bid {
            timestamp: self.timestamp,
            expected_version: self.expected_version,
            accounts: BidAccounts {
                state: parse_address("auction", &self.auction)?,
                chest: parse_address("chest", &self.chest)?,
                bid_record: parse_address("bid_record", &self.bid_record)?,
            },
        };
        Ok((sender, call))
    }
}

/// Parameters for ending an auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndParams {
    pub sender: String,
    pub auction: String,
    pub chest: String,
    pub treasury_destination: String,
    pub chest_bump: u8,
    pub expected_version: u64,
}

impl EndParams {
    pub fn into_call(self) -> Result<(Address, AuctionCall), String> {
        let sender = parse_address("sender", &self.sender)?;
        let call = AuctionCall::End {
            chest_bump: self.chest_bump,
            expected_version: self.expected_version,
            accounts: EndAccounts {
                state: parse_address("auction", &self.auction)?,
                chest: parse_address("chest", &self.chest)?,
                treasury_destination: parse_address(
                    "treasury_destination",
                    &self.treasury_destination,
                )?,
            },
        };
        Ok((sender, call))
    }
}

/// Parameters for claiming the treasury.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimParams {
    pub sender: String,
    pub auction: String,
    pub treasury: String,
    /// Defaults to the sender
    pub destination: Option<String>,
    pub expected_version: u64,
}

impl ClaimParams {
    pub fn into_call(self) -> Result<(Address, AuctionCall), String> {
        let sender = parse_address("sender", &self.sender)?;
        let destination = match &self.destination {
            Some(destination) => parse_address("destination", destination)?,
            None => sender,
        };
        let call = AuctionCall::Claim {
            expected_version: self.expected_version,
            accounts: ClaimAccounts {
                state: parse_address("auction", &self.auction)?,
                treasury: parse_address("treasury", &self.treasury)?,
                destination,
            },
        };
        Ok((sender, call))
    }
}

/// Auction record for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionStateRpc {
    pub address: String,
    /// Version to quote in the next mutating call
    pub version: u64,
    pub id: i64,
    pub authority: String,
    pub treasury_mint: String,
    pub treasury: String,
    pub bidders_chest: String,
    pub deposit: u64,
    pub starting_price: u64,
    pub next_bid: u64,
    pub bid_count: u32,
    pub claimed: bool,
    pub state: String,
    /// `None` until the first bid
    pub last_bidder: Option<String>,
    pub bump: u8,
}

impl From<&VersionedAuction> for AuctionStateRpc {
    fn from(v: &VersionedAuction) -> Self {
        let a = &v.auction;
        Self {
            address: hex::encode(v.address),
            version: v.version,
            id: a.id,
            authority: hex::encode(a.authority),
            treasury_mint: hex::encode(a.treasury_mint),
            treasury: hex::encode(a.treasury),
            bidders_chest: hex::encode(a.bidders_chest),
            deposit: a.deposit,
            starting_price: a.starting_price,
            next_bid: a.next_bid,
            bid_count: a.bid_count,
            claimed: a.claimed,
            state: a.state.as_str().to_string(),
            last_bidder: a.winner().map(hex::encode),
            bump: a.bump,
        }
    }
}

/// Bid record for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidRecordRpc {
    pub auction: String,
    pub bidder: String,
    pub bid_value: u64,
    pub ts: i64,
}

impl From<&BidRecord> for BidRecordRpc {
    fn from(b: &BidRecord) -> Self {
        Self {
            auction: hex::encode(b.auction),
            bidder: hex::encode(b.bidder),
            bid_value: b.bid_value,
            ts: b.ts,
        }
    }
}

/// Settlement for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRpc {
    pub auction: String,
    pub total: u64,
    pub creator_gain: u64,
    pub treasury_gain: u64,
    pub winner: Option<String>,
}

impl From<SettlementResult> for SettlementRpc {
    fn from(r: SettlementResult) -> Self {
        Self {
            auction: hex::encode(r.auction),
            total: r.total,
            creator_gain: r.creator_gain,
            treasury_gain: r.treasury_gain,
            winner: r.winner.map(hex::encode),
        }
    }
}
