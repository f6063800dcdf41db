//! Bid preparation.

use auction_module::{AuctionCall, BidAccounts, Version};
use auction_pda::find_bid_record_address;
use auction_types::Address;

use crate::setup::now_ms;
use crate::ClientError;

/// A bid ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBid {
    /// Where the bid record will live
    pub bid_record: Address,
    pub bid_record_bump: u8,
    /// Timestamp baked into the record's seeds
    pub timestamp: i64,
    pub call: AuctionCall,
}

/// Builder for bids on one auction.
pub struct BidBuilder {
    program_id: Address,
    auction: Address,
    chest: Address,
    bidder: Address,
    timestamp: Option<i64>,
    expected_version: Version,
}

impl BidBuilder {
    /// Create a new bid builder.
    pub fn new(program_id: Address, auction: Address, chest: Address, bidder: Address) -> Self {
        Self {
            program_id,
            auction,
            chest,
            bidder,
            timestamp: None,
            expected_version: 0,
        }
    }

    /// Fix the timestamp instead of reading the clock at build time.
    ///
    /// Reusing a timestamp for the same bidder reproduces the same record
    /// address, which the engine rejects as a duplicate.
    pub fn timestamp(mut self, ts: i64) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Version of the auction record the bid was priced against.
    pub fn expected_version(mut self, version: Version) -> Self {
        self.expected_version = version;
        self
    }

    /// Build the prepared bid.
    pub fn build(self) -> Result<PreparedBid, ClientError> {
        let timestamp = self.timestamp.unwrap_or_else(now_ms);
        let (bid_record, bid_record_bump) =
            find_bid_record_address(&self.program_id, &self.auction, &self.bidder, timestamp)?;

        Ok(PreparedBid {
            bid_record,
            bid_record_bump,
            timestamp,
            call: AuctionCall::Bid {
                timestamp,
                expected_version: self.expected_version,
                accounts: BidAccounts {
                    state: self.auction,
                    chest: self.chest,
                    bid_record,
                },
            },
        })
    }
}
