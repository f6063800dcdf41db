//! Events emitted by successful auction calls.

use auction_types::Address;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// Prefix of every event line written to the transaction log.
pub const EVENT_LOG_PREFIX: &str = "event: ";

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "label", rename_all = "snake_case")]
pub enum AuctionEvent {
    Initialized {
        #[serde_as(as = "Hex")]
        auction: Address,
        #[serde_as(as = "Hex")]
        authority: Address,
        deposit: u64,
        starting_price: u64,
    },
    Started {
        #[serde_as(as = "Hex")]
        auction: Address,
    },
    BidPlaced {
        #[serde_as(as = "Hex")]
        auction: Address,
        #[serde_as(as = "Hex")]
        bidder: Address,
        bid_value: u64,
        next_bid: u64,
        ts: i64,
    },
    Ended {
        #[serde_as(as = "Hex")]
        auction: Address,
        creator_gain: u64,
        treasury_gain: u64,
    },
    Claimed {
        #[serde_as(as = "Hex")]
        auction: Address,
        #[serde_as(as = "Hex")]
        claimant: Address,
        amount: u64,
    },
}

impl AuctionEvent {
    pub fn auction(&self) -> &Address {
        match self {
            AuctionEvent::Initialized { auction, .. }
            | AuctionEvent::Started { auction }
            | AuctionEvent::BidPlaced { auction, .. }
            | AuctionEvent::Ended { auction, .. }
            | AuctionEvent::Claimed { auction, .. } => auction,
        }
    }

    /// Log line form: [`EVENT_LOG_PREFIX`] followed by JSON.
    pub fn log_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => format!("{EVENT_LOG_PREFIX}{json}"),
            Err(e) => format!("{EVENT_LOG_PREFIX}{{\"error\":\"{e}\"}}"),
        }
    }

    /// Parse a log line produced by [`AuctionEvent::log_line`].
    pub fn from_log_line(line: &str) -> Option<Self> {
        serde_json::from_str(line.strip_prefix(EVENT_LOG_PREFIX)?).ok()
    }
}
