//! Pricing and settlement arithmetic.
//!
//! All rates are basis points over [`BPS_DENOMINATOR`]. Intermediate products
//! are computed in `u128`, so only the final narrowing can overflow.

use crate::error::AuctionError;
use serde::{Deserialize, Serialize};

/// One whole in basis points.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Rates applied by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Share of the deposit that becomes the starting price
    pub starting_price_bps: u64,
    /// Premium added to `next_bid` after each accepted bid
    pub bid_premium_bps: u64,
    /// Share of the chest paid to the creator at `end`
    pub creator_share_bps: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            starting_price_bps: 500,
            bid_premium_bps: 500,
            creator_share_bps: 7_500,
        }
    }
}

/// Split of a drained chest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Split {
    pub creator_gain: u64,
    pub treasury_gain: u64,
}

fn narrow(value: u128) -> Result<u64, AuctionError> {
    u64::try_from(value).map_err(|_| AuctionError::ArithmeticOverflow)
}

impl FeeSchedule {
    /// `floor(deposit × starting_price_bps / 10_000)`.
    pub fn starting_price(&self, deposit: u64) -> Result<u64, AuctionError> {
        narrow(deposit as u128 * self.starting_price_bps as u128 / BPS_DENOMINATOR as u128)
    }

    /// Price of the bid after one paying `current`, rounded half up.
    pub fn next_bid(&self, current: u64) -> Result<u64, AuctionError> {
        let denominator = BPS_DENOMINATOR as u128;
        let scaled = current as u128 * (denominator + self.bid_premium_bps as u128);
        narrow((scaled + denominator / 2) / denominator)
    }

    /// Creator receives the floored share; the treasury takes the remainder.
    pub fn split(&self, total: u64) -> Split {
        let creator_gain =
            (total as u128 * self.creator_share_bps as u128 / BPS_DENOMINATOR as u128) as u64;
        Split {
            creator_gain,
            treasury_gain: total - creator_gain,
        }
    }

    /// Amount the `k`-th bid (1-based) pays, starting from `starting_price`.
    pub fn price_of_bid(&self, starting_price: u64, k: u32) -> Result<u64, AuctionError> {
        let mut price = starting_price;
        for _ in 1..k {
            price = self.next_bid(price)?;
        }
        Ok(price)
    }
}
