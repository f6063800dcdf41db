//! Genesis configuration for the auction module.
//!
//! This module defines the program identity and the fee schedule the engine
//! runs with from the moment the chain starts.

use crate::fees::{FeeSchedule, BPS_DENOMINATOR};
use auction_types::Address;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// Program id the auction accounts are derived under and owned by.
pub const DEFAULT_PROGRAM_ID: Address = [
    192, 214, 131, 223, 160, 147, 48, 132, 35, 19, 115, 38, 16, 148, 200, 243, 15, 143, 231, 18,
    163, 236, 117, 25, 138, 215, 222, 93, 247, 88, 170, 223,
];

/// Genesis configuration for the auction module.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionGenesisConfig {
    /// Program id, hex encoded on the wire
    #[serde_as(as = "Hex")]
    pub program_id: Address,

    /// Pricing and settlement rates
    #[serde(default)]
    pub fees: FeeSchedule,
}

impl Default for AuctionGenesisConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            fees: FeeSchedule::default(),
        }
    }
}

impl AuctionGenesisConfig {
    /// Default rates under a different program id.
    pub fn with_program_id(program_id: Address) -> Self {
        Self {
            program_id,
            ..Default::default()
        }
    }

    /// Validate the genesis configuration.
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        if self.program_id == [0u8; 32] {
            return Err(GenesisValidationError::InvalidProgramId);
        }

        if self.fees.starting_price_bps == 0 || self.fees.starting_price_bps > BPS_DENOMINATOR {
            return Err(GenesisValidationError::InvalidFeeSchedule(format!(
                "starting price must be within (0, {BPS_DENOMINATOR}] bps, got {}",
                self.fees.starting_price_bps
            )));
        }

        // A zero premium would let next_bid stall.
        if self.fees.bid_premium_bps == 0 || self.fees.bid_premium_bps > BPS_DENOMINATOR {
            return Err(GenesisValidationError::InvalidFeeSchedule(format!(
                "bid premium must be within (0, {BPS_DENOMINATOR}] bps, got {}",
                self.fees.bid_premium_bps
            )));
        }

        if self.fees.creator_share_bps > BPS_DENOMINATOR {
            return Err(GenesisValidationError::InvalidFeeSchedule(format!(
                "creator share cannot exceed {BPS_DENOMINATOR} bps, got {}",
                self.fees.creator_share_bps
            )));
        }

        Ok(())
    }
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenesisValidationError {
    #[error("Program id cannot be the system address")]
    InvalidProgramId,

    #[error("Invalid fee schedule: {0}")]
    InvalidFeeSchedule(String),
}
