//! Auction setup: address derivation and lifecycle calls.

use std::time::{SystemTime, UNIX_EPOCH};

use auction_module::{AuctionCall, ClaimAccounts, EndAccounts, InitializeAccounts, Version};
use auction_pda::AuctionAddresses;
use auction_types::Address;

use crate::bid::BidBuilder;
use crate::ClientError;

/// Offset added to the wall clock when minting an auction id (30 minutes).
pub const ID_OFFSET_MS: i64 = 30 * 60 * 1000;

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

pub fn auction_id_from_clock(now_ms: i64) -> i64 {
    now_ms + ID_OFFSET_MS
}

/// Everything a creator needs to open and drive one auction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuctionSetup {
    pub program_id: Address,
    pub creator: Address,
    pub mint: Address,
    pub addresses: AuctionAddresses,
}

impl AuctionSetup {
    /// Derive a fresh auction whose id comes from the clock reading `now_ms`.
    pub fn derive(
        program_id: Address,
        creator: Address,
        mint: Address,
        now_ms: i64,
    ) -> Result<Self, ClientError> {
        Self::with_id(program_id, creator, mint, auction_id_from_clock(now_ms))
    }

    /// Re-derive an existing auction from its id.
    pub fn with_id(
        program_id: Address,
        creator: Address,
        mint: Address,
        id: i64,
    ) -> Result<Self, ClientError> {
        let addresses = AuctionAddresses::derive(&program_id, &creator, &mint, id)?;
        Ok(Self {
            program_id,
            creator,
            mint,
            addresses,
        })
    }

    pub fn id(&self) -> i64 {
        self.addresses.id
    }

    pub fn auction(&self) -> &Address {
        &self.addresses.auction
    }

    /// Deposit from `deposit_source`, or from the creator when `None`.
    pub fn initialize_call(&self, deposit_amount: u64, deposit_source: Option<Address>) -> AuctionCall {
        AuctionCall::Initialize {
            id: self.addresses.id,
            state_bump: self.addresses.auction_bump,
            deposit_amount,
            accounts: InitializeAccounts {
                state: self.addresses.auction,
                treasury: self.addresses.treasury,
                chest: self.addresses.bidders_chest,
                treasury_mint: self.mint,
                deposit_source: deposit_source.unwrap_or(self.creator),
            },
        }
    }

    pub fn start_call(&self, expected_version: Version) -> AuctionCall {
        AuctionCall::Start {
            auction: self.addresses.auction,
            expected_version,
        }
    }

    /// End the auction, paying the chest remainder to `treasury_destination`.
    pub fn end_call(&self, expected_version: Version, treasury_destination: Address) -> AuctionCall {
        AuctionCall::End {
            chest_bump: self.addresses.chest_bump,
            expected_version,
            accounts: EndAccounts {
                state: self.addresses.auction,
                chest: self.addresses.bidders_chest,
                treasury_destination,
            },
        }
    }

    pub fn claim_call(&self, expected_version: Version, destination: Address) -> AuctionCall {
        AuctionCall::Claim {
            expected_version,
            accounts: ClaimAccounts {
                state: self.addresses.auction,
                treasury: self.addresses.treasury,
                destination,
            },
        }
    }

    /// Start a bid on this auction for `bidder`.
    pub fn bid(&self, bidder: Address) -> BidBuilder {
        BidBuilder::new(
            self.program_id,
            self.addresses.auction,
            self.addresses.bidders_chest,
            bidder,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: Address = [5u8; 32];

    #[test]
    fn test_id_is_clock_plus_thirty_minutes() {
        let setup = AuctionSetup::derive(PROGRAM, [1u8; 32], [2u8; 32], 1_000).unwrap();
        assert_eq!(setup.id(), 1_000 + 1_800_000);
    }

    #[test]
    fn test_with_id_matches_derive() {
        let a = AuctionSetup::derive(PROGRAM, [1u8; 32], [2u8; 32], 0).unwrap();
        let b = AuctionSetup::with_id(PROGRAM, [1u8; 32], [2u8; 32], ID_OFFSET_MS).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_initialize_call_defaults_to_creator_source() {
        let setup = AuctionSetup::derive(PROGRAM, [1u8; 32], [2u8; 32], 0).unwrap();
        match setup.initialize_call(500, None) {
            AuctionCall::Initialize {
                state_bump,
                accounts,
                ..
            } => {
                assert_eq!(state_bump, setup.addresses.auction_bump);
                assert_eq!(accounts.deposit_source, [1u8; 32]);
                assert_eq!(accounts.chest, setup.addresses.bidders_chest);
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[test]
    fn test_end_call_carries_chest_bump() {
        let setup = AuctionSetup::derive(PROGRAM, [1u8; 32], [2u8; 32], 0).unwrap();
        let call = setup.end_call(4, setup.addresses.treasury);
        assert!(matches!(
            call,
            AuctionCall::End { chest_bump, expected_version: 4, .. } if chest_bump == setup.addresses.chest_bump
        ));
    }
}
