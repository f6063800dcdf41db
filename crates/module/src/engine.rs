//! The auction engine: handlers bound to one ledger and one configuration.

use crate::call::{AuctionCall, BidAccounts, ClaimAccounts, EndAccounts, InitializeAccounts};
use crate::genesis::{AuctionGenesisConfig, GenesisValidationError};
use crate::handlers::{self, CallContext, HandlerResult};
use crate::ledger::{Ledger, Version};
use crate::queries::{self, AuctionQuery, AuctionQueryResponse, VersionedAuction};
use auction_types::{Address, AuctionState, BidRecord, SettlementResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a successful call produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Initialized(AuctionState),
    Started(AuctionState),
    BidPlaced(BidRecord),
    Ended(SettlementResult),
    Claimed { amount: u64 },
}

/// Runs auction calls against an injected [`Ledger`].
#[derive(Debug)]
pub struct AuctionEngine<L> {
    ledger: L,
    config: AuctionGenesisConfig,
}

impl<L: Ledger> AuctionEngine<L> {
    pub fn new(ledger: L, config: AuctionGenesisConfig) -> Result<Self, GenesisValidationError> {
        config.validate()?;
        Ok(Self { ledger, config })
    }

    pub fn config(&self) -> &AuctionGenesisConfig {
        &self.config
    }

    pub fn program_id(&self) -> &Address {
        &self.config.program_id
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    /// Dispatch a call message.
    pub fn execute(&mut self, ctx: &CallContext, call: AuctionCall) -> HandlerResult<CallOutcome> {
        let name = call.name();
        let auction = *call.auction();
        let result = match call {
            AuctionCall::Initialize {
                id,
                state_bump,
                deposit_amount,
                accounts,
            } => self
                .initialize(ctx, id, state_bump, deposit_amount, &accounts)
                .map(CallOutcome::Initialized),
            AuctionCall::Start {
                auction,
                expected_version,
            } => self
                .start(ctx, &auction, expected_version)
                .map(CallOutcome::Started),
            AuctionCall::Bid {
                timestamp,
                expected_version,
                accounts,
            } => self
                .bid(ctx, timestamp, expected_version, &accounts)
                .map(CallOutcome::BidPlaced),
            AuctionCall::End {
                chest_bump,
                expected_version,
                accounts,
            } => self
                .end(ctx, chest_bump, expected_version, &accounts)
                .map(CallOutcome::Ended),
            AuctionCall::Claim {
                expected_version,
                accounts,
            } => self
                .claim(ctx, expected_version, &accounts)
                .map(|amount| CallOutcome::Claimed { amount }),
        };

        if let Err(e) = &result {
            warn!(
                call = name,
                auction = %hex::encode(auction),
                sender = %hex::encode(ctx.sender),
                error = %e,
                "call rejected"
            );
        }
        result
    }

    pub fn initialize(
        &mut self,
        ctx: &CallContext,
        id: i64,
        state_bump: u8,
        deposit_amount: u64,
        accounts: &InitializeAccounts,
    ) -> HandlerResult<AuctionState> {
        handlers::handle_initialize(
            &mut self.ledger,
            &self.config,
            ctx,
            id,
            state_bump,
            deposit_amount,
            accounts,
        )
    }

    pub fn start(
        &mut self,
        ctx: &CallContext,
        auction: &Address,
        expected_version: Version,
    ) -> HandlerResult<AuctionState> {
        handlers::handle_start(&mut self.ledger, &self.config, ctx, auction, expected_version)
    }

    pub fn bid(
        &mut self,
        ctx: &CallContext,
        timestamp: i64,
        expected_version: Version,
        accounts: &BidAccounts,
    ) -> HandlerResult<BidRecord> {
        handlers::handle_bid(
            &mut self.ledger,
            &self.config,
            ctx,
            timestamp,
            expected_version,
            accounts,
        )
    }

    pub fn end(
        &mut self,
        ctx: &CallContext,
        chest_bump: u8,
        expected_version: Version,
        accounts: &EndAccounts,
    ) -> HandlerResult<SettlementResult> {
        handlers::handle_end(
            &mut self.ledger,
            &self.config,
            ctx,
            chest_bump,
            expected_version,
            accounts,
        )
    }

    pub fn claim(
        &mut self,
        ctx: &CallContext,
        expected_version: Version,
        accounts: &ClaimAccounts,
    ) -> HandlerResult<u64> {
        handlers::handle_claim(&mut self.ledger, &self.config, ctx, expected_version, accounts)
    }

    pub fn query(&self, query: AuctionQuery) -> AuctionQueryResponse {
        queries::handle_query(&self.ledger, &self.config.program_id, query)
    }

    pub fn auction(&self, address: &Address) -> Option<VersionedAuction> {
        queries::get_auction(&self.ledger, &self.config.program_id, address)
    }
}
