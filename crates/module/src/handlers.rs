//! Call handlers for the auction module.
//!
//! These functions implement the business logic for each call type. Every
//! handler reads what it needs through the [`Ledger`], checks all of its
//! preconditions, and only then submits a single transaction. A handler that
//! returns an error has not changed the ledger.

use crate::call::{BidAccounts, ClaimAccounts, EndAccounts, InitializeAccounts};
use crate::error::AuctionError;
use crate::events::AuctionEvent;
use crate::genesis::AuctionGenesisConfig;
use crate::ledger::{Ledger, Transaction, Version};
use auction_pda::{
    create_bidders_chest_address, find_auction_address, find_bid_record_address,
    find_bidders_chest_address, find_treasury_address,
};
use auction_types::{
    Address, AccountRecord, AuctionState, BidRecord, LifecycleState, SettlementResult, NO_BIDDER,
};
use tracing::{debug, info};

/// Context provided by the runtime for each call.
#[derive(Clone, Debug)]
pub struct CallContext {
    /// Signer of the transaction
    pub sender: Address,
}

impl CallContext {
    pub fn new(sender: Address) -> Self {
        Self { sender }
    }
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, AuctionError>;

/// Read and decode the auction record at `address` with its current version.
pub fn load_auction<L: Ledger + ?Sized>(
    ledger: &L,
    program_id: &Address,
    address: &Address,
) -> HandlerResult<(AuctionState, Version)> {
    let account = ledger
        .account(address)
        .ok_or(AuctionError::AuctionNotFound(*address))?;
    if account.owner != *program_id {
        return Err(AuctionError::InvalidAccountData(*address));
    }
    let auction = AuctionState::from_account_data(&account.data)
        .ok_or(AuctionError::InvalidAccountData(*address))?;
    Ok((auction, account.version))
}

fn encode<R: AccountRecord>(record: &R, address: &Address) -> HandlerResult<Vec<u8>> {
    record
        .to_account_data()
        .map_err(|_| AuctionError::InvalidAccountData(*address))
}

fn check_version(expected: Version, actual: Version) -> HandlerResult<()> {
    if expected != actual {
        return Err(AuctionError::StaleState { expected, actual });
    }
    Ok(())
}

fn check_address(role: &'static str, supplied: &Address, derived: &Address) -> HandlerResult<()> {
    if supplied != derived {
        return Err(AuctionError::AddressMismatch { role });
    }
    Ok(())
}

/// The all-zero identity is the bidder sentinel and the system owner; it never signs.
fn check_sender(ctx: &CallContext) -> HandlerResult<()> {
    if ctx.sender == NO_BIDDER {
        return Err(AuctionError::Unauthorized);
    }
    Ok(())
}

fn emit(tx: &mut Transaction, event: &AuctionEvent) {
    debug!(event = ?event, "auction event");
    tx.log(event.log_line());
}

/// Handle Initialize call.
pub fn handle_initialize<L: Ledger + ?Sized>(
    ledger: &mut L,
    config: &AuctionGenesisConfig,
    ctx: &CallContext,
    id: i64,
    state_bump: u8,
    deposit_amount: u64,
    accounts: &InitializeAccounts,
) -> HandlerResult<AuctionState> {
    check_sender(ctx)?;
    let program_id = &config.program_id;
    let creator = ctx.sender;
    let mint = &accounts.treasury_mint;

    // Verify every supplied address against its derivation
    let (auction_addr, auction_bump) = find_auction_address(program_id, &creator, mint, id)?;
    check_address("state", &accounts.state, &auction_addr)?;
    if state_bump != auction_bump {
        return Err(AuctionError::AddressMismatch { role: "state_bump" });
    }
    let (treasury_addr, _) = find_treasury_address(program_id, &creator, mint, id)?;
    check_address("treasury", &accounts.treasury, &treasury_addr)?;
    let (chest_addr, _) = find_bidders_chest_address(program_id, &creator, id)?;
    check_address("chest", &accounts.chest, &chest_addr)?;

    for address in [&auction_addr, &treasury_addr, &chest_addr] {
        if ledger.exists(address) {
            return Err(AuctionError::AlreadyInitialized(*address));
        }
    }

    // The deposit must come from the creator or a wallet the creator owns
    let source = accounts.deposit_source;
    if source != creator {
        let controlled = ledger
            .account(&source)
            .map(|account| account.owner == creator)
            .unwrap_or(false);
        if !controlled {
            return Err(AuctionError::Unauthorized);
        }
    }

    let starting_price = config.fees.starting_price(deposit_amount)?;
    if starting_price == 0 {
        return Err(AuctionError::InvalidDepositAmount(deposit_amount));
    }

    let available = ledger.balance(&source);
    if available < deposit_amount {
        return Err(AuctionError::InsufficientFunds {
            required: deposit_amount,
            available,
        });
    }

    let auction = AuctionState {
        id,
        authority: creator,
        treasury_mint: *mint,
        treasury: treasury_addr,
        bidders_chest: chest_addr,
        deposit: deposit_amount,
        starting_price,
        next_bid: starting_price,
        bid_count: 0,
        claimed: false,
        state: LifecycleState::Created,
        last_bidder: NO_BIDDER,
        bump: auction_bump,
    };

    let mut tx = Transaction::new(*program_id, creator);
    tx.create_account(treasury_addr, *program_id, Vec::new())
        .create_account(chest_addr, *program_id, Vec::new())
        .transfer(source, treasury_addr, deposit_amount)
        .create_account(auction_addr, *program_id, encode(&auction, &auction_addr)?);
    emit(
        &mut tx,
        &AuctionEvent::Initialized {
            auction: auction_addr,
            authority: creator,
            deposit: deposit_amount,
            starting_price,
        },
    );
    ledger.submit_transaction(tx)?;

    info!(
        auction = %hex::encode(auction_addr),
        id,
        deposit = deposit_amount,
        starting_price,
        "auction initialized"
    );
    Ok(auction)
}

/// Handle Start call.
pub fn handle_start<L: Ledger + ?Sized>(
    ledger: &mut L,
    config: &AuctionGenesisConfig,
    ctx: &CallContext,
    auction_addr: &Address,
    expected_version: Version,
) -> HandlerResult<AuctionState> {
    check_sender(ctx)?;
    let (mut auction, version) = load_auction(&*ledger, &config.program_id, auction_addr)?;

    if ctx.sender != auction.authority {
        return Err(AuctionError::Unauthorized);
    }
    if auction.state != LifecycleState::Created {
        return Err(AuctionError::InvalidStateTransition {
            from: auction.state,
            to: LifecycleState::Started,
        });
    }
    check_version(expected_version, version)?;

    auction.state = LifecycleState::Started;

    let mut tx = Transaction::new(config.program_id, ctx.sender);
    tx.write_data(*auction_addr, version, encode(&auction, auction_addr)?);
    emit(
        &mut tx,
        &AuctionEvent::Started {
            auction: *auction_addr,
        },
    );
    ledger.submit_transaction(tx)?;

    info!(auction = %hex::encode(auction_addr), "auction started");
    Ok(auction)
}

/// Handle Bid call.
pub fn handle_bid<L: Ledger + ?Sized>(
    ledger: &mut L,
    config: &AuctionGenesisConfig,
    ctx: &CallContext,
    timestamp: i64,
    expected_version: Version,
    accounts: &BidAccounts,
) -> HandlerResult<BidRecord> {
    check_sender(ctx)?;
    let program_id = &config.program_id;
    let bidder = ctx.sender;
    let (mut auction, version) = load_auction(&*ledger, program_id, &accounts.state)?;

    if auction.state != LifecycleState::Started {
        return Err(AuctionError::AuctionNotStarted(auction.state));
    }
    if bidder == auction.authority {
        return Err(AuctionError::CreatorCannotBid);
    }
    check_address("chest", &accounts.chest, &auction.bidders_chest)?;

    let (record_addr, _) = find_bid_record_address(program_id, &accounts.state, &bidder, timestamp)?;
    check_address("bid_record", &accounts.bid_record, &record_addr)?;
    if ledger.exists(&record_addr) {
        return Err(AuctionError::DuplicateBid(record_addr));
    }

    if bidder == auction.last_bidder {
        return Err(AuctionError::AlreadyLastBidder);
    }

    let price = auction.next_bid;
    let available = ledger.balance(&bidder);
    if available < price {
        return Err(AuctionError::InsufficientFunds {
            required: price,
            available,
        });
    }
    check_version(expected_version, version)?;

    let record = BidRecord {
        auction: accounts.state,
        bidder,
        bid_value: price,
        ts: timestamp,
    };
    auction.last_bidder = bidder;
    auction.next_bid = config.fees.next_bid(price)?;
    auction.bid_count = auction
        .bid_count
        .checked_add(1)
        .ok_or(AuctionError::ArithmeticOverflow)?;

    let mut tx = Transaction::new(*program_id, bidder);
    tx.transfer(bidder, auction.bidders_chest, price)
        .create_account(record_addr, *program_id, encode(&record, &record_addr)?)
        .write_data(accounts.state, version, encode(&auction, &accounts.state)?);
    emit(
        &mut tx,
        &AuctionEvent::BidPlaced {
            auction: accounts.state,
            bidder,
            bid_value: price,
            next_bid: auction.next_bid,
            ts: timestamp,
        },
    );
    ledger.submit_transaction(tx)?;

    info!(
        auction = %hex::encode(accounts.state),
        bidder = %hex::encode(bidder),
        bid_value = price,
        next_bid = auction.next_bid,
        "bid accepted"
    );
    Ok(record)
}

/// Handle End call.
pub fn handle_end<L: Ledger + ?Sized>(
    ledger: &mut L,
    config: &AuctionGenesisConfig,
    ctx: &CallContext,
    chest_bump: u8,
    expected_version: Version,
    accounts: &EndAccounts,
) -> HandlerResult<SettlementResult> {
    check_sender(ctx)?;
    let program_id = &config.program_id;
    let (mut auction, version) = load_auction(&*ledger, program_id, &accounts.state)?;

    if ctx.sender != auction.authority {
        return Err(AuctionError::Unauthorized);
    }
    if auction.state != LifecycleState::Started {
        return Err(AuctionError::InvalidStateTransition {
            from: auction.state,
            to: LifecycleState::Ended,
        });
    }
    check_address("chest", &accounts.chest, &auction.bidders_chest)?;
    let chest = create_bidders_chest_address(program_id, &auction.authority, auction.id, chest_bump)
        .map_err(|_| AuctionError::AddressMismatch { role: "chest_bump" })?;
    check_address("chest_bump", &chest, &auction.bidders_chest)?;
    if accounts.treasury_destination == chest {
        return Err(AuctionError::InvalidTreasuryDestination);
    }
    check_version(expected_version, version)?;

    let total = ledger.balance(&chest);
    let split = config.fees.split(total);
    auction.state = LifecycleState::Ended;

    let mut tx = Transaction::new(*program_id, ctx.sender);
    if split.creator_gain > 0 {
        tx.transfer(chest, auction.authority, split.creator_gain);
    }
    if split.treasury_gain > 0 {
        tx.transfer(chest, accounts.treasury_destination, split.treasury_gain);
    }
    tx.write_data(accounts.state, version, encode(&auction, &accounts.state)?);
    emit(
        &mut tx,
        &AuctionEvent::Ended {
            auction: accounts.state,
            creator_gain: split.creator_gain,
            treasury_gain: split.treasury_gain,
        },
    );
    ledger.submit_transaction(tx)?;

    info!(
        auction = %hex::encode(accounts.state),
        total,
        creator_gain = split.creator_gain,
        treasury_gain = split.treasury_gain,
        "auction ended"
    );
    Ok(SettlementResult {
        auction: accounts.state,
        total,
        creator_gain: split.creator_gain,
        treasury_gain: split.treasury_gain,
        winner: auction.winner(),
    })
}

/// Handle Claim call. Releases the escrowed deposit and returns its amount.
///
/// Anything else the treasury holds, such as a settlement share routed there
/// by `end`, stays put.
pub fn handle_claim<L: Ledger + ?Sized>(
    ledger: &mut L,
    config: &AuctionGenesisConfig,
    ctx: &CallContext,
    expected_version: Version,
    accounts: &ClaimAccounts,
) -> HandlerResult<u64> {
    check_sender(ctx)?;
    let program_id = &config.program_id;
    let (mut auction, version) = load_auction(&*ledger, program_id, &accounts.state)?;

    if auction.state != LifecycleState::Ended {
        return Err(AuctionError::InvalidStateTransition {
            from: auction.state,
            to: LifecycleState::Ended,
        });
    }
    if auction.claimed {
        return Err(AuctionError::AlreadyClaimed);
    }
    match auction.winner() {
        Some(winner) if ctx.sender != winner => return Err(AuctionError::NotWinner),
        None if ctx.sender != auction.authority => return Err(AuctionError::Unauthorized),
        _ => {}
    }
    check_address("treasury", &accounts.treasury, &auction.treasury)?;
    let amount = auction.deposit;
    let available = ledger.balance(&auction.treasury);
    if available < amount {
        return Err(AuctionError::InsufficientFunds {
            required: amount,
            available,
        });
    }
    check_version(expected_version, version)?;

    auction.claimed = true;

    let mut tx = Transaction::new(*program_id, ctx.sender);
    tx.transfer(auction.treasury, accounts.destination, amount);
    tx.write_data(accounts.state, version, encode(&auction, &accounts.state)?);
    emit(
        &mut tx,
        &AuctionEvent::Claimed {
            auction: accounts.state,
            claimant: ctx.sender,
            amount,
        },
    );
    ledger.submit_transaction(tx)?;

    info!(
        auction = %hex::encode(accounts.state),
        claimant = %hex::encode(ctx.sender),
        amount,
        "treasury claimed"
    );
    Ok(amount)
}
