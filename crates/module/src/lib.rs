//! Escrow auction module.
//!
//! This module implements the program logic of escrow-backed ascending
//! auctions:
//!
//! - Auction initialization with a treasury deposit held at derived addresses
//! - Bidding at a fixed price that rises 5% after every accepted bid
//! - Settlement that splits the bidders' chest 75/25 between creator and treasury
//! - Release of the treasury deposit to the winner
//!
//! # Architecture
//!
//! - `ledger`: The storage capability the engine is given
//! - `state`: In-memory ledger used by the mock chain and tests
//! - `call`: Message types for state-changing operations
//! - `handlers`: Business logic for processing calls
//! - `engine`: Handlers bound to a ledger and a configuration
//! - `queries`: Read-only state access
//! - `fees`: Pricing and split arithmetic
//! - `events`: Events written to the transaction log
//! - `genesis`: Initial configuration
//! - `error`: Error types
//!
//! # Example
//!
//! ```ignore
//! use auction_module::{AuctionEngine, AuctionGenesisConfig, CallContext, InMemoryLedger};
//!
//! let mut engine = AuctionEngine::new(InMemoryLedger::new(), AuctionGenesisConfig::default())?;
//! let ctx = CallContext::new(creator);
//!
//! // Create an auction
//! let auction = engine.initialize(&ctx, id, bump, deposit, &accounts)?;
//!
//! // Open bidding
//! engine.start(&ctx, &address, version)?;
//! ```

pub mod call;
pub mod engine;
pub mod error;
pub mod events;
pub mod fees;
pub mod genesis;
pub mod handlers;
pub mod ledger;
pub mod queries;
pub mod state;

pub use call::{AuctionCall, BidAccounts, ClaimAccounts, EndAccounts, InitializeAccounts};
pub use engine::{AuctionEngine, CallOutcome};
pub use error::AuctionError;
pub use events::AuctionEvent;
pub use fees::{FeeSchedule, Split};
pub use genesis::{AuctionGenesisConfig, GenesisValidationError, DEFAULT_PROGRAM_ID};
pub use handlers::{CallContext, HandlerResult};
pub use ledger::{Account, Ledger, LedgerError, Receipt, Transaction, Version};
pub use queries::{AuctionQuery, AuctionQueryResponse, VersionedAuction};
pub use state::{InMemoryLedger, TransactionLog};
