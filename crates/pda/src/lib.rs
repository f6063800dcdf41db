//! Program-derived addresses for escrow auctions.
//!
//! Every record and wallet an auction owns lives at an address computed
//! from fixed seeds rather than an allocated location:
//!
//! 1. **Hashing**: `sha256(seeds ‖ [bump] ‖ program_id ‖ "ProgramDerivedAddress")`.
//!
//! 2. **Bump search**: bumps are tried from 255 downwards; a candidate that
//!    decompresses to an ed25519 point could belong to a signing key and is
//!    skipped.
//!
//! 3. **Domains**: `auction`, `treasury`, `wallet` (the bidders' chest) and
//!    `bidder` each prefix their seeds with a fixed tag.
//!
//! Derivation is pure. Whether an address is already occupied is a question
//! for the ledger, not for this crate.

pub mod derive;
pub mod error;
pub mod seeds;

pub use derive::{create_program_address, find_program_address, is_on_curve};
pub use error::PdaError;
pub use seeds::{
    create_auction_address, create_bidders_chest_address, find_auction_address,
    find_bid_record_address, find_bidders_chest_address, find_treasury_address,
    AuctionAddresses, Domain,
};

/// Maximum number of seeds per derivation, bump included.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Marker appended to every derivation hash.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";
