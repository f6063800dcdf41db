//! Error types for address derivation.

use thiserror::Error;

/// Errors that can occur while deriving an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PdaError {
    #[error("Too many seeds: max {max}, got {got}")]
    TooManySeeds { max: usize, got: usize },

    #[error("Seed {index} too long: max {max} bytes, got {got}")]
    SeedTooLong { index: usize, max: usize, got: usize },

    #[error("Derived address lies on the ed25519 curve")]
    OnCurve,

    #[error("No bump produced a valid address")]
    BumpsExhausted,
}
