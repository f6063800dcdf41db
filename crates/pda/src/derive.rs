//! Address hashing and bump search.

use crate::error::PdaError;
use crate::{MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER};
use auction_types::Address;
use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};

/// Whether 32 bytes decode to a point on the ed25519 curve.
///
/// Such addresses are reserved for keypairs.
pub fn is_on_curve(bytes: &Address) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

/// Hash one candidate address from the full seed list (bump included).
pub fn create_program_address(seeds: &[&[u8]], program_id: &Address) -> Result<Address, PdaError> {
    if seeds.len() > MAX_SEEDS {
        return Err(PdaError::TooManySeeds {
            max: MAX_SEEDS,
            got: seeds.len(),
        });
    }
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(PdaError::SeedTooLong {
                index,
                max: MAX_SEED_LEN,
                got: seed.len(),
            });
        }
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id);
    hasher.update(PDA_MARKER);
    let candidate: Address = hasher.finalize().into();

    if is_on_curve(&candidate) {
        return Err(PdaError::OnCurve);
    }
    Ok(candidate)
}

/// Find the first off-curve address, trying bumps from 255 down to 1.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), PdaError> {
    for bump in (1..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump = seeds.to_vec();
        with_bump.push(&bump_seed);

        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(PdaError::OnCurve) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(PdaError::BumpsExhausted)
}
