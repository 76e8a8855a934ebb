//! Deterministic random stream derivation.
//!
//! A generation run owns one seed. Each pipeline stage draws from its own
//! ChaCha stream whose seed is the SHA-256 digest of the run seed and a stage
//! label, so adding draws to one stage never perturbs another.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Stream label consumed by wall generation.
pub const RNG_STREAM_WALLS: &str = "walls";
/// Stream label consumed by victim placement.
pub const RNG_STREAM_VICTIMS: &str = "victims";
/// Stream label consumed by rescue point selection.
pub const RNG_STREAM_RESCUE: &str = "rescue";

/// Derives the seed of a labelled sub-stream from the run seed.
#[must_use]
pub fn derive_stream_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

/// Creates the generator for a labelled sub-stream of the run seed.
#[must_use]
pub fn stream_rng(base: u64, label: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_stream_seed(base, label))
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
