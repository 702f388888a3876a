// Copyright @yucwang 2026

use rand::rngs::StdRng;
use rand::SeedableRng;

pub type SampleRng = StdRng;

// Large odd constant used to spread worker indices across the seed space.
const WORKER_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Generator for one render thread.
///
/// With no base seed the state comes from OS entropy, so no two workers
/// share a stream. With a base seed each worker index gets its own
/// deterministic stream.
pub fn worker_rng(seed: Option<u64>, worker: usize) -> SampleRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ (worker as u64 + 1).wrapping_mul(WORKER_SEED_STRIDE)),
        None => StdRng::from_entropy(),
    }
}
