//! Seed resolution and helpers for drawing from the run's single random stream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::{ChaCha8Rng, rand_core::Rng};

static GENERATED_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Uniform index in `0..len`. `len` must be non-zero.
pub(crate) fn random_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len as u64) as usize
}

pub(crate) fn random_bool(rng: &mut ChaCha8Rng) -> bool {
    rng.next_u64() & 1 == 1
}

pub(crate) fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> Option<T> {
    if slice.is_empty() {
        return None;
    }
    Some(slice[random_index(rng, slice.len())].clone())
}

/// Seed for a retry attempt; attempt zero keeps the caller's seed.
pub fn derive_attempt_seed(seed: u64, attempt: u64) -> u64 {
    if attempt == 0 {
        return seed;
    }
    mix_seed_stream(seed, attempt)
}

pub fn generate_runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(std::process::id());
    let counter = GENERATED_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    mix_seed_stream(entropy, 0)
}

pub(crate) fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    #[test]
    fn random_index_stays_inside_requested_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(12_345);
        for len in 1..40 {
            assert!(random_index(&mut rng, len) < len);
        }
    }

    #[test]
    fn attempt_seeds_differ_from_each_other_but_attempt_zero_is_identity() {
        assert_eq!(derive_attempt_seed(99, 0), 99);
        assert_ne!(derive_attempt_seed(99, 1), 99);
        assert_ne!(derive_attempt_seed(99, 1), derive_attempt_seed(99, 2));
        assert_eq!(derive_attempt_seed(99, 3), derive_attempt_seed(99, 3));
    }

    #[test]
    fn runtime_seeds_do_not_repeat_back_to_back() {
        assert_ne!(generate_runtime_seed(), generate_runtime_seed());
    }

    #[test]
    fn choose_returns_none_for_empty_slices() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty: [u8; 0] = [];
        assert_eq!(choose(&mut rng, &empty), None);
        assert_eq!(choose(&mut rng, &[5_u8]), Some(5));
    }
}
