//! Random variant subset selection

use crate::types::VariantBase;
use rand::seq::SliceRandom;
use rand::Rng;

/// Smallest number of variants a seeded user receives
pub const DEFAULT_MIN_VARIANTS: usize = 2;

/// Pick how many variants a user gets: uniform over `[min_variants, total]`.
///
/// When fewer than `min_variants` variants exist, all of them are taken.
pub fn subset_size<R: Rng>(total: usize, min_variants: usize, rng: &mut R) -> usize {
    if total <= min_variants {
        total
    } else {
        rng.random_range(min_variants..=total)
    }
}

/// Choose a uniformly random subset of `variants` without replacement.
///
/// The pool is permuted with a Fisher-Yates shuffle before truncation, so
/// every subset of a given size is equally likely.
pub fn select_variants<'a, R: Rng>(
    variants: &'a [VariantBase],
    min_variants: usize,
    rng: &mut R,
) -> Vec<&'a VariantBase> {
    let mut pool: Vec<&VariantBase> = variants.iter().collect();
    pool.shuffle(rng);

    let count = subset_size(pool.len(), min_variants, rng);
    pool.truncate(count);
    pool
}
