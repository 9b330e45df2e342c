//! Test fixtures shared by the integration tests

use rand::rngs::StdRng;
use rand::SeedableRng;
use rating_seeder::config::SeedSettings;
use rating_seeder::types::{default_variants, RankingMode, RatingTriple, UserRecord, VariantBase};
use rating_seeder::{InMemoryUserStore, SeedGenerator, Seeder};

/// Store holding the given usernames, with ids "u1", "u2", ...
pub fn store_with_usernames(names: &[Option<&str>]) -> InMemoryUserStore {
    let users = names
        .iter()
        .enumerate()
        .map(|(i, name)| UserRecord::new(format!("u{}", i + 1), *name))
        .collect();
    InMemoryUserStore::with_users(users)
}

/// Seeder over the default variants with a fixed RNG seed
pub fn seeded_seeder(seed: u64, mode: RankingMode) -> Seeder<StdRng> {
    let generator = SeedGenerator::new(
        default_variants(),
        &SeedSettings::default(),
        StdRng::seed_from_u64(seed),
    );
    Seeder::new(generator, mode, false)
}

/// Seeder over the default variants seeded from OS entropy
pub fn entropy_seeder(mode: RankingMode) -> Seeder<StdRng> {
    let settings = SeedSettings {
        ranking_mode: mode,
        ..SeedSettings::default()
    };
    Seeder::new(
        SeedGenerator::from_settings(default_variants(), &settings),
        mode,
        false,
    )
}

/// Base rating of a default variant
pub fn base_of(name: &str) -> Option<RatingTriple> {
    default_variants()
        .into_iter()
        .find(|variant: &VariantBase| variant.name == name)
        .map(|variant| variant.base)
}

/// Assert that a generated triple lies within the default noise widths of its base
pub fn assert_within_bounds(variant: &str, triple: &RatingTriple) {
    let base = base_of(variant).unwrap_or_else(|| panic!("unknown variant {}", variant));
    assert!(
        (triple.rating - base.rating).abs() <= 100.0,
        "{} rating {} too far from {}",
        variant,
        triple.rating,
        base.rating
    );
    assert!(
        (triple.rd - base.rd).abs() <= 50.0,
        "{} rd {} too far from {}",
        variant,
        triple.rd,
        base.rd
    );
    assert!(
        (triple.vol - base.vol).abs() <= 0.01 + 1e-12,
        "{} vol {} too far from {}",
        variant,
        triple.vol,
        base.vol
    );
}
