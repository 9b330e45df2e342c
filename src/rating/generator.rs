//! Synthetic ranking generation
//!
//! `SeedGenerator` owns its random source so runs can be made reproducible by
//! handing it a seeded RNG.

use crate::config::SeedSettings;
use crate::rating::perturb::{perturb, NoiseWidths, RatingBounds};
use crate::rating::selection::select_variants;
use crate::types::{Ranking, RatingTriple, VariantBase};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Generates one synthetic ranking per call
#[derive(Debug)]
pub struct SeedGenerator<R: Rng> {
    variants: Vec<VariantBase>,
    min_variants: usize,
    widths: NoiseWidths,
    bounds: Option<RatingBounds>,
    rng: R,
}

impl SeedGenerator<StdRng> {
    /// Build a generator from settings, seeded from `rng_seed` or OS entropy
    pub fn from_settings(variants: Vec<VariantBase>, settings: &SeedSettings) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => {
                debug!("Using fixed RNG seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };
        Self::new(variants, settings, rng)
    }
}

impl<R: Rng> SeedGenerator<R> {
    pub fn new(variants: Vec<VariantBase>, settings: &SeedSettings, rng: R) -> Self {
        Self {
            variants,
            min_variants: settings.min_variants,
            widths: settings.noise,
            bounds: settings.clamp_ratings.then(RatingBounds::default),
            rng,
        }
    }

    /// Configured variants
    pub fn variants(&self) -> &[VariantBase] {
        &self.variants
    }

    /// Choose the variants one user will be seeded with
    pub fn select_variants(&mut self) -> Vec<VariantBase> {
        select_variants(&self.variants, self.min_variants, &mut self.rng)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Perturb a base rating, clamping it when bounds are enabled
    pub fn perturb(&mut self, base: &RatingTriple) -> RatingTriple {
        let triple = perturb(base, &self.widths, &mut self.rng);
        match &self.bounds {
            Some(bounds) => bounds.clamp(triple),
            None => triple,
        }
    }

    /// Produce a complete ranking for one user
    pub fn generate_ranking(&mut self) -> Ranking {
        self.select_variants()
            .into_iter()
            .map(|variant| {
                let triple = self.perturb(&variant.base);
                (variant.name, triple)
            })
            .collect()
    }
}
