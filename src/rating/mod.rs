//! Synthetic rating generation
//!
//! Variant selection, uniform perturbation of base ratings, and the
//! `SeedGenerator` that ties them to an injected random source.

pub mod generator;
pub mod perturb;
pub mod selection;

// Re-export commonly used types
pub use generator::SeedGenerator;
pub use perturb::{perturb, NoiseWidths, RatingBounds};
pub use selection::{select_variants, subset_size, DEFAULT_MIN_VARIANTS};
