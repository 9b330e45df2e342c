//! Uniform noise applied to base ratings, plus optional bounds

use crate::error::{Result, SeedError};
use crate::types::RatingTriple;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Half-width of the uniform noise added to each field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseWidths {
    pub rating: f64,
    pub rd: f64,
    pub vol: f64,
}

impl Default for NoiseWidths {
    fn default() -> Self {
        Self {
            rating: 100.0,
            rd: 50.0,
            vol: 0.01,
        }
    }
}

impl NoiseWidths {
    /// Validate that every width is a finite, non-negative number
    pub fn validate(&self) -> Result<()> {
        for (field, width) in [("rating", self.rating), ("rd", self.rd), ("vol", self.vol)] {
            // random_range needs the span 2 * width to be finite too
            if !width.is_finite() || width < 0.0 || !(2.0 * width).is_finite() {
                return Err(SeedError::ConfigurationError {
                    message: format!("Noise width for {} must be finite and >= 0", field),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Lower limits applied to perturbed ratings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingBounds {
    pub min_rating: f64,
    pub min_rd: f64,
    pub min_vol: f64,
}

impl Default for RatingBounds {
    fn default() -> Self {
        Self {
            min_rating: 0.0,
            min_rd: 1.0,
            min_vol: 0.0001,
        }
    }
}

impl RatingBounds {
    pub fn clamp(&self, triple: RatingTriple) -> RatingTriple {
        RatingTriple {
            rating: triple.rating.max(self.min_rating),
            rd: triple.rd.max(self.min_rd),
            vol: triple.vol.max(self.min_vol),
        }
    }
}

/// Uniform sample from `[-width, width]`
fn noise<R: Rng>(width: f64, rng: &mut R) -> f64 {
    if width == 0.0 {
        0.0
    } else {
        rng.random_range(-width..=width)
    }
}

/// Add independent uniform noise to each field of `base`
pub fn perturb<R: Rng>(base: &RatingTriple, widths: &NoiseWidths, rng: &mut R) -> RatingTriple {
    RatingTriple {
        rating: base.rating + noise(widths.rating, rng),
        rd: base.rd + noise(widths.rd, rng),
        vol: base.vol + noise(widths.vol, rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_widths() {
        let widths = NoiseWidths::default();
        assert_eq!(widths.rating, 100.0);
        assert_eq!(widths.rd, 50.0);
        assert_eq!(widths.vol, 0.01);
        assert!(widths.validate().is_ok());
    }

    #[test]
    fn test_width_validation() {
        let mut widths = NoiseWidths::default();
        widths.rd = -1.0;
        assert!(widths.validate().is_err());

        widths.rd = f64::NAN;
        assert!(widths.validate().is_err());

        widths.rd = 0.0;
        assert!(widths.validate().is_ok());
    }

    #[test]
    fn test_width_with_overflowing_span_is_rejected() {
        let widths = NoiseWidths {
            rating: f64::MAX,
            ..NoiseWidths::default()
        };
        let err = widths.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SeedError>(),
            Some(SeedError::ConfigurationError { .. })
        ));

        let widths = NoiseWidths {
            rating: 1e300,
            ..NoiseWidths::default()
        };
        assert!(widths.validate().is_ok());
    }

    #[test]
    fn test_zero_width_leaves_field_unchanged() {
        let mut rng = StdRng::seed_from_u64(3);
        let base = RatingTriple::new(1500.0, 350.0, 0.06);
        let widths = NoiseWidths {
            rating: 0.0,
            rd: 0.0,
            vol: 0.0,
        };
        assert_eq!(perturb(&base, &widths, &mut rng), base);
    }

    #[test]
    fn test_noise_is_centered() {
        let mut rng = StdRng::seed_from_u64(11);
        let base = RatingTriple::new(1500.0, 350.0, 0.06);
        let widths = NoiseWidths::default();
        let rounds = 10_000;

        let mean_rating = (0..rounds)
            .map(|_| perturb(&base, &widths, &mut rng).rating)
            .sum::<f64>()
            / rounds as f64;

        // Standard error of the mean is ~0.58 for width 100
        assert!((mean_rating - 1500.0).abs() < 5.0, "mean {}", mean_rating);
    }

    #[test]
    fn test_bounds_clamp() {
        let bounds = RatingBounds::default();
        let clamped = bounds.clamp(RatingTriple::new(-20.0, -3.0, -0.001));
        assert_eq!(clamped, RatingTriple::new(0.0, 1.0, 0.0001));

        let untouched = RatingTriple::new(1500.0, 350.0, 0.06);
        assert_eq!(bounds.clamp(untouched), untouched);
    }

    proptest! {
        #[test]
        fn prop_perturbation_stays_within_widths(
            seed in any::<u64>(),
            rating in 0.0f64..3000.0,
            rd in 0.0f64..500.0,
            vol in 0.0f64..0.2,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let base = RatingTriple::new(rating, rd, vol);
            let widths = NoiseWidths::default();
            let out = perturb(&base, &widths, &mut rng);

            prop_assert!((out.rating - base.rating).abs() <= widths.rating + 1e-9);
            prop_assert!((out.rd - base.rd).abs() <= widths.rd + 1e-9);
            prop_assert!((out.vol - base.vol).abs() <= widths.vol + 1e-12);
        }
    }
}
