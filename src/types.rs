//! Common types used throughout the rating seeder

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};
use skillratings::glicko2::Glicko2Rating;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Identifier of a user document (the `_id` field, whatever BSON type it has)
pub type UserId = Bson;

/// Name of a game variant, used as a key of the `ranking` attribute
pub type VariantName = String;

/// Per-variant ratings stored on a user document
pub type Ranking = BTreeMap<VariantName, RatingTriple>;

/// Glicko-2 style rating parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingTriple {
    pub rating: f64,
    pub rd: f64,
    pub vol: f64,
}

impl RatingTriple {
    pub fn new(rating: f64, rd: f64, vol: f64) -> Self {
        Self { rating, rd, vol }
    }

    /// All three fields are finite numbers
    pub fn is_finite(&self) -> bool {
        self.rating.is_finite() && self.rd.is_finite() && self.vol.is_finite()
    }
}

impl Default for RatingTriple {
    fn default() -> Self {
        Glicko2Rating::new().into()
    }
}

impl From<Glicko2Rating> for RatingTriple {
    fn from(rating: Glicko2Rating) -> Self {
        Self {
            rating: rating.rating,
            rd: rating.deviation,
            vol: rating.volatility,
        }
    }
}

impl From<RatingTriple> for Glicko2Rating {
    fn from(triple: RatingTriple) -> Self {
        Self {
            rating: triple.rating,
            deviation: triple.rd,
            volatility: triple.vol,
        }
    }
}

/// A configured variant and the rating its seeded values are centered on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantBase {
    pub name: VariantName,
    #[serde(flatten)]
    pub base: RatingTriple,
}

impl VariantBase {
    pub fn new(name: impl Into<VariantName>, rating: f64, rd: f64, vol: f64) -> Self {
        Self {
            name: name.into(),
            base: RatingTriple::new(rating, rd, vol),
        }
    }
}

/// The variant set seeded when no other is configured
pub fn default_variants() -> Vec<VariantBase> {
    vec![
        VariantBase::new("baduk", 1500.0, 350.0, 0.06),
        VariantBase::new("phantom", 1450.0, 300.0, 0.05),
        VariantBase::new("capture", 1600.0, 250.0, 0.04),
        VariantBase::new("tetris", 1400.0, 400.0, 0.07),
        VariantBase::new("pyramid", 1550.0, 280.0, 0.05),
    ]
}

/// How a freshly generated ranking is written over the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Replace the whole `ranking` attribute
    #[default]
    Overwrite,
    /// Only set the selected variants, keep the others
    Merge,
}

impl std::fmt::Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingMode::Overwrite => write!(f, "overwrite"),
            RankingMode::Merge => write!(f, "merge"),
        }
    }
}

impl FromStr for RankingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(RankingMode::Overwrite),
            "merge" => Ok(RankingMode::Merge),
            other => Err(anyhow::anyhow!("Unknown ranking mode: {}", other)),
        }
    }
}

/// A user document as seen by the seeder
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: Option<String>,
    pub ranking: Ranking,
}

impl UserRecord {
    pub fn new(id: impl Into<UserId>, username: Option<&str>) -> Self {
        Self {
            id: id.into(),
            username: username.map(str::to_string),
            ranking: Ranking::new(),
        }
    }

    /// Users without a username are never seeded
    pub fn seedable_name(&self) -> Option<&str> {
        self.username.as_deref().filter(|name| !name.is_empty())
    }
}
