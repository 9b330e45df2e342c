//! Rating Seeder - synthetic variant ratings for development databases
//!
//! This crate loads user documents from MongoDB, picks a random subset of
//! game variants for each user, and writes Glicko-2 style rating triples
//! perturbed around per-variant base values onto the `ranking` attribute.

pub mod config;
pub mod error;
pub mod rating;
pub mod seeder;
pub mod store;
pub mod types;

// Re-export commonly used types and traits
pub use error::{Result, SeedError};
pub use types::*;

// Re-export key components
pub use rating::SeedGenerator;
pub use seeder::{SeedReport, Seeder};
pub use store::{InMemoryUserStore, MongoUserStore, UserStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
