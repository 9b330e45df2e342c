//! User document storage
//!
//! The seeder only needs two operations from a store: an unfiltered scan of
//! user documents and a field-level write of the `ranking` attribute.

pub mod memory;
pub mod mongo;

use crate::error::Result;
use crate::types::{Ranking, RankingMode, UserId, UserRecord};
use async_trait::async_trait;

pub use memory::InMemoryUserStore;
pub use mongo::{ranking_update, MongoUserStore};

/// Trait for reading users and writing their rankings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch every user document
    async fn load_users(&self) -> Result<Vec<UserRecord>>;

    /// Persist a ranking onto one user
    async fn apply_ratings(
        &self,
        user_id: &UserId,
        ranking: &Ranking,
        mode: RankingMode,
    ) -> Result<()>;
}
