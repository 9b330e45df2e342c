//! In-memory user store
//!
//! Backs tests and local experiments. Failures can be injected to exercise
//! the abort paths of a seeding run.

use crate::error::{Result, SeedError};
use crate::store::UserStore;
use crate::types::{Ranking, RankingMode, UserId, UserRecord};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// A write recorded by the store
#[derive(Debug, Clone, PartialEq)]
pub struct WriteCall {
    pub user_id: UserId,
    pub ranking: Ranking,
    pub mode: RankingMode,
}

/// In-memory user store implementation
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
    write_calls: RwLock<Vec<WriteCall>>,
    unreachable: AtomicBool,
    fail_after_writes: RwLock<Option<usize>>,
}

fn lock_error(what: &str) -> anyhow::Error {
    anyhow::anyhow!("Failed to acquire users {} lock", what)
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with users
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: RwLock::new(users),
            ..Self::default()
        }
    }

    /// Snapshot of all users
    pub fn users(&self) -> Vec<UserRecord> {
        self.users
            .read()
            .map(|users| users.clone())
            .unwrap_or_default()
    }

    /// Look up one user by id
    pub fn get_user(&self, user_id: &UserId) -> Option<UserRecord> {
        self.users
            .read()
            .ok()
            .and_then(|users| users.iter().find(|user| &user.id == user_id).cloned())
    }

    /// Remove a user, simulating a document deleted mid-run
    pub fn remove_user(&self, user_id: &UserId) -> bool {
        match self.users.write() {
            Ok(mut users) => {
                let before = users.len();
                users.retain(|user| &user.id != user_id);
                users.len() != before
            }
            Err(_) => false,
        }
    }

    /// All writes made so far (for testing)
    pub fn write_calls(&self) -> Vec<WriteCall> {
        self.write_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Make every subsequent operation fail with a connection error
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Let `count` writes succeed, then fail every following write
    pub fn fail_after_writes(&self, count: usize) {
        if let Ok(mut limit) = self.fail_after_writes.write() {
            *limit = Some(count);
        }
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(SeedError::ConnectionFailed {
                message: "in-memory store marked unreachable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn load_users(&self) -> Result<Vec<UserRecord>> {
        self.check_reachable()?;
        let users = self.users.read().map_err(|_| lock_error("read"))?;
        Ok(users.clone())
    }

    async fn apply_ratings(
        &self,
        user_id: &UserId,
        ranking: &Ranking,
        mode: RankingMode,
    ) -> Result<()> {
        self.check_reachable()?;

        let limit = *self
            .fail_after_writes
            .read()
            .map_err(|_| lock_error("limit"))?;
        let written = self.write_calls.read().map_err(|_| lock_error("calls"))?.len();
        if limit.is_some_and(|limit| written >= limit) {
            return Err(SeedError::WriteFailed {
                user_id: user_id.to_string(),
                message: "injected write failure".to_string(),
            }
            .into());
        }

        let mut users = self.users.write().map_err(|_| lock_error("write"))?;
        let user = users
            .iter_mut()
            .find(|user| &user.id == user_id)
            .ok_or_else(|| SeedError::WriteFailed {
                user_id: user_id.to_string(),
                message: "document no longer exists".to_string(),
            })?;

        match mode {
            RankingMode::Overwrite => user.ranking = ranking.clone(),
            RankingMode::Merge => user
                .ranking
                .extend(ranking.iter().map(|(name, triple)| (name.clone(), *triple))),
        }
        drop(users);

        if let Ok(mut calls) = self.write_calls.write() {
            calls.push(WriteCall {
                user_id: user_id.clone(),
                ranking: ranking.clone(),
                mode,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RatingTriple;

    fn ranking(entries: &[(&str, f64)]) -> Ranking {
        entries
            .iter()
            .map(|(name, rating)| {
                (
                    name.to_string(),
                    RatingTriple::new(*rating, 300.0, 0.06),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_overwrite_replaces_ranking() {
        let store = InMemoryUserStore::with_users(vec![UserRecord::new("u1", Some("alice"))]);
        let id = UserId::from("u1");

        store
            .apply_ratings(
                &id,
                &ranking(&[("baduk", 1500.0), ("tetris", 1400.0)]),
                RankingMode::Overwrite,
            )
            .await
            .unwrap();
        store
            .apply_ratings(
                &id,
                &ranking(&[("capture", 1600.0)]),
                RankingMode::Overwrite,
            )
            .await
            .unwrap();

        let user = store.get_user(&id).unwrap();
        assert_eq!(user.ranking.len(), 1);
        assert!(user.ranking.contains_key("capture"));
        assert_eq!(store.write_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_merge_keeps_other_variants() {
        let store = InMemoryUserStore::with_users(vec![UserRecord::new("u1", Some("alice"))]);
        let id = UserId::from("u1");

        store
            .apply_ratings(
                &id,
                &ranking(&[("baduk", 1500.0), ("tetris", 1400.0)]),
                RankingMode::Merge,
            )
            .await
            .unwrap();
        store
            .apply_ratings(
                &id,
                &ranking(&[("baduk", 1510.0)]),
                RankingMode::Merge,
            )
            .await
            .unwrap();

        let user = store.get_user(&id).unwrap();
        assert_eq!(user.ranking.len(), 2);
        assert_eq!(user.ranking["baduk"].rating, 1510.0);
        assert_eq!(user.ranking["tetris"].rating, 1400.0);
    }

    #[tokio::test]
    async fn test_write_to_missing_user_fails() {
        let store = InMemoryUserStore::new();
        let err = store
            .apply_ratings(
                &UserId::from("ghost"),
                &Ranking::new(),
                RankingMode::Overwrite,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SeedError>(),
            Some(SeedError::WriteFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_store() {
        let store = InMemoryUserStore::with_users(vec![UserRecord::new("u1", Some("alice"))]);
        store.set_unreachable(true);

        let err = store.load_users().await.unwrap_err();
        assert!(err
            .downcast_ref::<SeedError>()
            .is_some_and(SeedError::is_connection));

        store.set_unreachable(false);
        assert_eq!(store.load_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let store = InMemoryUserStore::with_users(vec![
            UserRecord::new("u1", Some("alice")),
            UserRecord::new("u2", Some("bob")),
        ]);
        store.fail_after_writes(1);

        let r = ranking(&[("baduk", 1500.0)]);
        assert!(store
            .apply_ratings(&UserId::from("u1"), &r, RankingMode::Overwrite)
            .await
            .is_ok());
        assert!(store
            .apply_ratings(&UserId::from("u2"), &r, RankingMode::Overwrite)
            .await
            .is_err());
        assert!(store.get_user(&UserId::from("u2")).unwrap().ranking.is_empty());
    }

    #[test]
    fn test_remove_user() {
        let store = InMemoryUserStore::with_users(vec![UserRecord::new("u1", Some("alice"))]);
        assert!(store.remove_user(&UserId::from("u1")));
        assert!(!store.remove_user(&UserId::from("u1")));
        assert!(store.users().is_empty());
    }
}
