//! Seeding run orchestration
//!
//! A run loads every user, generates a ranking for each user that has a
//! username, and writes it back. Users are processed strictly one after
//! another; the first failure aborts the rest of the run.

use crate::config::AppConfig;
use crate::error::Result;
use crate::rating::SeedGenerator;
use crate::store::{MongoUserStore, UserStore};
use crate::types::{Ranking, RankingMode};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Ranking generated for a user during a dry run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRanking {
    pub user: String,
    pub ranking: Ranking,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub users_found: usize,
    pub users_seeded: usize,
    pub users_skipped: usize,
    pub ratings_written: usize,
    pub dry_run: bool,
    /// Only filled during dry runs
    pub planned: Vec<PlannedRanking>,
}

impl SeedReport {
    fn start(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            users_found: 0,
            users_seeded: 0,
            users_skipped: 0,
            ratings_written: 0,
            dry_run,
            planned: Vec::new(),
        }
    }
}

/// Drives a seeding run against a store
#[derive(Debug)]
pub struct Seeder<R: Rng> {
    generator: SeedGenerator<R>,
    mode: RankingMode,
    dry_run: bool,
}

impl Seeder<StdRng> {
    pub fn from_config(config: &AppConfig) -> Self {
        let generator = SeedGenerator::from_settings(config.variants.clone(), &config.seeding);
        Self::new(
            generator,
            config.seeding.ranking_mode,
            config.seeding.dry_run,
        )
    }
}

impl<R: Rng> Seeder<R> {
    pub fn new(generator: SeedGenerator<R>, mode: RankingMode, dry_run: bool) -> Self {
        Self {
            generator,
            mode,
            dry_run,
        }
    }

    /// Seed every user in `store`
    pub async fn run<S>(&mut self, store: &S) -> Result<SeedReport>
    where
        S: UserStore + ?Sized,
    {
        let mut report = SeedReport::start(self.dry_run);
        debug!(run_id = %report.run_id, mode = %self.mode, "Starting seeding run");

        let users = store.load_users().await?;
        report.users_found = users.len();
        info!("Found {} users", users.len());

        for user in &users {
            let Some(username) = user.seedable_name() else {
                debug!("Skipping user {} without username", user.id);
                report.users_skipped += 1;
                continue;
            };

            info!("Adding ratings for user: {}", username);
            let ranking = self.generator.generate_ranking();

            if self.dry_run {
                report.planned.push(PlannedRanking {
                    user: username.to_string(),
                    ranking,
                });
                continue;
            }

            if let Err(e) = store.apply_ratings(&user.id, &ranking, self.mode).await {
                warn!(
                    "Seeding aborted after {} of {} users",
                    report.users_seeded, report.users_found
                );
                return Err(e);
            }

            info!("  Added ratings for {} variants", ranking.len());
            report.users_seeded += 1;
            report.ratings_written += ranking.len();
        }

        report.finished_at = Some(Utc::now());
        Ok(report)
    }
}

/// Connect to MongoDB, run the seeder, and always shut the client down
/// once a connection was made. The outcome is logged before the shutdown.
pub async fn run_against_mongo(config: &AppConfig) -> Result<SeedReport> {
    let store = match MongoUserStore::connect(&config.store, &config.service.name).await {
        Ok(store) => store,
        Err(e) => {
            error!("Error adding test ratings: {:#}", e);
            return Err(e);
        }
    };

    let mut seeder = Seeder::from_config(config);
    let outcome = seeder.run(&store).await;

    match &outcome {
        Ok(report) => {
            info!(
                "Run {} finished: {} users found, {} seeded, {} skipped, {} ratings written",
                report.run_id,
                report.users_found,
                report.users_seeded,
                report.users_skipped,
                report.ratings_written
            );
            if report.dry_run {
                info!("Dry run completed - no ratings were written");
            } else {
                info!("Test ratings added successfully!");
            }
        }
        Err(e) => error!("Error adding test ratings: {:#}", e),
    }

    store.shutdown().await;
    outcome
}
