//! MongoDB user store

use crate::config::StoreSettings;
use crate::error::{Result, SeedError};
use crate::store::UserStore;
use crate::types::{Ranking, RankingMode, UserId, UserRecord};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Field on user documents holding per-variant ratings
pub const RANKING_FIELD: &str = "ranking";

/// Connection-level failures are reported as `ConnectionFailed`, anything
/// else as the error produced by `otherwise`.
fn classify(err: mongodb::error::Error, otherwise: impl FnOnce(String) -> SeedError) -> SeedError {
    match *err.kind {
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => SeedError::ConnectionFailed {
            message: err.to_string(),
        },
        _ => otherwise(err.to_string()),
    }
}

fn connection_failed(err: mongodb::error::Error) -> SeedError {
    classify(err, |message| SeedError::ConnectionFailed { message })
}

fn encode<T: Serialize>(value: &T) -> Result<Bson> {
    bson::to_bson(value).map_err(|e| {
        SeedError::SerializationError {
            message: e.to_string(),
        }
        .into()
    })
}

/// Build the `$set` update that writes `ranking` in the given mode.
///
/// Returns `None` when there is nothing to write.
pub fn ranking_update(ranking: &Ranking, mode: RankingMode) -> Result<Option<Document>> {
    let mut set = Document::new();
    match mode {
        RankingMode::Overwrite => {
            set.insert(RANKING_FIELD, encode(ranking)?);
        }
        RankingMode::Merge => {
            if ranking.is_empty() {
                return Ok(None);
            }
            for (variant, triple) in ranking {
                set.insert(format!("{}.{}", RANKING_FIELD, variant), encode(triple)?);
            }
        }
    }

    Ok(Some(doc! { "$set": set }))
}

/// Convert a raw document into a `UserRecord`; documents without `_id` are skipped
fn user_from_document(document: &Document) -> Option<UserRecord> {
    let id = document.get("_id")?.clone();
    let username = document.get_str("username").ok().map(str::to_string);

    let ranking = match document.get_document(RANKING_FIELD) {
        Ok(stored) => bson::from_document::<Ranking>(stored.clone()).unwrap_or_else(|e| {
            debug!("Ignoring unreadable ranking on user {}: {}", id, e);
            Ranking::new()
        }),
        Err(_) => Ranking::new(),
    };

    Some(UserRecord {
        id,
        username,
        ranking,
    })
}

/// User store backed by a MongoDB collection
pub struct MongoUserStore {
    client: Client,
    users: Collection<Document>,
}

impl MongoUserStore {
    /// Connect and verify the server answers a ping.
    ///
    /// Client construction is lazy, so the ping is what surfaces an
    /// unreachable server as `ConnectionFailed`.
    pub async fn connect(settings: &StoreSettings, app_name: &str) -> Result<Self> {
        let timeout = settings.connect_timeout();

        let mut options = ClientOptions::parse(&settings.uri)
            .await
            .map_err(connection_failed)?;
        options.app_name = Some(app_name.to_string());
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(connection_failed)?;
        let database = client.database(&settings.database);
        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(connection_failed)?;

        info!("Connected to MongoDB");
        debug!(
            "Using database {} collection {}",
            settings.database, settings.users_collection
        );

        Ok(Self {
            users: database.collection::<Document>(&settings.users_collection),
            client,
        })
    }

    /// Close all pooled connections
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("Disconnected from MongoDB");
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn load_users(&self) -> Result<Vec<UserRecord>> {
        let cursor = self
            .users
            .find(doc! {}, None)
            .await
            .map_err(connection_failed)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(connection_failed)?;

        let users = documents
            .iter()
            .filter_map(|document| {
                let user = user_from_document(document);
                if user.is_none() {
                    warn!("Skipping user document without _id");
                }
                user
            })
            .collect();

        Ok(users)
    }

    async fn apply_ratings(
        &self,
        user_id: &UserId,
        ranking: &Ranking,
        mode: RankingMode,
    ) -> Result<()> {
        let Some(update) = ranking_update(ranking, mode)? else {
            return Ok(());
        };

        let result = self
            .users
            .update_one(doc! { "_id": user_id.clone() }, update, None)
            .await
            .map_err(|e| {
                classify(e, |message| SeedError::WriteFailed {
                    user_id: user_id.to_string(),
                    message,
                })
            })?;

        if result.matched_count == 0 {
            return Err(SeedError::WriteFailed {
                user_id: user_id.to_string(),
                message: "document no longer exists".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
