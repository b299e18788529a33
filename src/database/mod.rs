use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::{
    config::DbConfig,
    subscription::{StoreResult, SubscribeOutcome, SubscriberListing, SubscriberStore},
    web::types::ValidEmail,
};

/// Owns the SQLite pool. Cloning is cheap, clones share the same pool.
#[derive(Clone, Debug)]
pub struct DbManager {
    db: SqlitePool,
}

impl DbManager {
    /// Opens (or creates) the database file and runs the embedded migrations.
    pub async fn init(db_config: &DbConfig) -> Result<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");

        let db_pool = SqlitePoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(db_config.acquire_timeout())
            .connect_with(db_config.connection_options())
            .await
            .map_err(|er| Error::FailToCreatePool(er.to_string()))?;

        sqlx::migrate!("./migrations").run(&db_pool).await?;
        info!("{:<20} - Subscribers table ready", "init_db");

        Ok(Self { db: db_pool })
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl SubscriberStore for DbManager {
    /// `ON CONFLICT DO NOTHING` turns a duplicate email into a no-op in the same statement,
    /// the outcome is read from the number of affected rows.
    #[tracing::instrument(name = "insert_subscriber_sqlite", skip(self, email), fields(email = email.as_ref()))]
    async fn insert_if_absent(
        &self,
        email: &ValidEmail,
        subscribed_at: DateTime<Utc>,
    ) -> StoreResult<SubscribeOutcome> {
        let query_result = sqlx::query(
            r#"
            INSERT INTO subscribers (email, subscription_date, is_active)
            VALUES (?, ?, 1)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(email.as_ref())
        .bind(subscribed_at)
        .execute(&self.db)
        .await?;

        let outcome = if query_result.rows_affected() == 0 {
            SubscribeOutcome::AlreadyExists
        } else {
            SubscribeOutcome::Created
        };

        Ok(outcome)
    }

    #[tracing::instrument(name = "list_active_subscribers_sqlite", skip(self))]
    async fn list_active(&self) -> StoreResult<Vec<SubscriberListing>> {
        let subscribers = sqlx::query_as::<_, SubscriberListing>(
            r#"
            SELECT email, subscription_date FROM subscribers
            WHERE is_active = 1
            ORDER BY subscription_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(subscribers)
    }

    async fn close(&self) {
        info!("{:<20} - Closing the DB pool", "close_db");
        self.db.close().await;
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create db pool: {0}")]
    FailToCreatePool(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
}
