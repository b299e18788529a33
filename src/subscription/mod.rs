//! The subscription service: validates submitted emails, records them through a
//! `SubscriberStore` and lists the active subscribers.
//!
//! The store is injected so the service can run against SQLite in production and
//! against test doubles in tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::web::types::{DataParsingError, ValidEmail};

// ###################################
// ->   STORE
// ###################################
/// Owner of all persisted subscribers.
///
/// `insert_if_absent` must be a single atomic conditional write so that concurrent
/// inserts of the same email produce exactly one `Created`.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn insert_if_absent(
        &self,
        email: &ValidEmail,
        subscribed_at: DateTime<Utc>,
    ) -> StoreResult<SubscribeOutcome>;

    /// Active subscribers, most recent first.
    async fn list_active(&self) -> StoreResult<Vec<SubscriberListing>>;

    /// Releases the underlying resources.
    async fn close(&self);
}

pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ###################################
// ->   STRUCTS
// ###################################
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    AlreadyExists,
}

impl SubscribeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubscribeOutcome::Created => "Thank you for subscribing to our newsletter!",
            SubscribeOutcome::AlreadyExists => "You are already subscribed to our newsletter!",
        }
    }
}

/// A row of the admin subscriber listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SubscriberListing {
    pub email: String,
    pub subscription_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriberStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        Self { store }
    }

    /// Validates `email` and records it if it isn't stored yet.
    /// An already subscribed email is a successful `AlreadyExists`, not an error.
    #[tracing::instrument(name = "subscribe", skip(self))]
    pub async fn subscribe(&self, email: Option<&str>) -> Result<SubscribeOutcome, SubscribeError> {
        let email = match email {
            Some(email) if !email.is_empty() => email,
            _ => return Err(SubscribeError::MissingEmail),
        };
        let email = ValidEmail::parse(email)?;

        let outcome = self.store.insert_if_absent(&email, Utc::now()).await?;
        match outcome {
            SubscribeOutcome::Created => info!("New subscriber: {}", email.as_ref()),
            SubscribeOutcome::AlreadyExists => info!("Already subscribed: {}", email.as_ref()),
        }

        Ok(outcome)
    }

    #[tracing::instrument(name = "list_active_subscribers", skip(self))]
    pub async fn list_active_subscribers(&self) -> StoreResult<Vec<SubscriberListing>> {
        self.store.list_active().await
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("missing email")]
    MissingEmail,
    #[error("invalid format: {0}")]
    InvalidFormat(#[from] DataParsingError),
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
