//! Spawns the whole application on a random port, backed by a throwaway SQLite file.

use std::{net::SocketAddr, path::PathBuf, sync::Arc, sync::OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newsletter::{
    config::{AppConfig, Environment},
    database::DbManager,
    subscription::{
        StoreError, StoreResult, SubscribeOutcome, SubscriberListing, SubscriberStore,
    },
    web::{auth::password, build_router, types::ValidEmail},
    App,
};
use secrecy::SecretString;
use serde_json::Value;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "a-long-and-boring-test-password";

/// Hashing with the production argon2 parameters is slow, do it once per test binary.
fn admin_password_hash() -> Result<SecretString> {
    static HASH: OnceLock<String> = OnceLock::new();
    if let Some(hash) = HASH.get() {
        return Ok(SecretString::from(hash.as_str()));
    }
    let hash = password::hash_new_to_string(SecretString::from(ADMIN_PASSWORD))?;
    Ok(SecretString::from(HASH.get_or_init(|| hash).as_str()))
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub http_client: reqwest::Client,
    pub dm: DbManager,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.db_path.display()));
        }
    }
}

/// A store whose every operation fails, used to trigger the 500 responses.
pub struct FailingStore;

#[async_trait]
impl SubscriberStore for FailingStore {
    async fn insert_if_absent(
        &self,
        _email: &ValidEmail,
        _subscribed_at: DateTime<Utc>,
    ) -> StoreResult<SubscribeOutcome> {
        Err(StoreError::Unavailable("disk I/O error".into()))
    }

    async fn list_active(&self) -> StoreResult<Vec<SubscriberListing>> {
        Err(StoreError::Unavailable("disk I/O error".into()))
    }

    async fn close(&self) {}
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(|_| {}, None, true).await
}

pub async fn spawn_app_with_failing_store() -> Result<TestApp> {
    spawn_app_with(|_| {}, Some(Arc::new(FailingStore)), true).await
}

pub async fn spawn_app_with_rate_limit(max_requests: u32) -> Result<TestApp> {
    spawn_app_with(
        |config| config.rate_limit_config.max_requests = max_requests,
        None,
        true,
    )
    .await
}

/// Serves the router without `ConnectInfo`, the peer address is unknown to the rate limiter.
pub async fn spawn_app_without_connect_info(max_requests: u32) -> Result<TestApp> {
    spawn_app_with(
        |config| config.rate_limit_config.max_requests = max_requests,
        None,
        false,
    )
    .await
}

/// A helper function that spawns the app on a separate task, `store` replaces the SQLite store.
/// Binding port 0 lets the OS pick an available port.
async fn spawn_app_with(
    configure: impl FnOnce(&mut AppConfig),
    store: Option<Arc<dyn SubscriberStore>>,
    with_connect_info: bool,
) -> Result<TestApp> {
    let mut config = AppConfig::load_from(
        concat!(env!("CARGO_MANIFEST_DIR"), "/config"),
        Environment::Local,
    )?;
    let db_path = std::env::temp_dir().join(format!("newsletter-test-{}.db", Uuid::new_v4()));
    config.db_config.path = db_path.clone();
    config.net_config.host = [127, 0, 0, 1];
    config.net_config.app_port = 0;
    config.admin_config.username = ADMIN_USERNAME.to_string();
    config.admin_config.password_hash = Some(admin_password_hash()?);
    configure(&mut config);

    let dm = DbManager::init(&config.db_config).await?;
    let store = store.unwrap_or_else(|| Arc::new(dm.clone()) as Arc<dyn SubscriberStore>);

    let app = App::build_with_store(config, store).await?;
    let addr = app.listener.local_addr()?;
    if with_connect_info {
        tokio::spawn(newsletter::serve(app));
    } else {
        let App {
            app_state,
            listener,
        } = app;
        tokio::spawn(async move { axum::serve(listener, build_router(app_state)).await });
    }

    Ok(TestApp {
        addr,
        http_client: reqwest::Client::new(),
        dm,
        db_path,
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn post_subscriptions(&self, body: &Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(self.url("/api/newsletter/subscribe"))
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    pub async fn post_subscriptions_raw(
        &self,
        body: &'static str,
        content_type: &str,
    ) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(self.url("/api/newsletter/subscribe"))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        Ok(res)
    }

    pub async fn get_health(&self) -> Result<reqwest::Response> {
        let res = self.http_client.get(self.url("/api/health")).send().await?;
        Ok(res)
    }

    pub async fn get_admin_subscribers(
        &self,
        credentials: Option<(&str, &str)>,
    ) -> Result<reqwest::Response> {
        let mut req = self.http_client.get(self.url("/api/admin/subscribers"));
        if let Some((username, password)) = credentials {
            req = req.basic_auth(username, Some(password));
        }
        Ok(req.send().await?)
    }

    pub async fn count_subscribers(&self, email: &str) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers WHERE email = ?")
            .bind(email)
            .fetch_one(self.dm.db())
            .await?;
        Ok(count)
    }
}
