use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    config::{AdminConfig, AppConfig},
    database::DbManager,
    subscription::{SubscriberStore, SubscriptionService},
    web::rate_limit::RateLimiter,
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Opens the SQLite database described by the config and binds the listener.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let dm = DbManager::init(&config.db_config).await?;
        info!(
            "{:<20} - {}",
            "Database ready:",
            config.db_config.path.display()
        );

        Self::build_with_store(config, Arc::new(dm)).await
    }

    /// Same as `build_from_config` but with an already initialized store.
    pub async fn build_with_store(
        config: AppConfig,
        store: Arc<dyn SubscriberStore>,
    ) -> Result<Self> {
        if config.admin_config.password_hash.is_none() {
            warn!("No admin password hash configured, the admin routes will reject every request");
        }

        let app_state = AppState::new(
            SubscriptionService::new(store),
            Arc::new(RateLimiter::new(&config.rate_limit_config)),
            config.admin_config,
            config.service_config.service_name,
        );

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub subscription_svc: SubscriptionService,
    pub rate_limiter: Arc<RateLimiter>,
    pub admin_config: AdminConfig,
    pub service_name: String,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(
        subscription_svc: SubscriptionService,
        rate_limiter: Arc<RateLimiter>,
        admin_config: AdminConfig,
        service_name: String,
    ) -> Self {
        AppState(Arc::new(InternalState {
            subscription_svc,
            rate_limiter,
            admin_config,
            service_name,
        }))
    }
}
