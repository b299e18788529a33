//! The configuration structs used to build the AppConfig, and their impls.
use std::{path::PathBuf, time::Duration};

use secrecy::SecretString;
use serde::Deserialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous},
    ConnectOptions,
};
use strum_macros::AsRefStr;

use crate::config::ConfigError;

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub service_config: ServiceConfig,
    pub net_config: NetConfig,
    pub db_config: DbConfig,
    pub rate_limit_config: RateLimitConfig,
    pub admin_config: AdminConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServiceConfig {
    /// Shown in the health check banner.
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DbConfig {
    /// Path to the SQLite database file, created if missing.
    pub path: PathBuf,
    pub max_connections: u32,
    pub acquire_timeout_millis: u64,
    pub busy_timeout_millis: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RateLimitConfig {
    /// Max requests per source within the window.
    pub max_requests: u32,
    pub window_secs: u64,
    /// How often expired sources are dropped from memory.
    pub sweep_interval_secs: u64,
}

/// The single administrator allowed to read the subscriber list.
/// Without a `password_hash` the admin routes reject every request.
#[derive(Deserialize, Clone, Debug)]
pub struct AdminConfig {
    pub username: String,
    /// argon2id hash in PHC string format
    pub password_hash: Option<SecretString>,
}

// ###################################
// ->   IMPLs
// ###################################
impl DbConfig {
    pub fn connection_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_millis(self.busy_timeout_millis))
            .log_statements(tracing::log::LevelFilter::Trace)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_millis)
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

// ###################################
// ->   TRY FROMs
// ###################################
impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}
