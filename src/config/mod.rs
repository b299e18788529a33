//! Builds an `AppConfig` from layered sources, later sources override earlier ones:
//! `config/base.toml` -> `config/<environment>.toml` -> `APP_*` environment variables.
//!
//! Nested keys in environment variables are separated by `__`,
//! e.g. `APP_NET_CONFIG__APP_PORT=9000`.

mod error;
mod types;

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

pub use error::{ConfigError, ConfigResult};
pub use types::{
    AdminConfig, AppConfig, DbConfig, Environment, NetConfig, RateLimitConfig, ServiceConfig,
};

pub const ENV_PREFIX: &str = "APP_";
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

impl AppConfig {
    /// Loads the configuration from the `config` directory in the current working directory.
    /// The environment is selected with `APP_ENVIRONMENT` and defaults to `local`.
    pub fn load() -> ConfigResult<Self> {
        let config_dir = std::env::current_dir()?.join("config");
        let environment: Environment = std::env::var(ENVIRONMENT_VAR)
            .unwrap_or_else(|_| "local".into())
            .try_into()?;

        Self::load_from(config_dir, environment)
    }

    pub fn load_from(config_dir: impl AsRef<Path>, environment: Environment) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        info!(
            "{:<20} - Loading the {} configuration from {}",
            "load_config",
            environment.as_ref(),
            config_dir.display()
        );

        let base_file = config_dir.join("base.toml");
        if !base_file.is_file() {
            return Err(ConfigError::MissingFile(base_file));
        }
        let environment_file =
            config_dir.join(format!("{}.toml", environment.as_ref().to_lowercase()));

        let config = Figment::new()
            .merge(Toml::file(base_file))
            .merge(Toml::file(environment_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}
