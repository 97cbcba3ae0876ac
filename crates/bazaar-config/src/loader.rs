//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator};
use bazaar_core::BazaarError;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use tracing::{debug, info};

/// Layered configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the given directory.
    ///
    /// Sources are applied in order, later ones overriding earlier ones:
    /// 1. `{dir}/default.toml` - Default values
    /// 2. `{dir}/{environment}.toml` - Environment-specific overrides
    /// 3. `{dir}/local.toml` - Local overrides (not committed)
    /// 4. Environment variables with `BAZAAR__` prefix, `__` as separator
    ///    (e.g. `BAZAAR__CACHE__DEFAULT_TTL_SECS=60`)
    pub fn load(config_dir: impl AsRef<Path>) -> Result<AppConfig, BazaarError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment = std::env::var("BAZAAR_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        Self::load_for_environment(config_dir.as_ref(), &environment)
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<AppConfig, BazaarError> {
        Self::load("./config")
    }

    /// Loads configuration for an explicit environment name.
    pub fn load_for_environment(config_dir: &Path, environment: &str) -> Result<AppConfig, BazaarError> {
        let mut builder = Config::builder();

        for name in ["default", environment, "local"] {
            let path = config_dir.join(format!("{}.toml", name));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("BAZAAR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize::<AppConfig>)
            .map_err(config_error_to_bazaar_error)?;

        ConfigValidator::validate(&app_config).map_err(|errors| {
            let joined = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
            BazaarError::Configuration(joined)
        })?;

        Ok(app_config)
    }
}

fn config_error_to_bazaar_error(err: ConfigError) -> BazaarError {
    BazaarError::Configuration(err.to_string())
}
