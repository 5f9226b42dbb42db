use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Clone, Deserialize)]
pub struct SecurityConfig {
    /// Secret of the reserved super-user, compared verbatim.
    pub admin_password: String,
    /// Full-match pattern every newly set password must satisfy.
    pub password_pattern: String,
    pub cache: CacheConfig,
    pub store: StoreConfig,
    pub directory: DirectoryConfig,
}

// Hand-written so the admin password never reaches the logs.
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("admin_password", &"<redacted>")
            .field("password_pattern", &self.password_pattern)
            .field("cache", &self.cache)
            .field("store", &self.store)
            .field("directory", &self.directory)
            .finish()
    }
}

/// Time-to-live of the three identity caches, in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    pub authorization_ttl_secs: u64,
    pub user_ttl_secs: u64,
    pub role_ttl_secs: u64,
}

impl CacheConfig {
    #[must_use]
    pub const fn authorization_ttl(&self) -> Duration {
        Duration::from_secs(self.authorization_ttl_secs)
    }

    #[must_use]
    pub const fn user_ttl(&self) -> Duration {
        Duration::from_secs(self.user_ttl_secs)
    }

    #[must_use]
    pub const fn role_ttl(&self) -> Duration {
        Duration::from_secs(self.role_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Registry key of the storage backend.
    pub backend: String,
    /// JSON file used to seed the in-memory backend.
    pub seed_file: Option<String>,
}

#[derive(Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    pub enabled: bool,
    /// Accounts of the built-in static directory (account -> password).
    #[serde(default)]
    pub accounts: BTreeMap<String, String>,
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("enabled", &self.enabled)
            .field("accounts", &self.accounts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Settings {
    fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("logging.level", "info")?
            .set_default("security.password_pattern", ".{8,}")?
            .set_default("security.cache.authorization_ttl_secs", 300)?
            .set_default("security.cache.user_ttl_secs", 300)?
            .set_default("security.cache.role_ttl_secs", 300)?
            .set_default("security.store.backend", "memory")?
            .set_default("security.directory.enabled", false)?)
    }

    /// ## Summary
    /// Loads configuration from `config.toml` and `WARDEN__*` environment variables
    /// into a `Settings`. Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::builder()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // e.g. WARDEN__SECURITY__ADMIN_PASSWORD
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?
            .validated()?)
    }

    /// ## Summary
    /// Builds a `Settings` from an in-memory TOML document layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the document cannot be parsed or required keys are missing.
    pub fn from_toml(document: &str) -> Result<Self> {
        Ok(Self::builder()?
            .add_source(config::File::from_str(document, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?
            .validated()?)
    }

    /// ## Errors
    /// Returns `ValidationError` for a blank admin password and
    /// `InvalidConfiguration` for a blank store backend.
    fn validated(self) -> CoreResult<Self> {
        if self.security.admin_password.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "security.admin_password must not be blank".to_string(),
            ));
        }
        if self.security.store.backend.trim().is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "security.store.backend must name a store".to_string(),
            ));
        }
        Ok(self)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
