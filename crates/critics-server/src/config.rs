//! Server configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then `CRITICS_*`
//! environment variables (`__` separates nested keys, e.g.
//! `CRITICS_STORE__BACKEND=sqlite`).

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "critics.toml";
const INSECURE_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: String,
    pub store: StoreSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub database_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    pub require_auth: bool,
    pub token_cache_ttl_secs: u64,
}

impl AuthSettings {
    /// The configured secret, or the insecure development default.
    pub fn jwt_secret(&self) -> String {
        match self.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => secret.to_string(),
            None => {
                warn!("CRITICS_AUTH__JWT_SECRET not set, using default (insecure for production)");
                INSECURE_JWT_SECRET.to_string()
            }
        }
    }

    pub fn token_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.token_cache_ttl_secs)
    }
}

impl Settings {
    /// Load settings. A missing file is fine; a malformed one is not.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file = config_file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        Config::builder()
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("store.backend", "memory")?
            .set_default("store.database_path", "data/critics.db")?
            .set_default("auth.require_auth", false)?
            .set_default("auth.token_cache_ttl_secs", 300)?
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix("CRITICS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", file.display()))?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
