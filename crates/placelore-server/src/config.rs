//! Process configuration, read from the environment (and `.env`, loaded by
//! `main` before this runs).

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use placelore_generate::client::GenerationConfig;
use placelore_storage::mongo::{DEFAULT_COLLECTION, DEFAULT_DATABASE, MongoConfig};

pub const DEFAULT_PORT: u16 = 3030;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MONGO_URL is not defined")]
    MissingMongoUrl,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mongo: MongoConfig,
    pub generation: GenerationConfig,
    /// Return generated text even when storing it failed.
    pub serve_unpersisted: bool,
}

impl Config {
    /// Load the configuration. Only the store URL is mandatory; generation
    /// settings are checked per request.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading each variable through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let url = var("MONGO_URL").ok_or(ConfigError::MissingMongoUrl)?;

        let mongo = MongoConfig {
            url,
            database: var("MONGO_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: var("MONGO_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        };

        Ok(Self {
            port: load_or("PORT", var("PORT"), DEFAULT_PORT),
            mongo,
            generation: GenerationConfig::from_lookup(&lookup),
            serve_unpersisted: load_or("SERVE_UNPERSISTED", var("SERVE_UNPERSISTED"), false),
        })
    }
}

fn load_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = raw else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        warn!("invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}
