use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: Option<String>,
    pub store_key_file: PathBuf,
    pub store_prefix: String,
    pub openai_api_key: Option<String>,
    pub openai_endpoint: String,
    pub openai_model: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "8001")?,
            redis_url: var("REDIS_URL").ok(),
            store_key_file: try_load("STORE_KEY_FILE", "store-key.json")?,
            store_prefix: try_load("STORE_PREFIX", "atal")?,
            openai_api_key: var("OPENAI_API_KEY")
                .ok()
                .or_else(|| read_secret("OPENAI_API_KEY"))
                .filter(|key| !key.trim().is_empty()),
            openai_endpoint: try_load("OPENAI_BASE_URL", OPENAI_ENDPOINT)?,
            openai_model: try_load("OPENAI_MODEL", OPENAI_MODEL)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8001,
            redis_url: None,
            store_key_file: PathBuf::from("store-key.json"),
            store_prefix: "atal".to_string(),
            openai_api_key: None,
            openai_endpoint: OPENAI_ENDPOINT.to_string(),
            openai_model: OPENAI_MODEL.to_string(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
}
