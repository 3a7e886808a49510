//! # Credential Resolver
//!
//! Finds a live document store by trying each [`Strategy`] in order:
//!
//! 1. `ambient`: `REDIS_URL` from the environment
//! 2. `key-file`: a JSON key file at `STORE_KEY_FILE`
//!
//! The first strategy that connects and answers `PING` wins. When all of them
//! fail the resolver settles on [`StoreMode::Offline`] and the rest of the
//! service runs on the in-memory fallback.
use std::{
    fmt,
    fs::read_to_string,
    path::{Path, PathBuf},
    time::Duration,
};

use redis::{
    Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::Config;

#[derive(Debug, Clone)]
pub enum Strategy {
    Ambient(Option<String>),
    KeyFile(PathBuf),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Ambient(_) => "ambient",
            Strategy::KeyFile(_) => "key-file",
        }
    }
}

pub enum Attempt {
    Connected(ConnectionManager),
    Failed(String),
}

#[derive(Clone)]
pub enum StoreMode {
    Live {
        strategy: &'static str,
        connection: ConnectionManager,
    },
    Offline,
}

impl StoreMode {
    pub fn is_live(&self) -> bool {
        matches!(self, StoreMode::Live { .. })
    }
}

impl fmt::Debug for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Live { strategy, .. } => write!(f, "Live({strategy})"),
            StoreMode::Offline => write!(f, "Offline"),
        }
    }
}

/// Contents of the store key file.
#[derive(Deserialize, Debug, PartialEq)]
pub struct StoreKey {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: i64,
    #[serde(default)]
    pub tls: bool,
}

fn default_port() -> u16 {
    6379
}

impl StoreKey {
    pub fn to_url(&self) -> String {
        let scheme = if self.tls { "rediss" } else { "redis" };
        let auth = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("{user}:{pass}@"),
            (None, Some(pass)) => format!(":{pass}@"),
            (Some(user), None) => format!("{user}@"),
            (None, None) => String::new(),
        };

        format!(
            "{scheme}://{auth}{}:{}/{}",
            self.host, self.port, self.database
        )
    }
}

pub struct CredentialResolver {
    strategies: Vec<Strategy>,
    resolved: OnceCell<StoreMode>,
}

impl CredentialResolver {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self {
            strategies,
            resolved: OnceCell::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(vec![
            Strategy::Ambient(config.redis_url.clone()),
            Strategy::KeyFile(config.store_key_file.clone()),
        ])
    }

    /// Resolves once; later calls hand back the same mode.
    pub async fn resolve(&self) -> &StoreMode {
        self.resolved
            .get_or_init(|| async {
                for strategy in &self.strategies {
                    match attempt(strategy).await {
                        Attempt::Connected(connection) => {
                            info!("Store connected with {} credentials", strategy.name());

                            return StoreMode::Live {
                                strategy: strategy.name(),
                                connection,
                            };
                        }
                        Attempt::Failed(reason) => {
                            warn!("{} credentials failed: {reason}", strategy.name());
                        }
                    }
                }

                warn!("No store credentials found, using in-memory fallback");
                StoreMode::Offline
            })
            .await
    }
}

pub async fn attempt(strategy: &Strategy) -> Attempt {
    let url = match strategy {
        Strategy::Ambient(Some(url)) => url.clone(),
        Strategy::Ambient(None) => return Attempt::Failed("REDIS_URL not set".to_string()),
        Strategy::KeyFile(path) => match read_key_file(path) {
            Ok(key) => key.to_url(),
            Err(reason) => return Attempt::Failed(reason),
        },
    };

    match connect(&url).await {
        Ok(connection) => Attempt::Connected(connection),
        Err(e) => Attempt::Failed(e.to_string()),
    }
}

fn read_key_file(path: &Path) -> Result<StoreKey, String> {
    if !path.exists() {
        return Err(format!("no key file at {}", path.display()));
    }

    let contents = read_to_string(path).map_err(|e| format!("unreadable key file: {e}"))?;

    serde_json::from_str(&contents).map_err(|e| format!("could not parse key file: {e}"))
}

async fn connect(url: &str) -> Result<ConnectionManager, redis::RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(url)?;
    let mut connection_manager = client.get_connection_manager_with_config(config).await?;

    let _: String = redis::cmd("PING")
        .query_async(&mut connection_manager)
        .await?;

    Ok(connection_manager)
}
