use std::env;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::blockchain::DEFAULT_DIFFICULTY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Everything a node needs at start-up.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    /// Identity credited with mining rewards.
    pub node_id: String,
    /// Initial peer set, normalized when the node is built.
    pub peers: Vec<String>,
    pub difficulty: usize,
    pub max_iterations: Option<u64>,
    pub peer_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            node_id: Uuid::new_v4().simple().to_string(),
            peers: Vec::new(),
            difficulty: DEFAULT_DIFFICULTY,
            max_iterations: None,
            peer_timeout: Duration::from_secs(5),
        }
    }
}

impl NodeConfig {
    /// Read `HOST`, `PORT`, `NODE_ID`, `PEERS`, `POW_DIFFICULTY`,
    /// `POW_MAX_ITERATIONS` and `PEER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(host) = lookup("HOST") {
            cfg.host = host;
        }
        if let Some(port) = parsed(&lookup, "PORT")? {
            cfg.port = port;
        }
        if let Some(id) = lookup("NODE_ID").filter(|id| !id.trim().is_empty()) {
            cfg.node_id = id.trim().to_string();
        }
        if let Some(peers) = lookup("PEERS") {
            cfg.peers = peers
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(difficulty) = parsed::<usize, _>(&lookup, "POW_DIFFICULTY")? {
            // A hex SHA-256 digest has 64 characters.
            if difficulty > 64 {
                return Err(ConfigError::Invalid {
                    var: "POW_DIFFICULTY",
                    value: difficulty.to_string(),
                });
            }
            cfg.difficulty = difficulty;
        }
        cfg.max_iterations = parsed(&lookup, "POW_MAX_ITERATIONS")?;
        if let Some(secs) = parsed(&lookup, "PEER_TIMEOUT_SECS")? {
            cfg.peer_timeout = Duration::from_secs(secs);
        }

        Ok(cfg)
    }
}

fn parsed<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
