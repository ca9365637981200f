//! Server configuration.

use std::path::PathBuf;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Server runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_address: String,
    /// Redb database file. In-memory storage when `None`.
    pub db_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: DEFAULT_BIND.to_string(), db_path: None }
    }
}
