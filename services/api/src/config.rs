//! Server configuration loaded from `PHONO_*` environment variables

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Where entities are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// API server configuration
///
/// # Environment Variables
/// - `PHONO_HOST`: Bind address (default: "0.0.0.0")
/// - `PHONO_PORT`: Bind port (default: 3001)
/// - `PHONO_STORAGE`: `postgres` or `memory` (default: "postgres")
/// - `PHONO_JWT_SECRET`: HS256 signing secret, at least 32 bytes (required)
/// - `PHONO_TOKEN_TTL_SECONDS`: Access token lifetime (default: 86400)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3001)?
            .set_default("storage", "postgres")?
            .set_default("token_ttl_seconds", 86400)?
            .add_source(Environment::with_prefix("PHONO").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
