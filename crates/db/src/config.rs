use crate::error::HelperError;

/// Default size of the connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Database configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_url: String,
    /// Pool size (default: `20`).
    pub max_connections: u32,
}

impl DbConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default    |
    /// |----------------------|------------|
    /// | `DATABASE_URL`       | (required) |
    /// | `DB_MAX_CONNECTIONS` | `20`       |
    pub fn from_env() -> Result<Self, HelperError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| HelperError::Config("DATABASE_URL must be set".into()))?;
        let max_connections = std::env::var("DB_MAX_CONNECTIONS").ok();
        Self::from_parts(database_url, max_connections.as_deref())
    }

    /// Build configuration from raw values, validating the pool size.
    pub fn from_parts(
        database_url: String,
        max_connections: Option<&str>,
    ) -> Result<Self, HelperError> {
        if database_url.trim().is_empty() {
            return Err(HelperError::Config("DATABASE_URL must not be empty".into()));
        }
        let max_connections = match max_connections {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    HelperError::Config(format!(
                        "DB_MAX_CONNECTIONS must be a positive integer, got '{raw}'"
                    ))
                })?,
        };
        Ok(Self {
            database_url,
            max_connections,
        })
    }
}
