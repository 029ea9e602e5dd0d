use atlas_core::AppError;

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Read configuration from environment variables.
    ///
    /// - `DATABASE_URL` (required)
    /// - `DATABASE_MAX_CONNECTIONS` (optional, defaults to 5)
    pub fn from_env() -> Result<Self, AppError> {
        let url = std::env::var("DATABASE_URL").map_err(|_| {
            AppError::ConfigError("DATABASE_URL not set. Required for database operations.".into())
        })?;
        Self::from_parts(url, std::env::var("DATABASE_MAX_CONNECTIONS").ok())
    }

    /// Like [`from_env`](Self::from_env), but returns `None` when
    /// `DATABASE_URL` is unset instead of failing.
    pub fn from_env_optional() -> Result<Option<Self>, AppError> {
        match std::env::var("DATABASE_URL") {
            Ok(url) => Self::from_parts(url, std::env::var("DATABASE_MAX_CONNECTIONS").ok()).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn from_parts(url: String, max_connections: Option<String>) -> Result<Self, AppError> {
        let max_connections = match max_connections {
            None => 5,
            Some(raw) => {
                let parsed: u32 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid DATABASE_MAX_CONNECTIONS '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed == 0 {
                    return Err(AppError::ConfigError(
                        "DATABASE_MAX_CONNECTIONS must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        Ok(Self {
            url,
            max_connections,
        })
    }
}
