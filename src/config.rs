use std::env;

use crate::error::StartupError;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: Option<u32>, // backend default when unset
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| StartupError::Config("DATABASE_URL must be set".into()))?;

        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| StartupError::Config("PORT must be a number".into()))?;

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => Some(value.parse().map_err(|_| {
                StartupError::Config("DB_MAX_CONNECTIONS must be a positive number".into())
            })?),
            Err(_) => None,
        };

        Ok(Self { database_url, port, db_max_connections })
    }

    pub fn is_postgres(&self) -> bool {
        self.database_url.starts_with("postgres://") || self.database_url.starts_with("postgresql://")
    }

    pub fn backend_name(&self) -> &'static str {
        if self.is_postgres() { "postgres" } else { "sqlite" }
    }
}
