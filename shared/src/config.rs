//! Configuration management for the calendar events Lambda.

use std::env;

use crate::{Error, Result};

/// Which backing table the service runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL table reached through a connection pool
    Postgres,
    /// Process-local sheet, lost on cold start
    Memory,
}

impl Backend {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "memory" => Ok(Backend::Memory),
            other => Err(Error::Config(format!(
                "EVENTS_BACKEND must be 'postgres' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

/// Database connection settings, present only for the Postgres backend.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,
    /// Database name
    pub name: String,
    /// ARN of the secret containing database credentials
    pub secret_arn: String,
    /// Maximum pool size
    pub max_connections: u32,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backing table implementation
    pub backend: Backend,
    /// Name of the events table
    pub table_name: String,
    /// Connection settings (Postgres backend only)
    pub database: Option<DatabaseConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("EVENTS_BACKEND") {
            Some(value) => Backend::parse(&value)?,
            None => Backend::Postgres,
        };

        let table_name = lookup("EVENTS_TABLE").unwrap_or_else(|| "calendar_events".to_string());
        validate_table_name(&table_name)?;

        let database = match backend {
            Backend::Memory => None,
            Backend::Postgres => {
                let required = |key: &str| {
                    lookup(key).ok_or_else(|| Error::Config(format!("{} not set", key)))
                };
                let max_connections = match lookup("DB_MAX_CONNECTIONS") {
                    Some(raw) => raw.parse().map_err(|_| {
                        Error::Config(format!("DB_MAX_CONNECTIONS is not a number: {}", raw))
                    })?,
                    None => 5,
                };

                Some(DatabaseConfig {
                    host: required("DB_HOST")?,
                    name: lookup("DB_NAME").unwrap_or_else(|| "calendar".to_string()),
                    secret_arn: required("DB_SECRET_ARN")?,
                    max_connections,
                })
            }
        };

        Ok(Self {
            backend,
            table_name,
            database,
        })
    }
}

/// The table name is spliced into SQL, so only plain lowercase identifiers pass.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && name.len() <= 63 {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid table name: '{}'", name)))
    }
}
