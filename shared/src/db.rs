//! Database connection management.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::{Error, Result};

/// Database credentials from Secrets Manager.
#[derive(Debug, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
    pub port: Option<u16>,
}

/// Fetch and parse the credentials secret.
pub async fn get_database_credentials(
    client: &SecretsClient,
    secret_arn: &str,
) -> Result<DatabaseCredentials> {
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get DB secret: {}", e)))?;

    let secret = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?;

    serde_json::from_str(secret)
        .map_err(|e| Error::Aws(format!("Failed to parse database credentials: {}", e)))
}

fn database_url(config: &DatabaseConfig, creds: &DatabaseCredentials) -> String {
    format!(
        "postgres://{}:{}@{}:{}/{}",
        creds.username,
        creds.password,
        config.host,
        creds.port.unwrap_or(5432),
        config.name
    )
}

/// Create a database connection pool using credentials from Secrets Manager.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let secrets = SecretsClient::new(&aws);
    let creds = get_database_credentials(&secrets, &config.secret_arn).await?;

    info!("Connecting to database {} on {}", config.name, config.host);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&database_url(config, &creds))
        .await?;

    Ok(pool)
}
