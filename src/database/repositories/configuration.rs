//! Configuration document repository
//!
//! Documents are stored whole as JSONB next to a version column; every
//! write is conditional on the version the caller loaded.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Configuration;
use crate::state::ConfigurationStore;
use crate::utils::errors::{LogisticsError, Result};
use crate::utils::logging::log_database_operation;

#[derive(Clone)]
pub struct PostgresConfigurationStore {
    pool: PgPool,
}

impl PostgresConfigurationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, event_id: Uuid) -> Result<Option<i64>> {
        let version: Option<(i64,)> = sqlx::query_as("SELECT version FROM event_configurations WHERE event_id = $1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(version.map(|(v,)| v))
    }
}

#[async_trait]
impl ConfigurationStore for PostgresConfigurationStore {
    async fn load(&self, event_id: Uuid) -> Result<Option<Configuration>> {
        let started = Instant::now();
        let row: Option<(i64, serde_json::Value)> =
            sqlx::query_as("SELECT version, document FROM event_configurations WHERE event_id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;
        log_database_operation("select", "event_configurations", started.elapsed().as_millis() as u64, true);

        match row {
            Some((version, document)) => {
                let mut configuration: Configuration = serde_json::from_value(document)?;
                configuration.version = version;
                Ok(Some(configuration))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, configuration: &Configuration) -> Result<Configuration> {
        let mut stored = configuration.clone();
        stored.version = 1;
        let document = serde_json::to_value(&stored)?;

        let started = Instant::now();
        let result = sqlx::query(
            r#"
            INSERT INTO event_configurations (event_id, version, document, published, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(stored.event_id)
        .bind(stored.version)
        .bind(document)
        .bind(stored.published)
        .bind(stored.updated_at)
        .execute(&self.pool)
        .await?;
        let inserted = result.rows_affected() == 1;
        log_database_operation("insert", "event_configurations", started.elapsed().as_millis() as u64, inserted);

        if !inserted {
            let actual = self.current_version(stored.event_id).await?.unwrap_or_default();
            return Err(LogisticsError::VersionConflict {
                event_id: stored.event_id,
                expected: 0,
                actual,
            });
        }

        Ok(stored)
    }

    async fn save(&self, configuration: &Configuration) -> Result<Configuration> {
        let expected = configuration.version;
        let mut stored = configuration.clone();
        stored.version = expected + 1;
        let document = serde_json::to_value(&stored)?;

        let started = Instant::now();
        let result = sqlx::query(
            r#"
            UPDATE event_configurations
            SET version = $3, document = $4, published = $5, updated_at = $6
            WHERE event_id = $1 AND version = $2
            "#,
        )
        .bind(stored.event_id)
        .bind(expected)
        .bind(stored.version)
        .bind(document)
        .bind(stored.published)
        .bind(stored.updated_at)
        .execute(&self.pool)
        .await?;
        let saved = result.rows_affected() == 1;
        log_database_operation("update", "event_configurations", started.elapsed().as_millis() as u64, saved);

        if !saved {
            return match self.current_version(stored.event_id).await? {
                Some(actual) => Err(LogisticsError::VersionConflict {
                    event_id: stored.event_id,
                    expected,
                    actual,
                }),
                None => Err(LogisticsError::not_found("configuration", stored.event_id.to_string())),
            };
        }

        Ok(stored)
    }
}
