//! Redis integration service implementation
//!
//! Prefixed JSON caching with TTL. The flight search client uses it to avoid
//! repeating identical inventory queries.

use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RedisConfig;
use crate::models::{FlightOption, FlightSearchQuery};
use crate::utils::errors::Result;

/// Redis service for caching
#[derive(Clone, Debug)]
pub struct RedisService {
    client: Client,
    config: RedisConfig,
}

impl RedisService {
    /// Create a new RedisService instance
    pub fn new(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        Ok(Self { client, config })
    }

    /// Get Redis connection
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.config.prefix, key)
    }

    /// Set a value in Redis with TTL
    pub async fn set<T>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) -> Result<()>
    where
        T: Serialize,
    {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(value)?;

        let full_key = self.full_key(key);
        let ttl = ttl_seconds.unwrap_or(self.config.ttl_seconds);

        let _: () = conn.set_ex(&full_key, serialized, ttl).await?;

        debug!(key = %full_key, ttl = ttl, "Value set in Redis");
        Ok(())
    }

    /// Get a value from Redis
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.get_connection().await?;
        let full_key = self.full_key(key);

        let result: Option<String> = conn.get(&full_key).await?;

        match result {
            Some(data) => {
                let deserialized = serde_json::from_str::<T>(&data)?;
                debug!(key = %full_key, "Value retrieved from Redis");
                Ok(Some(deserialized))
            }
            None => {
                debug!(key = %full_key, "Key not found in Redis");
                Ok(None)
            }
        }
    }

    /// Cache flight search results
    pub async fn cache_flight_search(
        &self,
        query: &FlightSearchQuery,
        options: &[FlightOption],
        ttl_seconds: u64,
    ) -> Result<()> {
        self.set(&query.cache_key(), &options, Some(ttl_seconds)).await
    }

    /// Get cached flight search results
    pub async fn get_flight_search(&self, query: &FlightSearchQuery) -> Result<Option<Vec<FlightOption>>> {
        self.get(&query.cache_key()).await
    }

    /// Health check for Redis connection
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;

        let healthy = pong == "PONG";
        info!(healthy = healthy, "Redis health check completed");
        Ok(healthy)
    }
}
