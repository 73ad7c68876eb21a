//! Cache partition service.
//!
//! Each project owns one redis database index on the configured server.
//! Connections are opened per operation against the base URL with the
//! partition index substituted in; nothing is pooled or shared.

use redis::aio::MultiplexedConnection;
use redis::{Client, ConnectionInfo, IntoConnectionInfo};
use tracing::info;

use crate::{Error, Result};

/// Service for per-project cache partitions.
#[derive(Debug, Clone)]
pub struct CacheService {
    /// Base redis URL; the partition index replaces its database index.
    url: String,
}

impl CacheService {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Connection parameters for a partition.
    pub fn connection_info(&self, partition: i64) -> Result<ConnectionInfo> {
        let mut info = self.url.as_str().into_connection_info().map_err(Error::Cache)?;
        info.redis.db = partition;
        Ok(info)
    }

    /// Open a connection bound to a partition.
    pub async fn connection(&self, partition: i64) -> Result<MultiplexedConnection> {
        let client = Client::open(self.connection_info(partition)?).map_err(Error::Cache)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(Error::Cache)?;
        Ok(conn)
    }

    /// Drop every key in a partition.
    pub async fn flush_partition(&self, partition: i64) -> Result<()> {
        let mut conn = self.connection(partition).await?;
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(Error::Cache)?;

        info!(partition, "Flushed cache partition");
        Ok(())
    }

    /// Round-trip check against the base partition.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection(0).await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(Error::Cache)?;
        Ok(())
    }
}
