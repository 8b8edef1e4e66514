use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::debug;

use super::{BackendError, QueryBackend, QueryOutcome};
use crate::config::GunConfig;

/// SQL backend over a shared MySQL-protocol connection pool.
///
/// The pool is opened eagerly at connect time, so a wrong or unreachable
/// DSN surfaces as a bind failure instead of on the first shot. Every
/// concurrent shot checks a connection out of the same pool; the pool is
/// drained and closed when the owning gun is dropped.
pub struct SqlBackend {
    pool: MySqlPool,
}

#[async_trait]
impl QueryBackend for SqlBackend {
    const PROTOCOL: &'static str = "SQL";

    async fn connect(conf: &GunConfig) -> Result<Self, BackendError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(conf.pool_size)
            .connect(&conf.target)
            .await?;
        debug!(dsn = %conf.target, pool_size = conf.pool_size, "sql backend connected");
        Ok(Self { pool })
    }

    async fn execute(&self, payload: &str) -> Result<QueryOutcome, BackendError> {
        let rows = sqlx::query(payload).fetch_all(&self.pool).await?;
        Ok(QueryOutcome {
            rows: rows.len() as u64,
        })
    }
}
