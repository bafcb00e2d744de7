use std::future::Future;
use std::time::Duration;

use salesync_core::{DateRange, Document};
use salesync_db::{DbError, PoolConfig};

/// Where a run gets its documents from.
pub trait SalesSource: Send + Sync {
    /// Extract and group every sales row in `range`.
    fn documents(
        &self,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<Document>, DbError>> + Send;
}

/// [`SalesSource`] backed by the sales-by-product view.
///
/// Each run opens its own pool and closes it afterwards, so a bad or
/// unreachable connection string fails that run only.
pub struct PgSalesSource {
    connection_string: String,
    pool_config: PoolConfig,
    view: String,
    query_timeout: Duration,
}

impl PgSalesSource {
    pub fn new(
        connection_string: String,
        pool_config: PoolConfig,
        view: String,
        query_timeout: Duration,
    ) -> Self {
        Self {
            connection_string,
            pool_config,
            view,
            query_timeout,
        }
    }

    /// Try the connection once so misconfiguration shows up in the log at
    /// startup rather than at the first trigger.
    pub async fn check(&self) {
        let pool = match salesync_db::connect_lazy(&self.connection_string, self.pool_config) {
            Ok(pool) => pool,
            Err(e) => {
                tracing::error!(error = %e, "agent: connection string is invalid; every run will fail extraction until it is fixed");
                return;
            }
        };
        if let Err(e) = salesync_db::ping(&pool).await {
            tracing::warn!(error = %e, "agent: data source unreachable at startup; runs will retry on trigger");
        }
        pool.close().await;
    }
}

impl SalesSource for PgSalesSource {
    async fn documents(&self, range: DateRange) -> Result<Vec<Document>, DbError> {
        let pool = salesync_db::connect_lazy(&self.connection_string, self.pool_config)?;
        let result =
            salesync_db::extract_documents(&pool, &self.view, range, self.query_timeout).await;
        pool.close().await;
        result
    }
}
