//! Range-bounded reads from the sales-by-product view.

use std::time::Duration;

use chrono::NaiveDate;
use futures::TryStreamExt;
use salesync_core::{DateRange, Document, DocumentGrouper, SourceRow};
use sqlx::PgPool;

use crate::DbError;

/// A raw row of the sales view. Every column is nullable in the view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SalesRecord {
    pub doctype: Option<String>,
    pub workdate: Option<NaiveDate>,
    pub designation: Option<String>,
    pub quantity: Option<i64>,
}

impl SalesRecord {
    /// Convert into a [`SourceRow`].
    ///
    /// Returns `Ok(None)` for rows whose quantity does not fit a non-negative
    /// `u32`; those are logged and skipped. A NULL designation becomes an
    /// empty item name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NullColumn`] when `doctype`, `workdate` or
    /// `quantity` is NULL.
    pub fn into_source_row(self) -> Result<Option<SourceRow>, DbError> {
        let doc_type = self.doctype.ok_or(DbError::NullColumn("doctype"))?;
        let work_date = self.workdate.ok_or(DbError::NullColumn("workdate"))?;
        let raw_quantity = self.quantity.ok_or(DbError::NullColumn("quantity"))?;
        let designation = self.designation.unwrap_or_default();

        let Ok(quantity) = u32::try_from(raw_quantity) else {
            tracing::warn!(
                doc_type = %doc_type,
                date = %work_date,
                item = %designation,
                quantity = raw_quantity,
                "extract: skipping row with out-of-range quantity"
            );
            return Ok(None);
        };

        Ok(Some(SourceRow {
            doc_type,
            work_date,
            designation,
            quantity,
        }))
    }
}

/// SQL for one extraction. `view` must already be a validated identifier.
#[must_use]
pub fn sales_query(view: &str) -> String {
    format!(
        "SELECT doctype, CAST(workdate AS DATE) AS workdate, designation, \
                CAST(quantity AS BIGINT) AS quantity \
         FROM {view} \
         WHERE CAST(workdate AS DATE) BETWEEN $1 AND $2"
    )
}

/// Stream every row in `range` to `on_row`, holding one pooled connection for
/// the duration of the query. The connection goes back to the pool when this
/// returns, on success or error.
///
/// Returns the number of rows handed to `on_row`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the connection or query fails and
/// [`DbError::NullColumn`] on a row missing a required column.
pub async fn extract<F>(
    pool: &PgPool,
    view: &str,
    range: DateRange,
    mut on_row: F,
) -> Result<usize, DbError>
where
    F: FnMut(SourceRow),
{
    let sql = sales_query(view);
    let mut conn = pool.acquire().await?;
    let mut rows = sqlx::query_as::<_, SalesRecord>(&sql)
        .bind(range.start)
        .bind(range.end)
        .fetch(&mut *conn);

    let mut count = 0usize;
    while let Some(record) = rows.try_next().await? {
        if let Some(row) = record.into_source_row()? {
            on_row(row);
            count += 1;
        }
    }
    Ok(count)
}

/// Extract `range` and group it into documents, bounded by `timeout`.
///
/// # Errors
///
/// Returns [`DbError::Timeout`] if the whole extraction takes longer than
/// `timeout`, otherwise any error from [`extract`].
pub async fn extract_documents(
    pool: &PgPool,
    view: &str,
    range: DateRange,
    timeout: Duration,
) -> Result<Vec<Document>, DbError> {
    let mut grouper = DocumentGrouper::new();
    let rows = tokio::time::timeout(timeout, extract(pool, view, range, |row| grouper.push(row)))
        .await
        .map_err(|_| DbError::Timeout {
            secs: timeout.as_secs(),
        })??;

    tracing::debug!(
        rows,
        documents = grouper.len(),
        range = %range,
        "extract: rows grouped"
    );
    Ok(grouper.finish())
}
