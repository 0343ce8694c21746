//! Repository for the `wiki_details` table.

use revingest_core::types::DbId;
use sqlx::PgPool;

use crate::models::revision::{CreateRevision, Revision, RevisionColumns};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, article_id, revision_id, namespace, timestamp, md5, \
    reverted, reverted_user_id, reverted_revision_id, delta, cur_size";

/// Columns supplied by the caller on insert (everything except `id`).
const INSERT_COLUMNS: &str = "user_id, article_id, revision_id, namespace, timestamp, md5, \
    reverted, reverted_user_id, reverted_revision_id, delta, cur_size";

/// Maximum rows bound into a single `INSERT ... UNNEST` statement.
pub const BULK_INSERT_SLICE: usize = 10_000;

/// Provides insert and lookup operations for revision rows.
///
/// Rows are never updated or deleted.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Insert one revision, returning the created row with its assigned id.
    pub async fn create(pool: &PgPool, body: &CreateRevision) -> Result<Revision, sqlx::Error> {
        let query = format!(
            "INSERT INTO wiki_details ({INSERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(body.user_id)
            .bind(body.article_id)
            .bind(body.revision_id)
            .bind(body.namespace)
            .bind(body.timestamp)
            .bind(&body.md5)
            .bind(body.reverted)
            .bind(body.reverted_user_id)
            .bind(body.reverted_revision_id)
            .bind(body.delta)
            .bind(body.cur_size)
            .fetch_one(pool)
            .await
    }

    /// Insert many revisions in one transaction, returning the number of rows
    /// written.
    ///
    /// Large batches are split into statements of at most
    /// [`BULK_INSERT_SLICE`] rows; either every slice commits or none does.
    /// Assigned ids are not returned.
    pub async fn create_bulk(
        pool: &PgPool,
        records: &[CreateRevision],
    ) -> Result<u64, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let query = format!(
            "INSERT INTO wiki_details ({INSERT_COLUMNS}) \
             SELECT * FROM UNNEST( \
                $1::bigint[], $2::bigint[], $3::bigint[], $4::bigint[], \
                $5::timestamptz[], $6::text[], $7::bigint[], $8::bigint[], \
                $9::bigint[], $10::bigint[], $11::bigint[])"
        );

        let mut tx = pool.begin().await?;
        let mut inserted = 0u64;

        for slice in records.chunks(BULK_INSERT_SLICE) {
            let cols = RevisionColumns::from_records(slice);
            let result = sqlx::query(&query)
                .bind(&cols.user_ids)
                .bind(&cols.article_ids)
                .bind(&cols.revision_ids)
                .bind(&cols.namespaces)
                .bind(&cols.timestamps)
                .bind(&cols.md5s)
                .bind(&cols.reverted)
                .bind(&cols.reverted_user_ids)
                .bind(&cols.reverted_revision_ids)
                .bind(&cols.deltas)
                .bind(&cols.cur_sizes)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        tracing::debug!(rows = inserted, "Bulk inserted revisions");
        Ok(inserted)
    }

    /// Find a single revision by its surrogate id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Revision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wiki_details WHERE id = $1");
        sqlx::query_as::<_, Revision>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Total number of stored revisions.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wiki_details")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
