//! Revision-history models and DTOs.
//!
//! Maps to the `wiki_details` table.

use revingest_core::coerce;
use revingest_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `wiki_details` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Revision {
    pub id: DbId,
    pub user_id: i64,
    pub article_id: i64,
    pub revision_id: i64,
    pub namespace: i64,
    pub timestamp: Timestamp,
    pub md5: String,
    pub reverted: i64,
    pub reverted_user_id: i64,
    pub reverted_revision_id: i64,
    pub delta: i64,
    pub cur_size: i64,
}

impl Revision {
    /// The caller-supplied part of the row, without the surrogate id.
    pub fn record(&self) -> CreateRevision {
        CreateRevision {
            user_id: self.user_id,
            article_id: self.article_id,
            revision_id: self.revision_id,
            namespace: self.namespace,
            timestamp: self.timestamp,
            md5: self.md5.clone(),
            reverted: self.reverted,
            reverted_user_id: self.reverted_user_id,
            reverted_revision_id: self.reverted_revision_id,
            delta: self.delta,
            cur_size: self.cur_size,
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a revision. Every field is required.
///
/// Scalars are coerced from strings because the bulk loader forwards raw TSV
/// cells; see [`revingest_core::coerce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRevision {
    #[serde(deserialize_with = "coerce::int")]
    pub user_id: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub article_id: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub revision_id: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub namespace: i64,
    #[serde(deserialize_with = "coerce::timestamp")]
    pub timestamp: Timestamp,
    #[serde(deserialize_with = "coerce::text")]
    pub md5: String,
    #[serde(deserialize_with = "coerce::int")]
    pub reverted: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub reverted_user_id: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub reverted_revision_id: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub delta: i64,
    #[serde(deserialize_with = "coerce::int")]
    pub cur_size: i64,
}

// ---------------------------------------------------------------------------
// Column-major batch
// ---------------------------------------------------------------------------

/// A batch of [`CreateRevision`] values transposed into one array per column,
/// ready to bind against `UNNEST($1::bigint[], ...)`.
#[derive(Debug, Default)]
pub struct RevisionColumns {
    pub user_ids: Vec<i64>,
    pub article_ids: Vec<i64>,
    pub revision_ids: Vec<i64>,
    pub namespaces: Vec<i64>,
    pub timestamps: Vec<Timestamp>,
    pub md5s: Vec<String>,
    pub reverted: Vec<i64>,
    pub reverted_user_ids: Vec<i64>,
    pub reverted_revision_ids: Vec<i64>,
    pub deltas: Vec<i64>,
    pub cur_sizes: Vec<i64>,
}

impl RevisionColumns {
    pub fn from_records(records: &[CreateRevision]) -> Self {
        let n = records.len();
        let mut cols = Self {
            user_ids: Vec::with_capacity(n),
            article_ids: Vec::with_capacity(n),
            revision_ids: Vec::with_capacity(n),
            namespaces: Vec::with_capacity(n),
            timestamps: Vec::with_capacity(n),
            md5s: Vec::with_capacity(n),
            reverted: Vec::with_capacity(n),
            reverted_user_ids: Vec::with_capacity(n),
            reverted_revision_ids: Vec::with_capacity(n),
            deltas: Vec::with_capacity(n),
            cur_sizes: Vec::with_capacity(n),
        };
        for r in records {
            cols.user_ids.push(r.user_id);
            cols.article_ids.push(r.article_id);
            cols.revision_ids.push(r.revision_id);
            cols.namespaces.push(r.namespace);
            cols.timestamps.push(r.timestamp);
            cols.md5s.push(r.md5.clone());
            cols.reverted.push(r.reverted);
            cols.reverted_user_ids.push(r.reverted_user_id);
            cols.reverted_revision_ids.push(r.reverted_revision_id);
            cols.deltas.push(r.delta);
            cols.cur_sizes.push(r.cur_size);
        }
        cols
    }

    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }
}
