//! `GET /health`: database reachability and how many revisions are stored.
//!
//! The loader never reports which chunks were dropped after exhausting their
//! retries, so `stored_rows` is what an operator compares against the source
//! file to see how much of a load landed.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use revingest_db::repositories::RevisionRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IngestHealth {
    /// `"ok"` when the store answered, `"degraded"` otherwise.
    pub status: &'static str,
    pub db_healthy: bool,
    /// Rows in `wiki_details`; `null` when the store is unreachable.
    pub stored_rows: Option<i64>,
}

impl IngestHealth {
    fn from_count(count: Result<i64, sqlx::Error>) -> Self {
        match count {
            Ok(rows) => Self {
                status: "ok",
                db_healthy: true,
                stored_rows: Some(rows),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Row count failed, reporting degraded health");
                Self {
                    status: "degraded",
                    db_healthy: false,
                    stored_rows: None,
                }
            }
        }
    }
}

async fn ingest_health(State(state): State<AppState>) -> Json<IngestHealth> {
    Json(IngestHealth::from_count(RevisionRepo::count(&state.pool).await))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(ingest_health))
}
