//! Handlers for the `/items` resource (revision-history rows).

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use revingest_core::error::CoreError;
use revingest_core::types::DbId;
use revingest_db::models::revision::{CreateRevision, Revision};
use revingest_db::repositories::RevisionRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::state::AppState;

/// POST /items/
///
/// Validate and store one revision. Returns the stored row including its
/// assigned id.
pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CreateRevision>,
) -> AppResult<Json<Revision>> {
    let row = RevisionRepo::create(&state.pool, &body).await?;
    tracing::debug!(id = row.id, revision_id = row.revision_id, "Stored revision");
    Ok(Json(row))
}

/// POST /items/bulk/
///
/// Validate every record, then store them all in one transaction. A single
/// invalid record rejects the whole batch before anything is written.
///
/// Responds with an empty array: assigned ids are not reported for bulk
/// inserts.
pub async fn create_bulk(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<Vec<CreateRevision>>,
) -> AppResult<Json<Vec<Revision>>> {
    let inserted = RevisionRepo::create_bulk(&state.pool, &body).await?;
    tracing::info!(rows = inserted, "Stored revision batch");
    Ok(Json(Vec::new()))
}

/// GET /items/{id}
///
/// Fetch one stored revision. Returns 404 if no row has that id and 422 if
/// the id is not an integer.
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<Json<Revision>> {
    let Path(id) = path.map_err(|e| AppError::Core(CoreError::Validation(e.body_text())))?;

    let row = RevisionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Revision",
            id,
        }))?;
    Ok(Json(row))
}
