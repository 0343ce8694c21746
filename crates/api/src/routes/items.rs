//! Route definitions for the `/items` resource.

use axum::extract::Path;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::items;
use crate::state::AppState;

/// Routes for revision ingest and lookup.
///
/// ```text
/// POST   /items/          -> create
/// POST   /items/bulk/     -> create_bulk
/// GET    /items/{id}      -> get_by_id
/// ```
///
/// Trailing slashes are part of the contract: bulk clients post to
/// `/items/bulk/` verbatim. The other spelling of each path answers with a
/// 307 to the canonical one, which keeps the method and body.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items/", post(items::create))
        .route("/items/bulk/", post(items::create_bulk))
        .route("/items/{id}", get(items::get_by_id))
        .route("/items", post(|| async { Redirect::temporary("/items/") }))
        .route("/items/bulk", post(|| async { Redirect::temporary("/items/bulk/") }))
        .route("/items/{id}/", get(to_unslashed))
}

async fn to_unslashed(Path(id): Path<String>) -> Redirect {
    Redirect::temporary(&format!("/items/{id}"))
}
