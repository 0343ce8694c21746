pub mod health;
pub mod items;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// ```text
/// /items/                          create one revision (POST)
/// /items/bulk/                     create many revisions (POST)
/// /items/{id}                      get one revision (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(items::router())
}
