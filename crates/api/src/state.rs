/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted internally. Handlers
/// check out a connection per query and return it when the query finishes.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: revingest_db::DbPool,
}
