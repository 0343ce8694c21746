//! Shared domain types for the revision ingest service and bulk loader.
//!
//! Pure logic only: no database access, no HTTP, no async.

pub mod coerce;
pub mod error;
pub mod revision;
pub mod types;
