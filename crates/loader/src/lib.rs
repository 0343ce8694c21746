//! Bulk loader for the revision ingest service.
//!
//! Streams a large TSV file, cuts it into fixed-size chunks and posts each
//! chunk to `/items/bulk/` concurrently, retrying failed submits with
//! exponential backoff.

pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod reader;
pub mod retry;

pub use loader::{load, run, LoadOptions, LoadReport};
