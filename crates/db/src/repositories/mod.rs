//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod revision_repo;

pub use revision_repo::RevisionRepo;
