//! Field catalogue for revision-history records.
//!
//! The loader sends every TSV column as-is, keyed by the header row, so the
//! header names must match these field names exactly for the service to
//! accept a chunk.

/// Every field a revision record must carry, in TSV column order.
pub const REVISION_FIELDS: [&str; 11] = [
    "user_id",
    "article_id",
    "revision_id",
    "namespace",
    "timestamp",
    "md5",
    "reverted",
    "reverted_user_id",
    "reverted_revision_id",
    "delta",
    "cur_size",
];

/// Return the required revision fields that do not appear in `header`.
///
/// Order follows [`REVISION_FIELDS`]. Extra header columns are ignored.
pub fn missing_fields<S: AsRef<str>>(header: &[S]) -> Vec<&'static str> {
    REVISION_FIELDS
        .iter()
        .copied()
        .filter(|field| !header.iter().any(|h| h.as_ref() == *field))
        .collect()
}
