/// Surrogate id of a stored revision row (`wiki_details.id`, a BIGSERIAL).
pub type DbId = i64;

/// Revision edit time, normalised to UTC before it is stored.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
