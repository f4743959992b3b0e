use serde_json::Value;
use sqlx::FromRow;
use time::OffsetDateTime;

/// A `memories` row as fetched. The embedding comes back as pgvector's text
/// form and is parsed upstream.
#[derive(Debug, FromRow)]
pub struct MemoryRow {
	pub id: i64,
	pub content: String,
	pub embedding: Option<String>,
	pub forgotten: bool,
	pub metadata: Value,
}

/// An `api_keys` row minus the key hash, which never leaves storage.
#[derive(Debug, FromRow)]
pub struct ApiKeyRow {
	pub id: i64,
	pub description: Option<String>,
	pub created_at: OffsetDateTime,
	pub last_used: Option<OffsetDateTime>,
	pub active: bool,
}
