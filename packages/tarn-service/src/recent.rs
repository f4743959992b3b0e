use time::OffsetDateTime;

use tarn_domain::memory::Memory;
use tarn_storage::models::MemoryRow;

use crate::{Result, TarnService, row_to_memory};

impl TarnService {
	/// Memories created at or after `since`, newest first.
	pub async fn recent(
		&self,
		tenant: &str,
		since: OffsetDateTime,
		limit: i64,
	) -> Result<Vec<Memory>> {
		tarn_domain::tenant::validate_name(tenant)?;

		if limit <= 0 {
			return Ok(Vec::new());
		}

		let mut conn = self.db.acquire_tenant(tenant).await?;
		let rows = sqlx::query_as::<_, MemoryRow>(
			"\
SELECT id, content, embedding::text AS embedding, forgotten, metadata
FROM memories
WHERE NOT forgotten
	AND (metadata->>'created_at')::timestamptz >= $1
ORDER BY (metadata->>'created_at')::timestamptz DESC
LIMIT $2",
		)
		.bind(since)
		.bind(limit)
		.fetch_all(&mut *conn)
		.await?;

		rows.into_iter().map(row_to_memory).collect()
	}
}
