use tarn_domain::memory::Memory;
use tarn_storage::models::MemoryRow;

use crate::{Result, TarnService, row_to_memory, vector_to_pg};

// Cosine distance band for "related but not redundant": anything closer is a
// near-duplicate, anything farther is noise. Both bounds are exclusive.
pub const SPLASH_MAX_DISTANCE: f64 = 0.3;
pub const SPLASH_MIN_DISTANCE: f64 = 0.1;
pub const SPLASH_LIMIT: i64 = 3;

impl TarnService {
	/// Finds memories adjacent to `memory` in embedding space, closest first.
	pub async fn splash(&self, tenant: &str, memory: &Memory) -> Result<Vec<Memory>> {
		let Some(embedding) = memory.embedding.as_deref() else {
			return Ok(Vec::new());
		};
		let mut conn = self.db.acquire_tenant(tenant).await?;
		let rows = sqlx::query_as::<_, MemoryRow>(
			"\
SELECT id, content, embedding::text AS embedding, forgotten, metadata
FROM memories
WHERE NOT forgotten
	AND embedding IS NOT NULL
	AND id IS DISTINCT FROM $2
	AND embedding <=> $1::text::vector < $3
	AND embedding <=> $1::text::vector > $4
ORDER BY embedding <=> $1::text::vector
LIMIT $5",
		)
		.bind(vector_to_pg(embedding))
		.bind(memory.id)
		.bind(SPLASH_MAX_DISTANCE)
		.bind(SPLASH_MIN_DISTANCE)
		.bind(SPLASH_LIMIT)
		.fetch_all(&mut *conn)
		.await?;

		rows.into_iter().map(row_to_memory).collect()
	}
}
