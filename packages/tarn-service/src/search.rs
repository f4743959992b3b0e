use serde_json::Value;
use sqlx::FromRow;

use tarn_domain::memory::Memory;
use tarn_storage::models::MemoryRow;

use crate::{Result, TarnService, row_to_memory, vector_to_pg};

// Blend weights for the three signals. They sum to one so scores stay
// comparable across queries.
pub const TEXT_WEIGHT: f64 = 0.4;
pub const FEATURE_WEIGHT: f64 = 0.2;
pub const SEMANTIC_WEIGHT: f64 = 0.4;
/// Cosine similarity below this contributes nothing.
pub const SEMANTIC_MIN_SIMILARITY: f64 = 0.5;

#[derive(Debug)]
pub struct SearchHit {
	pub memory: Memory,
	pub score: f64,
}

#[derive(FromRow)]
struct SearchRow {
	id: i64,
	content: String,
	embedding: Option<String>,
	forgotten: bool,
	metadata: Value,
	final_score: f64,
}

impl TarnService {
	/// Ranks memories against `query` by blending full-text rank, exact
	/// feature matches and semantic similarity in one pass.
	pub async fn search(&self, tenant: &str, query: &str, limit: i64) -> Result<Vec<SearchHit>> {
		tarn_domain::tenant::validate_name(tenant)?;

		let query = query.trim();

		if query.is_empty() || limit <= 0 {
			return Ok(Vec::new());
		}

		let embedding =
			self.providers.embedding.embed(&self.cfg.providers.embedding, query).await?;
		// Feature matching is exact on the case-folded query: canonical tags
		// are already lowercase, entities fold here, action lemmas are bases.
		let lowered = query.to_lowercase();
		let mut conn = self.db.acquire_tenant(tenant).await?;
		let rows = sqlx::query_as::<_, SearchRow>(
			"\
WITH text_search AS (
	SELECT id, ts_rank(content_tsv, plainto_tsquery('english', $1))::float8 AS text_score
	FROM memories
	WHERE NOT forgotten
		AND content_tsv @@ plainto_tsquery('english', $1)
),
feature_search AS (
	SELECT id, 1.0::float8 AS feature_score
	FROM memories
	WHERE NOT forgotten
		AND (
			metadata->'tags' ? $2
			OR EXISTS (
				SELECT 1
				FROM jsonb_array_elements(metadata->'entities') AS entity
				WHERE lower(entity->>'text') = $2
			)
			OR EXISTS (
				SELECT 1
				FROM jsonb_array_elements(metadata->'actions') AS action
				WHERE action->>'lemma' = $2
			)
		)
),
semantic_search AS (
	SELECT id, (1 - (embedding <=> $3::text::vector))::float8 AS semantic_score
	FROM memories
	WHERE NOT forgotten
		AND embedding IS NOT NULL
		AND embedding <=> $3::text::vector < $4
),
combined AS (
	SELECT
		COALESCE(t.id, f.id, s.id) AS id,
		COALESCE(t.text_score, 0) * $5
			+ COALESCE(f.feature_score, 0) * $6
			+ COALESCE(s.semantic_score, 0) * $7 AS final_score
	FROM text_search t
	FULL OUTER JOIN feature_search f ON t.id = f.id
	FULL OUTER JOIN semantic_search s ON COALESCE(t.id, f.id) = s.id
)
SELECT m.id, m.content, m.embedding::text AS embedding, m.forgotten, m.metadata, c.final_score
FROM combined c
JOIN memories m ON m.id = c.id
WHERE c.final_score > 0
ORDER BY c.final_score DESC, m.id DESC
LIMIT $8",
		)
		.bind(query)
		.bind(lowered.as_str())
		.bind(vector_to_pg(&embedding))
		.bind(1. - SEMANTIC_MIN_SIMILARITY)
		.bind(TEXT_WEIGHT)
		.bind(FEATURE_WEIGHT)
		.bind(SEMANTIC_WEIGHT)
		.bind(limit)
		.fetch_all(&mut *conn)
		.await?;

		rows.into_iter()
			.map(|row| {
				let memory = row_to_memory(MemoryRow {
					id: row.id,
					content: row.content,
					embedding: row.embedding,
					forgotten: row.forgotten,
					metadata: row.metadata,
				})?;

				Ok(SearchHit { memory, score: row.final_score })
			})
			.collect()
	}
}
