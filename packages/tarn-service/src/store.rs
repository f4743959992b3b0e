use tarn_domain::{lemma::Lemmatizer, memory::Memory, tag};

use crate::{Error, Result, TarnService, vector_to_pg};

pub const MAX_AUTO_TAGS: usize = 5;
pub const MIN_AUTO_TAG_CHARS: usize = 3;

/// What a store produced: the persisted memory and any nearby ones it
/// surfaced on the way in.
#[derive(Debug)]
pub struct StoreOutcome {
	pub memory: Memory,
	pub splashes: Vec<Memory>,
}

impl TarnService {
	/// Runs the full write pipeline for one piece of content.
	///
	/// Validation, tagging, extraction and embedding all happen before the
	/// row is written; a failure in any of them stores nothing. Splash
	/// discovery and the count refresh run after the insert and only log on
	/// failure, since the memory is already durable by then.
	pub async fn store(
		&self,
		tenant: &str,
		content: &str,
		user_tags: &[String],
	) -> Result<StoreOutcome> {
		tarn_domain::tenant::validate_name(tenant)?;

		let mut memory = Memory::new(content)?;

		for tag in tag::canonicalize_all(&self.lemmatizer, user_tags) {
			memory.add_canonical_tag(tag);
		}

		let extraction = self.providers.extractor.extract(&memory.content).await?;

		apply_auto_tags(&self.lemmatizer, &mut memory, &extraction.candidate_tags);

		for entity in extraction.entities {
			memory.add_entity(entity);
		}
		for action in extraction.actions {
			memory.add_action(action);
		}

		let embedding =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &memory.content).await?;
		let expected = self.cfg.providers.embedding.dimensions as usize;

		if embedding.len() != expected {
			return Err(Error::Provider(tarn_providers::Error::InvalidResponse {
				message: format!("expected {expected} dimensions, got {}", embedding.len()),
			}));
		}

		memory.embedding = Some(embedding);

		let metadata = serde_json::to_value(&memory.metadata)?;

		{
			let mut conn = self.db.acquire_tenant(tenant).await?;
			let id = sqlx::query_scalar::<_, i64>(
				"\
INSERT INTO memories (content, embedding, metadata)
VALUES ($1, $2::text::vector, $3)
RETURNING id",
			)
			.bind(memory.content.as_str())
			.bind(vector_to_pg(memory.embedding.as_deref().unwrap_or_default()))
			.bind(&metadata)
			.fetch_one(&mut *conn)
			.await?;

			memory.id = Some(id);
		}

		let splashes = match self.splash(tenant, &memory).await {
			Ok(splashes) => splashes,
			Err(err) => {
				tracing::warn!(tenant, error = %err, "splash discovery failed after store");

				Vec::new()
			},
		};

		match self.memory_count(tenant).await {
			Ok(count) => tracing::debug!(tenant, count, "memory count after store"),
			Err(err) => tracing::warn!(tenant, error = %err, "memory count refresh failed"),
		}

		Ok(StoreOutcome { memory, splashes })
	}
}

// Extractor candidates arrive most informative first; take them in order
// until the cap, skipping anything too short, a stopword, or already tagged.
fn apply_auto_tags(lemmatizer: &Lemmatizer, memory: &mut Memory, candidates: &[String]) {
	let mut added = 0;

	for candidate in candidates {
		if added == MAX_AUTO_TAGS {
			break;
		}

		let canonical = tag::canonicalize(lemmatizer, candidate);

		if canonical.chars().count() < MIN_AUTO_TAG_CHARS
			|| lemmatizer.is_stopword(&canonical)
			|| memory.metadata.tags.contains(&canonical)
		{
			continue;
		}

		memory.metadata.tags.insert(canonical);

		added += 1;
	}
}
