//! Memory service: the write pipeline, the readers, and key management.
//!
//! Every operation takes a tenant name and runs against that tenant's schema
//! only. Providers sit behind traits so tests can substitute deterministic
//! implementations.

pub mod admin;
pub mod auth;
pub mod recent;
pub mod search;
pub mod splash;
pub mod store;

mod error;

pub use auth::KEY_PREFIX;
pub use error::{Error, Result};
pub use search::SearchHit;
pub use store::StoreOutcome;

use std::{future::Future, pin::Pin, sync::Arc};

use tarn_config::{Config, EmbeddingProviderConfig};
use tarn_domain::{
	lemma::Lemmatizer,
	memory::{Memory, Metadata},
};
use tarn_providers::{
	embedding::{self, HealthReport},
	extractor::{self, Extraction},
	mock,
};
use tarn_storage::{db::Db, models::MemoryRow};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, tarn_providers::Result<Vec<f32>>>;

	fn health<'a>(&'a self, cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, HealthReport>;
}

pub trait FeatureExtractor
where
	Self: Send + Sync,
{
	fn extract<'a>(&'a self, text: &'a str) -> BoxFuture<'a, tarn_providers::Result<Extraction>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub extractor: Arc<dyn FeatureExtractor>,
}
impl Providers {
	pub fn from_config(cfg: &Config, lemmatizer: Arc<Lemmatizer>) -> Self {
		let embedding: Arc<dyn EmbeddingProvider> =
			match cfg.providers.embedding.provider.as_deref() {
				Some("ollama") => Arc::new(OllamaEmbedding),
				Some("mock") => Arc::new(MockEmbedding),
				_ => {
					tracing::error!(
						"No embedding provider is configured; stores and semantic reads will fail."
					);

					Arc::new(NotConfiguredEmbedding)
				},
			};

		Self { embedding, extractor: Arc::new(LocalExtractor { lemmatizer }) }
	}
}

pub struct TarnService {
	pub cfg: Config,
	pub db: Db,
	pub lemmatizer: Arc<Lemmatizer>,
	pub providers: Providers,
}
impl TarnService {
	pub async fn new(cfg: Config) -> Result<Self> {
		let db = Db::connect(&cfg.storage.postgres).await?;
		let lemmatizer = Arc::new(Lemmatizer::new());
		let providers = Providers::from_config(&cfg, lemmatizer.clone());

		Ok(Self { cfg, db, lemmatizer, providers })
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		let lemmatizer = Arc::new(Lemmatizer::new());

		Self { cfg, db, lemmatizer, providers }
	}
}

struct OllamaEmbedding;
impl EmbeddingProvider for OllamaEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, tarn_providers::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}

	fn health<'a>(&'a self, cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, HealthReport> {
		Box::pin(embedding::health(cfg))
	}
}

struct MockEmbedding;
impl EmbeddingProvider for MockEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, tarn_providers::Result<Vec<f32>>> {
		let dimensions = cfg.dimensions;

		Box::pin(async move { mock::embed(dimensions, text) })
	}

	fn health<'a>(&'a self, cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, HealthReport> {
		let dimensions = cfg.dimensions;

		Box::pin(async move { mock::health(dimensions) })
	}
}

struct NotConfiguredEmbedding;
impl EmbeddingProvider for NotConfiguredEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, tarn_providers::Result<Vec<f32>>> {
		Box::pin(async { Err(tarn_providers::Error::NotConfigured) })
	}

	fn health<'a>(&'a self, _cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, HealthReport> {
		Box::pin(async {
			HealthReport {
				healthy: false,
				service: "none".to_string(),
				model: None,
				dimension: None,
				latency_ms: None,
				error: Some("No embedding provider is configured.".to_string()),
			}
		})
	}
}

/// Token-rule extraction run off the async threads.
struct LocalExtractor {
	lemmatizer: Arc<Lemmatizer>,
}
impl FeatureExtractor for LocalExtractor {
	fn extract<'a>(&'a self, text: &'a str) -> BoxFuture<'a, tarn_providers::Result<Extraction>> {
		let lemmatizer = self.lemmatizer.clone();
		let text = text.to_string();

		Box::pin(async move {
			tokio::task::spawn_blocking(move || extractor::extract(&lemmatizer, &text))
				.await
				.map_err(|err| tarn_providers::Error::Extraction { message: err.to_string() })?
		})
	}
}

/// Renders an embedding in pgvector's text form for `$n::text::vector` casts.
pub(crate) fn vector_to_pg(embedding: &[f32]) -> String {
	let mut out = String::with_capacity(embedding.len() * 8 + 2);

	out.push('[');

	for (idx, value) in embedding.iter().enumerate() {
		if idx > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub(crate) fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim().trim_start_matches('[').trim_end_matches(']');

	if trimmed.is_empty() {
		return Ok(Vec::new());
	}

	trimmed
		.split(',')
		.map(|value| {
			value
				.trim()
				.parse::<f32>()
				.map_err(|err| Error::MalformedRow { message: format!("bad vector value: {err}") })
		})
		.collect()
}

pub(crate) fn row_to_memory(row: MemoryRow) -> Result<Memory> {
	let metadata: Metadata = serde_json::from_value(row.metadata)?;
	let embedding = row.embedding.as_deref().map(parse_pg_vector).transpose()?;

	Ok(Memory {
		id: Some(row.id),
		content: row.content,
		embedding,
		forgotten: row.forgotten,
		metadata,
	})
}
