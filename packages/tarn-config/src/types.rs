use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub storage: Storage,
	pub providers: Providers,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	#[serde(default = "default_pool_min_conns")]
	pub pool_min_conns: u32,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
	#[serde(default = "default_acquire_timeout_secs")]
	pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	/// "ollama" or "mock". Absent means no provider is configured.
	pub provider: Option<String>,
	#[serde(default = "default_embedding_url")]
	pub url: String,
	pub model: Option<String>,
	pub dimensions: u32,
	#[serde(default = "default_embedding_timeout_secs")]
	pub timeout_secs: u64,
}

fn default_pool_min_conns() -> u32 {
	10
}

fn default_pool_max_conns() -> u32 {
	20
}

fn default_acquire_timeout_secs() -> u64 {
	30
}

fn default_embedding_url() -> String {
	"http://localhost:11434".to_string()
}

fn default_embedding_timeout_secs() -> u64 {
	60
}
