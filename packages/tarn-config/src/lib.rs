mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, EmbeddingProviderConfig, Postgres, Providers, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_min_conns > cfg.storage.postgres.pool_max_conns {
		return Err(Error::Validation {
			message: "storage.postgres.pool_min_conns must not exceed pool_max_conns.".to_string(),
		});
	}
	if cfg.storage.postgres.acquire_timeout_secs == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.acquire_timeout_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	if let Some(provider) = cfg.providers.embedding.provider.as_deref() {
		if !matches!(provider, "ollama" | "mock") {
			return Err(Error::Validation {
				message: "providers.embedding.provider must be one of ollama or mock.".to_string(),
			});
		}
		if provider == "ollama" && cfg.providers.embedding.model.is_none() {
			return Err(Error::Validation {
				message: "providers.embedding.model is required when provider is ollama."
					.to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.embedding
		.provider
		.as_deref()
		.map(|provider| provider.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.embedding.provider = None;
	}
	if cfg
		.providers
		.embedding
		.model
		.as_deref()
		.map(|model| model.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.embedding.model = None;
	}
}
