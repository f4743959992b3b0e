//! Ollama embedding client.

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tarn_config::EmbeddingProviderConfig;

use crate::error::{Error, Result};

/// Inputs past this length degrade embedding quality long before they hit
/// provider limits.
pub const MAX_INPUT_CHARS: usize = 50_000;

/// Point-in-time snapshot of the embedding service, safe to expose verbatim.
#[derive(Debug, Serialize)]
pub struct HealthReport {
	pub healthy: bool,
	pub service: String,
	pub model: Option<String>,
	pub dimension: Option<u32>,
	pub latency_ms: Option<f64>,
	pub error: Option<String>,
}

pub async fn embed(cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	if text.trim().is_empty() {
		return Err(Error::InvalidInput { message: "Embedding input must be non-empty.".to_string() });
	}
	if text.chars().count() > MAX_INPUT_CHARS {
		return Err(Error::InvalidInput {
			message: format!("Embedding input must be at most {MAX_INPUT_CHARS} characters."),
		});
	}

	let model = cfg.model.as_deref().ok_or(Error::NotConfigured)?;
	let client = build_client(cfg.timeout_secs)?;
	let body = serde_json::json!({
		"model": model,
		"prompt": text,
	});
	let res = client
		.post(format!("{}/api/embeddings", cfg.url.trim_end_matches('/')))
		.json(&body)
		.send()
		.await
		.map_err(|err| classify_send_error(err, cfg.timeout_secs))?;

	if res.status() == StatusCode::NOT_FOUND {
		return Err(Error::ModelNotFound { message: format!("model {model} was not found") });
	}
	if !res.status().is_success() {
		return Err(Error::Unavailable {
			message: format!("embedding request failed with status {}", res.status()),
		});
	}

	let json = res
		.json::<Value>()
		.await
		.map_err(|err| Error::InvalidResponse { message: err.to_string() })?;

	parse_embedding_response(&json)
}

/// Probes the service without ever failing; problems land in the report.
pub async fn health(cfg: &EmbeddingProviderConfig) -> HealthReport {
	let mut report = HealthReport {
		healthy: false,
		service: cfg.url.clone(),
		model: cfg.model.clone(),
		dimension: None,
		latency_ms: None,
		error: None,
	};
	let client = match build_client(5) {
		Ok(client) => client,
		Err(err) => {
			report.error = Some(err.to_string());

			return report;
		},
	};
	let tags = match list_models(&client, &cfg.url).await {
		Ok(tags) => tags,
		Err(err) => {
			report.error = Some(err.to_string());

			return report;
		},
	};

	if let Some(model) = cfg.model.as_deref()
		&& !tags.iter().any(|name| name == model || name.strip_suffix(":latest") == Some(model))
	{
		report.error = Some(format!("model {model} is not pulled on the service"));

		return report;
	}

	let started = Instant::now();

	match embed(cfg, "health check").await {
		Ok(embedding) => {
			report.healthy = true;
			report.dimension = Some(embedding.len() as u32);
			report.latency_ms = Some(started.elapsed().as_secs_f64() * 1_000.);
		},
		Err(err) => report.error = Some(err.to_string()),
	}

	report
}

fn build_client(timeout_secs: u64) -> Result<Client> {
	Client::builder()
		.timeout(Duration::from_secs(timeout_secs))
		.build()
		.map_err(|err| Error::Unavailable { message: err.to_string() })
}

fn classify_send_error(err: reqwest::Error, timeout_secs: u64) -> Error {
	if err.is_timeout() {
		Error::Timeout { timeout_secs }
	} else {
		Error::Unavailable { message: err.to_string() }
	}
}

async fn list_models(client: &Client, url: &str) -> Result<Vec<String>> {
	let res = client
		.get(format!("{}/api/tags", url.trim_end_matches('/')))
		.send()
		.await
		.map_err(|err| classify_send_error(err, 5))?;
	let json = res
		.error_for_status()
		.map_err(|err| Error::Unavailable { message: err.to_string() })?
		.json::<Value>()
		.await
		.map_err(|err| Error::InvalidResponse { message: err.to_string() })?;
	let models = json
		.get("models")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "tags response is missing models array".to_string(),
		})?;

	Ok(models
		.iter()
		.filter_map(|model| model.get("name").and_then(|v| v.as_str()).map(str::to_string))
		.collect())
}

fn parse_embedding_response(json: &Value) -> Result<Vec<f32>> {
	let values = json.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "response is missing embedding array".to_string() }
	})?;
	let mut embedding = Vec::with_capacity(values.len());

	for value in values {
		let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
			message: "embedding value must be numeric".to_string(),
		})?;

		embedding.push(number as f32);
	}

	if embedding.is_empty() {
		return Err(Error::InvalidResponse { message: "embedding array is empty".to_string() });
	}

	Ok(embedding)
}
