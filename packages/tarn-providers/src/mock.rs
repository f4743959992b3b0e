//! Deterministic offline embeddings.
//!
//! Hashing the input with an extendable-output function gives every distinct
//! text a stable pseudo-random direction on the unit sphere. Useful for tests
//! and for running the whole stack without a model server.

use crate::{
	embedding::{HealthReport, MAX_INPUT_CHARS},
	error::{Error, Result},
};

pub fn embed(dimensions: u32, text: &str) -> Result<Vec<f32>> {
	if text.trim().is_empty() {
		return Err(Error::InvalidInput { message: "Embedding input must be non-empty.".to_string() });
	}
	if text.chars().count() > MAX_INPUT_CHARS {
		return Err(Error::InvalidInput {
			message: format!("Embedding input must be at most {MAX_INPUT_CHARS} characters."),
		});
	}

	let mut reader = blake3::Hasher::new().update(text.as_bytes()).finalize_xof();
	let mut bytes = vec![0_u8; dimensions as usize * 4];

	reader.fill(&mut bytes);

	let mut embedding = bytes
		.chunks_exact(4)
		.map(|chunk| {
			let raw = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

			// Map to [-1, 1].
			(raw as f64 / u32::MAX as f64 * 2. - 1.) as f32
		})
		.collect::<Vec<_>>();
	let norm = embedding.iter().map(|v| (*v as f64).powi(2)).sum::<f64>().sqrt();

	if norm > 0. {
		for value in &mut embedding {
			*value = (*value as f64 / norm) as f32;
		}
	}

	Ok(embedding)
}

pub fn health(dimensions: u32) -> HealthReport {
	HealthReport {
		healthy: true,
		service: "mock".to_string(),
		model: None,
		dimension: Some(dimensions),
		latency_ms: Some(0.),
		error: None,
	}
}
