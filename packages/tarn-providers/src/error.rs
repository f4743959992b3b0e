pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Provider failures, split by what the caller can do about them.
///
/// `Unavailable`, `ModelNotFound` and `Timeout` point at the embedding
/// service deployment; `InvalidInput` at the request; `InvalidResponse` at a
/// wire mismatch; `NotConfigured` at missing configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Embedding service is unavailable: {message}.")]
	Unavailable { message: String },
	#[error("Embedding model is not available: {message}.")]
	ModelNotFound { message: String },
	#[error("Embedding request timed out after {timeout_secs} seconds.")]
	Timeout { timeout_secs: u64 },
	#[error("{message}")]
	InvalidInput { message: String },
	#[error("Embedding response could not be parsed: {message}.")]
	InvalidResponse { message: String },
	#[error("No embedding provider is configured.")]
	NotConfigured,
	#[error("Feature extraction failed: {message}.")]
	Extraction { message: String },
}
