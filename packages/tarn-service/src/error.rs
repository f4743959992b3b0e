pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Service failures, split so callers can branch on the family.
///
/// Rejected input is `Validation`, anything from the embedding service or
/// extractor is `Provider`, key failures are `Authorization`, and database
/// trouble is `Storage`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Validation(#[from] tarn_domain::Error),
	#[error(transparent)]
	Provider(#[from] tarn_providers::Error),
	#[error("{message}")]
	Authorization { message: String },
	#[error("{message}")]
	NotFound { message: String },
	#[error(transparent)]
	Storage(#[from] sqlx::Error),
	#[error("Stored row could not be decoded: {message}.")]
	MalformedRow { message: String },
}
impl From<tarn_storage::Error> for Error {
	fn from(err: tarn_storage::Error) -> Self {
		match err {
			tarn_storage::Error::Sqlx(err) => Self::Storage(err),
			tarn_storage::Error::Domain(err) => Self::Validation(err),
			tarn_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}
impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::MalformedRow { message: err.to_string() }
	}
}
