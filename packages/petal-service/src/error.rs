pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Rate limit exceeded for {identifier}.")]
	RateLimited { identifier: String },
	#[error("Intent classification failed: {message}")]
	Intent { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Catalog refresh failed: {message}")]
	Refresh { message: String },
}
impl From<petal_storage::Error> for Error {
	fn from(err: petal_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
