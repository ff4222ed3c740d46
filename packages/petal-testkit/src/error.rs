#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error("{0}")]
	Message(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
