use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read {path}: {source}.")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("Failed to write {path}: {source}.")]
	Write { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse {path}: {source}.")]
	Parse { path: PathBuf, source: serde_json::Error },
	#[error("Failed to serialize {what}: {source}.")]
	Serialize { what: &'static str, source: serde_json::Error },
	#[error("Timed out acquiring the {resource} lock.")]
	LockTimeout { resource: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
