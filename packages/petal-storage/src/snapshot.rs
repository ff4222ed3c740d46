use std::{path::PathBuf, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::{
	fs,
	sync::{Mutex, RwLock},
	time::timeout,
};

use petal_domain::product::Product;

use crate::{Error, Result};

/// Catalog snapshot persisted as a single JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
	/// Unix seconds of the refresh that produced this snapshot.
	pub refreshed_at: i64,
	pub products: Vec<Product>,
}
impl Snapshot {
	pub fn new(products: Vec<Product>) -> Self {
		Self { refreshed_at: OffsetDateTime::now_utc().unix_timestamp(), products }
	}

	pub fn is_stale(&self, ttl_seconds: u64) -> bool {
		let age = OffsetDateTime::now_utc().unix_timestamp() - self.refreshed_at;

		age < 0 || age as u64 >= ttl_seconds
	}
}

/// Process-wide handle to the snapshot being served. Readers clone an `Arc`;
/// a refresh swaps the pointer wholesale, so a reader mid-search keeps the
/// catalog it started with and never observes a half-updated one.
#[derive(Default)]
pub struct SnapshotHolder {
	current: RwLock<Option<Arc<Snapshot>>>,
}
impl SnapshotHolder {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn current(&self) -> Option<Arc<Snapshot>> {
		self.current.read().await.clone()
	}

	pub async fn swap(&self, snapshot: Arc<Snapshot>) {
		*self.current.write().await = Some(snapshot);
	}
}

/// On-disk snapshot store. Writes go through a bounded lock and land via a
/// temp file rename so readers never observe a torn document.
pub struct SnapshotStore {
	path: PathBuf,
	write_lock: Mutex<()>,
	write_lock_timeout: Duration,
}
impl SnapshotStore {
	pub fn new(cfg: &petal_config::Catalog) -> Self {
		Self {
			path: cfg.snapshot_path.clone(),
			write_lock: Mutex::new(()),
			write_lock_timeout: Duration::from_millis(cfg.write_lock_timeout_ms),
		}
	}

	/// `None` when no snapshot has been written yet.
	pub async fn load(&self) -> Result<Option<Snapshot>> {
		let raw = match fs::read_to_string(&self.path).await {
			Ok(raw) => raw,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(err) => return Err(Error::Read { path: self.path.clone(), source: err }),
		};
		let snapshot = serde_json::from_str(&raw)
			.map_err(|err| Error::Parse { path: self.path.clone(), source: err })?;

		Ok(Some(snapshot))
	}

	pub async fn store(&self, snapshot: &Snapshot) -> Result<()> {
		let _guard = timeout(self.write_lock_timeout, self.write_lock.lock())
			.await
			.map_err(|_| Error::LockTimeout { resource: "snapshot write" })?;
		let raw = serde_json::to_string(snapshot)
			.map_err(|err| Error::Serialize { what: "catalog snapshot", source: err })?;
		let tmp = self.path.with_extension("json.tmp");

		fs::write(&tmp, raw)
			.await
			.map_err(|err| Error::Write { path: tmp.clone(), source: err })?;
		fs::rename(&tmp, &self.path)
			.await
			.map_err(|err| Error::Write { path: self.path.clone(), source: err })?;

		Ok(())
	}
}
