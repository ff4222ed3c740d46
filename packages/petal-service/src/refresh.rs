use std::sync::Arc;

use tracing::{info, warn};

use petal_domain::product::{RejectCode, ingest};
use petal_storage::snapshot::Snapshot;

use crate::{Error, PetalService, Result};

impl PetalService {
	/// Wholesale catalog refresh: fetch the feed, validate record by record,
	/// cap at the configured maximum, persist a new snapshot, and swap it in
	/// for readers. Fails only when the feed is unreachable, nothing valid
	/// remains, or the snapshot cannot be written; individual bad records are
	/// counted and skipped.
	pub async fn refresh_catalog(&self) -> Result<usize> {
		let inputs = self
			.providers
			.catalog
			.fetch(&self.cfg.catalog)
			.await
			.map_err(|err| Error::Refresh { message: err.to_string() })?;
		let dimensions = self.cfg.providers.embedding.dimensions;
		let max_products = self.cfg.catalog.max_products as usize;
		let mut products = Vec::new();
		let mut missing_fields = 0_usize;
		let mut bad_embeddings = 0_usize;

		for input in inputs {
			if products.len() >= max_products {
				break;
			}

			match ingest(input, &self.cfg.catalog, dimensions) {
				Ok(product) => products.push(product),
				Err(RejectCode::RejectBadEmbedding) => bad_embeddings += 1,
				Err(_) => missing_fields += 1,
			}
		}

		if products.is_empty() {
			return Err(Error::Refresh {
				message: "No valid products remained after feed validation.".to_string(),
			});
		}

		let count = products.len();

		info!(
			"Catalog refresh kept {count} products, rejected {missing_fields} with missing fields and {bad_embeddings} with bad embeddings.",
		);

		let snapshot = Snapshot::new(products);

		self.snapshot.store(&snapshot).await?;
		self.holder.swap(Arc::new(snapshot)).await;

		Ok(count)
	}

	/// Snapshot for serving. The held snapshot is used while fresh; a stale
	/// or absent one triggers a refresh, and a stale snapshot outlives a
	/// failed refresh rather than taking search down with it.
	pub(crate) async fn current_catalog(&self) -> Result<Arc<Snapshot>> {
		let held = match self.holder.current().await {
			Some(held) => Some(held),
			// Cold start: pick up whatever the last run left on disk.
			None => match self.snapshot.load().await? {
				Some(snapshot) => {
					let snapshot = Arc::new(snapshot);

					self.holder.swap(snapshot.clone()).await;

					Some(snapshot)
				},
				None => None,
			},
		};

		match held {
			Some(snapshot) if !snapshot.is_stale(self.cfg.catalog.refresh_ttl_seconds) => {
				Ok(snapshot)
			},
			Some(stale) => match self.refresh_catalog().await {
				Ok(_) => Ok(self.holder.current().await.unwrap_or(stale)),
				Err(err) => {
					warn!("Catalog refresh failed, serving the stale snapshot: {err}.");

					Ok(stale)
				},
			},
			None => {
				self.refresh_catalog().await?;

				self.holder.current().await.ok_or_else(|| Error::Refresh {
					message: "No snapshot available after refresh.".to_string(),
				})
			},
		}
	}
}
