use tracing::warn;

use petal_storage::cache::cache_key;

use crate::PetalService;

impl PetalService {
	/// Three-tier query-embedding resolver: short-term cache, precomputed
	/// table when the daily quota is spent, live provider call otherwise.
	/// Every failure collapses to `None`, which callers must read as "use
	/// keyword fallback", never as an error.
	pub(crate) async fn resolve_embedding(&self, cleaned_query: &str) -> Option<Vec<f32>> {
		if cleaned_query.is_empty() {
			return None;
		}

		let cfg = &self.cfg.providers.embedding;
		let dimensions = cfg.dimensions as usize;
		let key = cache_key("query_embedding", &format!("{cleaned_query}|{}", cfg.model));

		if let Some(vector) = self.embedding_cache.get(&key).await
			&& vector.len() == dimensions
		{
			return Some(vector);
		}

		if self.quota.is_exhausted().await {
			warn!("Embedding quota exhausted, consulting the precomputed table.");

			let found = self.precomputed.lookup(cleaned_query).map(<[f32]>::to_vec);

			if let Some(vector) = &found {
				self.embedding_cache
					.put(&key, vector.clone(), self.cfg.cache.query_embedding_ttl_seconds)
					.await;
			}

			return found;
		}

		// Counted before the call goes out so a failure cannot undercount.
		self.quota.record_call().await;

		let texts = [cleaned_query.to_string()];

		match self.providers.embedding.embed(cfg, &texts).await {
			Ok(mut vectors) if !vectors.is_empty() => {
				let vector = vectors.swap_remove(0);

				if vector.len() != dimensions || !vector.iter().all(|value| value.is_finite()) {
					warn!("Embedding provider returned a malformed vector.");

					return None;
				}

				self.embedding_cache
					.put(&key, vector.clone(), self.cfg.cache.query_embedding_ttl_seconds)
					.await;

				Some(vector)
			},
			Ok(_) => {
				warn!("Embedding provider returned no vectors.");

				None
			},
			Err(err) => {
				warn!("Embedding call failed: {err}.");

				None
			},
		}
	}
}
