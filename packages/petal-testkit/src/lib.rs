mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
};

use serde_json::Map;
use uuid::Uuid;

use petal_config::{
	Cache, Catalog, Config, EmbeddingProviderConfig, IntentProviderConfig, Precomputed, Providers,
	Quota, Ranking, RateLimit, Search, Service,
};
use petal_domain::product::Product;

/// Unique scratch directory removed on drop.
pub struct TestDir {
	path: PathBuf,
	cleaned: bool,
}
impl TestDir {
	pub fn new() -> Result<Self> {
		let path = env::temp_dir().join(format!("petal_test_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&path)?;

		Ok(Self { path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn file(&self, name: &str) -> PathBuf {
		self.path.join(name)
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		fs::remove_dir_all(&self.path)?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDir {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Test directory cleanup failed: {err}.");
		}
	}
}

/// A full config pointing at the given scratch directory, with dummy
/// provider endpoints and a 3-dimensional embedding space.
pub fn test_config(dir: &TestDir) -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		catalog: Catalog {
			snapshot_path: dir.file("catalog.json"),
			feed_url: "http://localhost/products.json".to_string(),
			base_url: "https://www.example-beauty.com".to_string(),
			fetch_timeout_ms: 1_000,
			max_products: 1_000,
			max_name_chars: 250,
			max_description_chars: 500,
			max_url_chars: 500,
			refresh_ttl_seconds: 21_600,
			write_lock_timeout_ms: 20_000,
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "embed-test".to_string(),
				dimensions: 3,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			intent: IntentProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "intent-test".to_string(),
				temperature: 0.2,
				timeout_ms: 1_000,
				max_history_turns: 3,
				default_headers: Map::new(),
			},
		},
		search: Search::default(),
		ranking: Ranking::default(),
		cache: Cache::default(),
		quota: Quota::default(),
		rate_limit: RateLimit::default(),
		precomputed: Precomputed::default(),
	}
}

/// Catalog entry with an already-attached embedding.
pub fn product_with_embedding(name: &str, description: &str, embedding: Vec<f32>) -> Product {
	Product {
		name: name.to_string(),
		description: description.to_string(),
		brand: None,
		category: None,
		price: None,
		image: None,
		url: None,
		embedding: Some(embedding),
	}
}

/// Catalog entry with no embedding, for keyword-fallback paths.
pub fn product_without_embedding(name: &str, description: &str) -> Product {
	Product {
		name: name.to_string(),
		description: description.to_string(),
		brand: None,
		category: None,
		price: None,
		image: None,
		url: None,
		embedding: None,
	}
}
