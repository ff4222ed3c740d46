pub mod chat;
pub mod intent;
pub mod refresh;
pub mod resolve;
pub mod search;

mod error;

pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use petal_config::{Catalog, Config, EmbeddingProviderConfig, IntentProviderConfig};
use petal_domain::product::ProductInput;
use petal_providers::{catalog, embedding, intent as intent_provider};
use petal_storage::{
	cache::TtlCache,
	precomputed::PrecomputedTable,
	quota::QuotaCounter,
	rate_limit::RateLimiter,
	snapshot::{SnapshotHolder, SnapshotStore},
};

pub use chat::{ChatRequest, ChatResponse};
pub use search::{RankedProduct, SearchOutcome};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait IntentProvider
where
	Self: Send + Sync,
{
	fn classify<'a>(
		&'a self,
		cfg: &'a IntentProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

pub trait CatalogSource
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, cfg: &'a Catalog) -> BoxFuture<'a, color_eyre::Result<Vec<ProductInput>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub intent: Arc<dyn IntentProvider>,
	pub catalog: Arc<dyn CatalogSource>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		intent: Arc<dyn IntentProvider>,
		catalog: Arc<dyn CatalogSource>,
	) -> Self {
		Self { embedding, intent, catalog }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), intent: provider.clone(), catalog: provider }
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl IntentProvider for DefaultProviders {
	fn classify<'a>(
		&'a self,
		cfg: &'a IntentProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(intent_provider::classify(cfg, messages))
	}
}

impl CatalogSource for DefaultProviders {
	fn fetch<'a>(&'a self, cfg: &'a Catalog) -> BoxFuture<'a, color_eyre::Result<Vec<ProductInput>>> {
		Box::pin(catalog::fetch(cfg))
	}
}

/// The search backend: owns the catalog snapshot, the caches and budget
/// trackers, and the provider seams.
pub struct PetalService {
	pub cfg: Config,
	pub providers: Providers,
	snapshot: SnapshotStore,
	holder: SnapshotHolder,
	embedding_cache: TtlCache<Vec<f32>>,
	response_cache: TtlCache<ChatResponse>,
	quota: QuotaCounter,
	rate_limiter: RateLimiter,
	precomputed: PrecomputedTable,
}
impl PetalService {
	pub fn new(cfg: Config, providers: Providers) -> Result<Self> {
		let precomputed = match cfg.precomputed.path.as_deref() {
			Some(path) => PrecomputedTable::load(path, cfg.providers.embedding.dimensions)?,
			None => PrecomputedTable::empty(),
		};
		let snapshot = SnapshotStore::new(&cfg.catalog);
		let quota = QuotaCounter::new(&cfg.quota);
		let rate_limiter = RateLimiter::new(&cfg.rate_limit);

		Ok(Self {
			cfg,
			providers,
			snapshot,
			holder: SnapshotHolder::new(),
			embedding_cache: TtlCache::new(),
			response_cache: TtlCache::new(),
			quota,
			rate_limiter,
			precomputed,
		})
	}
}
