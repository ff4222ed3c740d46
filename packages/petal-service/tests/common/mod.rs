use std::sync::Arc;

use serde_json::Value;

use petal_config::{Catalog, Config, EmbeddingProviderConfig, IntentProviderConfig};
use petal_domain::product::ProductInput;
use petal_service::{
	BoxFuture, CatalogSource, EmbeddingProvider, IntentProvider, PetalService, Providers,
};
use petal_testkit::{TestDir, test_config};

pub struct FixedEmbedding(pub Option<Vec<f32>>);
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let fixed = self.0.clone();

		Box::pin(async move {
			match fixed {
				Some(vector) => Ok(vec![vector; texts.len()]),
				None => Err(color_eyre::eyre::eyre!("embedding service unavailable")),
			}
		})
	}
}

pub struct FixedIntent(pub Value);
impl IntentProvider for FixedIntent {
	fn classify<'a>(
		&'a self,
		_cfg: &'a IntentProviderConfig,
		_messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		let fixed = self.0.clone();

		Box::pin(async move { Ok(fixed) })
	}
}

pub struct FailingIntent;
impl IntentProvider for FailingIntent {
	fn classify<'a>(
		&'a self,
		_cfg: &'a IntentProviderConfig,
		_messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(async { Err(color_eyre::eyre::eyre!("intent service unavailable")) })
	}
}

pub struct StaticCatalog(pub Vec<ProductInput>);
impl CatalogSource for StaticCatalog {
	fn fetch<'a>(&'a self, _cfg: &'a Catalog) -> BoxFuture<'a, color_eyre::Result<Vec<ProductInput>>> {
		let feed = self.0.clone();

		Box::pin(async move { Ok(feed) })
	}
}

pub fn input(name: &str, description: &str, embedding: Option<Vec<f32>>) -> ProductInput {
	ProductInput {
		name: name.to_string(),
		description: description.to_string(),
		embedding,
		..Default::default()
	}
}

pub fn service_with(
	dir: &TestDir,
	mutate: impl FnOnce(&mut Config),
	embedding: FixedEmbedding,
	intent: Arc<dyn IntentProvider>,
	feed: Vec<ProductInput>,
) -> PetalService {
	let mut cfg = test_config(dir);

	mutate(&mut cfg);

	let providers =
		Providers::new(Arc::new(embedding), intent, Arc::new(StaticCatalog(feed)));

	PetalService::new(cfg, providers).expect("service construction failed")
}
