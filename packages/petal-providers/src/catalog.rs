use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use petal_domain::product::ProductInput;

/// Downloads the raw product feed. Field-level validation happens later in
/// the refresh path; this only insists on the feed being a JSON array.
pub async fn fetch(cfg: &petal_config::Catalog) -> Result<Vec<ProductInput>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.fetch_timeout_ms)).build()?;
	let res = client.get(&cfg.feed_url).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_feed(json)
}

fn parse_feed(json: Value) -> Result<Vec<ProductInput>> {
	let items = json
		.get("products")
		.cloned()
		.unwrap_or(json);
	let items = items
		.as_array()
		.ok_or_else(|| eyre::eyre!("Product feed is not a JSON array."))?;

	items
		.iter()
		.map(|item| {
			serde_json::from_value(item.clone())
				.map_err(|err| eyre::eyre!("Product feed record is malformed: {err}."))
		})
		.collect()
}
