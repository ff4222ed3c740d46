mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Catalog, Config, EmbeddingProviderConfig, IntentProviderConfig, Precomputed, Providers,
	Quota, Ranking, RateLimit, Search, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.catalog.feed_url.trim().is_empty() {
		return Err(Error::Validation { message: "catalog.feed_url must be non-empty.".to_string() });
	}
	if cfg.catalog.base_url.trim().is_empty() {
		return Err(Error::Validation { message: "catalog.base_url must be non-empty.".to_string() });
	}
	if cfg.catalog.fetch_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "catalog.fetch_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.catalog.max_products == 0 {
		return Err(Error::Validation {
			message: "catalog.max_products must be greater than zero.".to_string(),
		});
	}
	if cfg.catalog.max_name_chars == 0 || cfg.catalog.max_description_chars == 0 {
		return Err(Error::Validation {
			message: "catalog field length limits must be greater than zero.".to_string(),
		});
	}
	if cfg.catalog.max_url_chars == 0 {
		return Err(Error::Validation {
			message: "catalog.max_url_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.catalog.refresh_ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "catalog.refresh_ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.catalog.write_lock_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "catalog.write_lock_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.search.top_k == 0 {
		return Err(Error::Validation {
			message: "search.top_k must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.base_threshold.is_finite() || !(0.0..=1.0).contains(&cfg.search.base_threshold) {
		return Err(Error::Validation {
			message: "search.base_threshold must be a finite number in the range 0.0-1.0."
				.to_string(),
		});
	}

	for (label, weight) in [
		("ranking.similarity_weight", cfg.ranking.similarity_weight),
		("ranking.text_match_weight", cfg.ranking.text_match_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number."),
			});
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	let weight_sum = cfg.ranking.similarity_weight + cfg.ranking.text_match_weight;

	if (weight_sum - 1.0).abs() > 1e-6 {
		return Err(Error::Validation {
			message: "ranking.similarity_weight and ranking.text_match_weight must sum to 1.0."
				.to_string(),
		});
	}

	if cfg.cache.query_embedding_ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "cache.query_embedding_ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.response_ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "cache.response_ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.quota.daily_limit == 0 {
		return Err(Error::Validation {
			message: "quota.daily_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.quota.lock_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "quota.lock_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.rate_limit.window_seconds == 0 {
		return Err(Error::Validation {
			message: "rate_limit.window_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.rate_limit.max_requests == 0 {
		return Err(Error::Validation {
			message: "rate_limit.max_requests must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("intent", &cfg.providers.intent.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.providers.intent.max_history_turns == 0 {
		return Err(Error::Validation {
			message: "providers.intent.max_history_turns must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.intent.temperature.is_finite() || cfg.providers.intent.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.intent.temperature must be a finite non-negative number."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if let Some(stripped) = cfg.catalog.base_url.strip_suffix('/') {
		cfg.catalog.base_url = stripped.to_string();
	}
	if cfg
		.precomputed
		.path
		.as_deref()
		.map(|path| path.as_os_str().is_empty())
		.unwrap_or(false)
	{
		cfg.precomputed.path = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base_toml() -> String {
		r#"
[service]
log_level = "info"

[catalog]
snapshot_path = "/tmp/catalog.json"
feed_url = "https://feeds.example-beauty.com/products.json"
base_url = "https://www.example-beauty.com/"

[providers.embedding]
provider_id = "p"
api_base = "http://localhost"
api_key = "key"
path = "/v1/embeddings"
model = "m"
dimensions = 3
timeout_ms = 1000

[providers.intent]
provider_id = "p"
api_base = "http://localhost"
api_key = "key"
path = "/v1/chat/completions"
model = "m"
temperature = 0.5
timeout_ms = 1000
"#
		.to_string()
	}

	#[test]
	fn defaults_fill_optional_sections() {
		let cfg: Config = toml::from_str(&base_toml()).expect("parse failed");

		assert_eq!(cfg.search.top_k, 10);
		assert_eq!(cfg.search.base_threshold, 0.4);
		assert_eq!(cfg.ranking.similarity_weight, 0.6);
		assert_eq!(cfg.ranking.text_match_weight, 0.4);
		assert_eq!(cfg.quota.daily_limit, 18_000);
		assert_eq!(cfg.rate_limit.max_requests, 15);
		assert_eq!(cfg.catalog.max_name_chars, 250);

		validate(&cfg).expect("defaults must validate");
	}

	#[test]
	fn normalize_strips_trailing_base_url_slash() {
		let mut cfg: Config = toml::from_str(&base_toml()).expect("parse failed");

		normalize(&mut cfg);

		assert_eq!(cfg.catalog.base_url, "https://www.example-beauty.com");
	}

	#[test]
	fn rejects_weights_that_do_not_sum_to_one() {
		let raw = format!("{}\n[ranking]\nsimilarity_weight = 0.6\ntext_match_weight = 0.3\n", base_toml());
		let cfg: Config = toml::from_str(&raw).expect("parse failed");

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_zero_dimensions() {
		let raw = base_toml().replace("dimensions = 3", "dimensions = 0");
		let cfg: Config = toml::from_str(&raw).expect("parse failed");

		assert!(validate(&cfg).is_err());
	}

	#[test]
	fn rejects_empty_api_key() {
		let raw = base_toml().replacen(r#"api_key = "key""#, r#"api_key = " ""#, 1);
		let cfg: Config = toml::from_str(&raw).expect("parse failed");

		assert!(validate(&cfg).is_err());
	}
}
