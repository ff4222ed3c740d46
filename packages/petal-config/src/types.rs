use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub catalog: Catalog,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub quota: Quota,
	#[serde(default)]
	pub rate_limit: RateLimit,
	#[serde(default)]
	pub precomputed: Precomputed,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Catalog {
	pub snapshot_path: std::path::PathBuf,
	/// JSON feed holding the raw product records, fetched on refresh.
	pub feed_url: String,
	/// Base used when normalizing relative product URLs and bare slugs.
	pub base_url: String,
	#[serde(default = "default_fetch_timeout_ms")]
	pub fetch_timeout_ms: u64,
	#[serde(default = "default_max_products")]
	pub max_products: u32,
	#[serde(default = "default_max_name_chars")]
	pub max_name_chars: u32,
	#[serde(default = "default_max_description_chars")]
	pub max_description_chars: u32,
	#[serde(default = "default_max_url_chars")]
	pub max_url_chars: u32,
	#[serde(default = "default_refresh_ttl_seconds")]
	pub refresh_ttl_seconds: u64,
	#[serde(default = "default_write_lock_timeout_ms")]
	pub write_lock_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub intent: IntentProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct IntentProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default = "default_max_history_turns")]
	pub max_history_turns: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub top_k: u32,
	/// Floor for the dynamic acceptance threshold in semantic mode.
	pub base_threshold: f32,
}
impl Default for Search {
	fn default() -> Self {
		Self { top_k: 10, base_threshold: 0.4 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ranking {
	/// Weight of cosine similarity in the semantic blend.
	pub similarity_weight: f32,
	/// Weight of the lexical name-match score in the semantic blend.
	pub text_match_weight: f32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self { similarity_weight: 0.6, text_match_weight: 0.4 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub query_embedding_ttl_seconds: u64,
	pub response_ttl_seconds: u64,
}
impl Default for Cache {
	fn default() -> Self {
		Self { query_embedding_ttl_seconds: 2_592_000, response_ttl_seconds: 86_400 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Quota {
	pub daily_limit: u32,
	pub lock_timeout_ms: u64,
}
impl Default for Quota {
	fn default() -> Self {
		Self { daily_limit: 18_000, lock_timeout_ms: 5_000 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateLimit {
	pub window_seconds: u64,
	pub max_requests: u32,
}
impl Default for RateLimit {
	fn default() -> Self {
		Self { window_seconds: 60, max_requests: 15 }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Precomputed {
	/// Optional JSON table of `{query, embedding}` entries served when the
	/// daily quota is exhausted.
	pub path: Option<std::path::PathBuf>,
}

fn default_fetch_timeout_ms() -> u64 {
	30_000
}

fn default_max_products() -> u32 {
	1_000
}

fn default_max_name_chars() -> u32 {
	250
}

fn default_max_description_chars() -> u32 {
	500
}

fn default_max_url_chars() -> u32 {
	500
}

fn default_refresh_ttl_seconds() -> u64 {
	21_600
}

fn default_write_lock_timeout_ms() -> u64 {
	20_000
}

fn default_max_history_turns() -> u32 {
	3
}
