use std::collections::HashMap;

use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Derives a stable cache key from a namespace and free-form text.
pub fn cache_key(namespace: &str, text: &str) -> String {
	format!("{namespace}_{}", blake3::hash(text.trim().to_lowercase().as_bytes()).to_hex())
}

struct Entry<V> {
	value: V,
	expires_at: i64,
}

/// In-process TTL cache. Expired entries are dropped lazily on access.
pub struct TtlCache<V> {
	entries: Mutex<HashMap<String, Entry<V>>>,
}
impl<V> TtlCache<V>
where
	V: Clone,
{
	pub fn new() -> Self {
		Self { entries: Mutex::new(HashMap::new()) }
	}

	pub async fn get(&self, key: &str) -> Option<V> {
		self.get_at(key, OffsetDateTime::now_utc().unix_timestamp()).await
	}

	pub async fn put(&self, key: &str, value: V, ttl_seconds: u64) {
		self.put_at(key, value, ttl_seconds, OffsetDateTime::now_utc().unix_timestamp()).await;
	}

	async fn get_at(&self, key: &str, now: i64) -> Option<V> {
		let mut entries = self.entries.lock().await;

		match entries.get(key) {
			Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
			Some(_) => {
				entries.remove(key);

				None
			},
			None => None,
		}
	}

	async fn put_at(&self, key: &str, value: V, ttl_seconds: u64, now: i64) {
		let mut entries = self.entries.lock().await;

		// Writes also sweep, so keys that are never read again still leave.
		entries.retain(|_, entry| entry.expires_at > now);
		entries.insert(key.to_string(), Entry { value, expires_at: now + ttl_seconds as i64 });
	}
}
impl<V> Default for TtlCache<V>
where
	V: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn key_is_stable_under_case_and_whitespace() {
		assert_eq!(cache_key("embed", "  Vegan Serum "), cache_key("embed", "vegan serum"));
		assert_ne!(cache_key("embed", "vegan serum"), cache_key("response", "vegan serum"));
	}

	#[tokio::test]
	async fn returns_value_before_expiry() {
		let cache = TtlCache::new();

		cache.put_at("k", vec![1.0_f32], 60, 1_000).await;

		assert_eq!(cache.get_at("k", 1_030).await, Some(vec![1.0]));
	}

	#[tokio::test]
	async fn drops_value_after_expiry() {
		let cache = TtlCache::new();

		cache.put_at("k", vec![1.0_f32], 60, 1_000).await;

		assert_eq!(cache.get_at("k", 1_060).await, None);
		assert_eq!(cache.get_at("k", 1_030).await, None);
	}

	#[tokio::test]
	async fn writes_sweep_expired_entries() {
		let cache = TtlCache::new();

		cache.put_at("old", vec![1.0_f32], 60, 1_000).await;
		cache.put_at("new", vec![2.0_f32], 60, 1_100).await;

		let entries = cache.entries.lock().await;

		assert_eq!(entries.len(), 1);
		assert!(entries.contains_key("new"));
	}
}
