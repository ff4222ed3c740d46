use std::collections::{HashMap, VecDeque};

use time::OffsetDateTime;
use tokio::sync::Mutex;

/// Sliding-window limiter keyed by caller identifier. A rejected request is
/// not recorded, so callers cannot push their own window forward by retrying.
pub struct RateLimiter {
	window_seconds: u64,
	max_requests: u32,
	windows: Mutex<HashMap<String, VecDeque<i64>>>,
}
impl RateLimiter {
	pub fn new(cfg: &petal_config::RateLimit) -> Self {
		Self {
			window_seconds: cfg.window_seconds,
			max_requests: cfg.max_requests,
			windows: Mutex::new(HashMap::new()),
		}
	}

	/// True when the caller is over the limit for the current window.
	pub async fn is_limited(&self, identifier: &str) -> bool {
		self.is_limited_at(identifier, OffsetDateTime::now_utc().unix_timestamp()).await
	}

	async fn is_limited_at(&self, identifier: &str, now: i64) -> bool {
		let mut windows = self.windows.lock().await;
		let window_start = now - self.window_seconds as i64;

		// Identifiers with no request left in the window are dropped outright
		// so one-off callers do not accumulate.
		windows.retain(|_, window| window.back().is_some_and(|stamp| *stamp >= window_start));

		let window = windows.entry(identifier.to_string()).or_default();

		while window.front().is_some_and(|stamp| *stamp < window_start) {
			window.pop_front();
		}

		if window.len() >= self.max_requests as usize {
			return true;
		}

		window.push_back(now);

		false
	}
}
