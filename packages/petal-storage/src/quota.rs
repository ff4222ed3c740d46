use std::time::Duration;

use time::OffsetDateTime;
use tokio::{sync::Mutex, time::timeout};
use tracing::warn;

struct DayCount {
	day: i32,
	used: u32,
}

/// Daily counter for outbound provider calls. The counter resets on the UTC
/// day boundary and fails open: a lock that cannot be acquired within the
/// configured bound neither blocks nor counts the call.
pub struct QuotaCounter {
	daily_limit: u32,
	lock_timeout: Duration,
	state: Mutex<DayCount>,
}
impl QuotaCounter {
	pub fn new(cfg: &petal_config::Quota) -> Self {
		Self {
			daily_limit: cfg.daily_limit,
			lock_timeout: Duration::from_millis(cfg.lock_timeout_ms),
			state: Mutex::new(DayCount { day: current_day(), used: 0 }),
		}
	}

	/// True when today's budget is spent. Fail-open on lock contention.
	pub async fn is_exhausted(&self) -> bool {
		self.is_exhausted_at(current_day()).await
	}

	/// Counts one outbound call. Call this before the request goes out.
	pub async fn record_call(&self) {
		self.record_call_at(current_day()).await;
	}

	async fn is_exhausted_at(&self, day: i32) -> bool {
		let Ok(state) = timeout(self.lock_timeout, self.state.lock()).await else {
			warn!("Quota lock timed out during check, allowing the call.");

			return false;
		};

		state.day == day && state.used >= self.daily_limit
	}

	async fn record_call_at(&self, day: i32) {
		let Ok(mut state) = timeout(self.lock_timeout, self.state.lock()).await else {
			warn!("Quota lock timed out during increment, call not counted.");

			return;
		};

		if state.day != day {
			state.day = day;
			state.used = 0;
		}

		state.used += 1;
	}
}

fn current_day() -> i32 {
	OffsetDateTime::now_utc().date().to_julian_day()
}

#[cfg(test)]
mod tests {
	use petal_config::Quota;

	use super::*;

	fn counter(daily_limit: u32) -> QuotaCounter {
		QuotaCounter::new(&Quota { daily_limit, lock_timeout_ms: 5_000 })
	}

	#[tokio::test]
	async fn exhausts_at_the_limit() {
		let quota = counter(2);

		assert!(!quota.is_exhausted_at(1).await);

		quota.record_call_at(1).await;
		quota.record_call_at(1).await;

		assert!(quota.is_exhausted_at(1).await);
	}

	#[tokio::test]
	async fn resets_on_day_rollover() {
		let quota = counter(1);

		quota.record_call_at(1).await;

		assert!(quota.is_exhausted_at(1).await);
		assert!(!quota.is_exhausted_at(2).await);

		quota.record_call_at(2).await;

		assert!(quota.is_exhausted_at(2).await);
	}
}
