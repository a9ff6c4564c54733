//! Global request pacing: every dispatch waits for its slot, spaced by a minimum interval.
//!
//! Slots are reserved under a lock, so concurrent callers are serialized in the order they
//! reach [`RateLimiter::wait`]; each caller is handed `previous_slot + min_interval` (or "now",
//! whichever is later) and suspends until then. Callers are never rejected.

// crates.io
use tokio::time::{self, Instant};
// self
use crate::_prelude::*;

/// Process-wide pacer shared by every request issued through a session.
#[derive(Debug)]
pub struct RateLimiter {
	min_interval: Duration,
	next_slot: Mutex<Option<Instant>>,
}
impl RateLimiter {
	/// Creates a limiter enforcing `min_interval` between dispatches.
	pub fn new(min_interval: Duration) -> Self {
		Self { min_interval, next_slot: Mutex::new(None) }
	}

	/// Minimum spacing between dispatches.
	pub fn min_interval(&self) -> Duration {
		self.min_interval
	}

	/// Suspends until the caller's dispatch slot; returns immediately when the interval has
	/// already elapsed since the previous slot.
	pub async fn wait(&self) {
		let slot = self.reserve(Instant::now());

		if slot > Instant::now() {
			time::sleep_until(slot).await;
		}
	}

	/// Reserves the next slot at or after `now` and returns it.
	fn reserve(&self, now: Instant) -> Instant {
		let mut next = self.next_slot.lock();
		let slot = match *next {
			Some(reserved) if reserved > now => reserved,
			_ => now,
		};

		*next = Some(slot + self.min_interval);

		slot
	}
}
impl Default for RateLimiter {
	fn default() -> Self {
		Self::new(Duration::ZERO)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn first_call_passes_immediately_and_followers_are_spaced() {
		let limiter = RateLimiter::new(Duration::from_millis(200));
		let start = Instant::now();

		limiter.wait().await;

		assert_eq!(Instant::now(), start);

		limiter.wait().await;
		limiter.wait().await;

		assert_eq!(Instant::now() - start, Duration::from_millis(400));
	}

	#[tokio::test(start_paused = true)]
	async fn idle_gaps_are_not_banked() {
		let limiter = RateLimiter::new(Duration::from_millis(100));

		limiter.wait().await;
		time::sleep(Duration::from_millis(500)).await;

		let before = Instant::now();

		limiter.wait().await;

		assert_eq!(Instant::now(), before);
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_callers_get_distinct_slots() {
		let limiter = Arc::new(RateLimiter::new(Duration::from_millis(50)));
		let start = Instant::now();
		let mut handles = Vec::new();

		for _ in 0..4 {
			let limiter = limiter.clone();

			handles.push(tokio::spawn(async move {
				limiter.wait().await;

				Instant::now() - start
			}));
		}

		let mut offsets = Vec::new();

		for handle in handles {
			offsets.push(handle.await.expect("Limiter task should not panic."));
		}

		offsets.sort();

		assert_eq!(
			offsets,
			vec![
				Duration::ZERO,
				Duration::from_millis(50),
				Duration::from_millis(100),
				Duration::from_millis(150)
			]
		);
	}
}
