//! Read-through response cache with per-entry time-to-live.
//!
//! Entries live in a [`KeyValueStore`] under a fixed namespace prefix as
//! `{"data": <value>, "expiry": <unix millis>}`. Expired or undecodable entries are evicted
//! lazily when read. Nothing is invalidated on write; callers remove keys after mutating the
//! underlying resource.

// self
use crate::{
	_prelude::*,
	obs,
	store::{KeyValueStore, StoreError},
};

/// Namespace prefix prepended to every cache key.
pub const CACHE_PREFIX: &str = "api_cache_";
/// Time-to-live applied by [`ResponseCache::cached_fetch_default`].
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
	data: T,
	expiry: i64,
}

/// TTL cache over a key/value store.
#[derive(Clone)]
pub struct ResponseCache {
	storage: Arc<dyn KeyValueStore>,
	prefix: String,
}
impl ResponseCache {
	/// Creates a cache using [`CACHE_PREFIX`].
	pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
		Self::with_prefix(storage, CACHE_PREFIX)
	}

	/// Creates a cache with a custom namespace prefix.
	pub fn with_prefix(storage: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
		Self { storage, prefix: prefix.into() }
	}

	/// Returns the cached value when present and unexpired.
	///
	/// Expired and undecodable entries are removed; storage failures read as a miss.
	pub fn get<T>(&self, key: &str) -> Option<T>
	where
		T: DeserializeOwned,
	{
		let slot = self.slot(key);
		let raw = match self.storage.get(&slot) {
			Ok(raw) => raw?,
			Err(e) => {
				obs::log_storage_issue("cache.get", &e);

				return None;
			},
		};

		match serde_json::from_str::<CacheEntry<T>>(&raw) {
			Ok(entry) if now_millis() <= entry.expiry => Some(entry.data),
			_ => {
				self.evict(&slot);

				None
			},
		}
	}

	/// Stores `data` until `ttl` from now.
	pub fn set<T>(&self, key: &str, data: &T, ttl: Duration) -> Result<(), StoreError>
	where
		T: ?Sized + Serialize,
	{
		let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
		let entry = CacheEntry { data, expiry: now_millis().saturating_add(ttl_ms) };
		let raw = serde_json::to_string(&entry).map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode cache entry `{key}`: {e}"),
		})?;

		self.storage.set(&self.slot(key), raw)
	}

	/// Drops one entry.
	pub fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.storage.remove(&self.slot(key))
	}

	/// Drops every entry under this cache's prefix; other keys are untouched.
	pub fn clear(&self) -> Result<(), StoreError> {
		for key in self.storage.keys()? {
			if key.starts_with(&self.prefix) {
				self.storage.remove(&key)?;
			}
		}

		Ok(())
	}

	/// Returns the cached value for `key` or runs `producer` and caches its result for `ttl`.
	///
	/// Producer errors are returned uncached. A failed cache write is logged and the freshly
	/// produced value is still returned.
	pub async fn cached_fetch<T, F, Fut>(&self, key: &str, producer: F, ttl: Duration) -> Result<T>
	where
		T: Serialize + DeserializeOwned,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		if let Some(hit) = self.get(key) {
			return Ok(hit);
		}

		let data = producer().await?;

		if let Err(e) = self.set(key, &data, ttl) {
			obs::log_storage_issue("cache.set", &e);
		}

		Ok(data)
	}

	/// [`ResponseCache::cached_fetch`] with [`DEFAULT_TTL`].
	pub async fn cached_fetch_default<T, F, Fut>(&self, key: &str, producer: F) -> Result<T>
	where
		T: Serialize + DeserializeOwned,
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T>>,
	{
		self.cached_fetch(key, producer, DEFAULT_TTL).await
	}

	fn slot(&self, key: &str) -> String {
		format!("{}{key}", self.prefix)
	}

	fn evict(&self, slot: &str) {
		if let Err(e) = self.storage.remove(slot) {
			obs::log_storage_issue("cache.evict", &e);
		}
	}
}
impl Debug for ResponseCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResponseCache").field("prefix", &self.prefix).finish_non_exhaustive()
	}
}

fn now_millis() -> i64 {
	(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::store::MemoryStore;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Payload {
		v: u32,
	}

	fn cache() -> (ResponseCache, Arc<MemoryStore>) {
		let storage = Arc::new(MemoryStore::default());

		(ResponseCache::new(storage.clone()), storage)
	}

	#[tokio::test]
	async fn entries_expire_after_their_ttl() {
		let (cache, storage) = cache();

		cache.set("x", &Payload { v: 1 }, Duration::from_millis(10)).expect("Set should succeed.");

		assert_eq!(cache.get::<Payload>("x"), Some(Payload { v: 1 }));

		tokio::time::sleep(Duration::from_millis(20)).await;

		assert_eq!(cache.get::<Payload>("x"), None);
		assert!(storage.is_empty(), "Expired entries should be evicted on read.");
	}

	#[tokio::test]
	async fn cached_fetch_runs_the_producer_once_per_ttl() {
		let (cache, _) = cache();
		let counter = AtomicUsize::new(0);
		let calls = &counter;
		let produce = move || async move {
			calls.fetch_add(1, Ordering::SeqCst);

			Ok(Payload { v: 7 })
		};
		let ttl = Duration::from_millis(40);

		for _ in 0..2 {
			let value = cache.cached_fetch("k", produce, ttl).await.expect("Fetch should succeed.");

			assert_eq!(value, Payload { v: 7 });
		}

		assert_eq!(calls.load(Ordering::SeqCst), 1);

		tokio::time::sleep(Duration::from_millis(60)).await;
		cache.cached_fetch("k", produce, ttl).await.expect("Fetch should succeed.");

		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn producer_errors_are_not_cached() {
		let (cache, storage) = cache();
		let err = cache
			.cached_fetch::<Payload, _, _>(
				"k",
				|| async { Err(Error::SessionExpired) },
				Duration::from_secs(60),
			)
			.await
			.expect_err("Producer failures should propagate.");

		assert!(err.is_session_expired());
		assert!(storage.is_empty());
	}

	#[test]
	fn clear_only_touches_prefixed_keys_and_corrupt_entries_are_evicted() {
		let (cache, storage) = cache();

		storage.set("theme", "dark".into()).expect("Raw writes should succeed.");
		storage.set("api_cache_broken", "{oops".into()).expect("Raw writes should succeed.");
		cache.set("a", &1, Duration::from_secs(60)).expect("Set should succeed.");

		assert_eq!(cache.get::<u32>("broken"), None);
		assert_eq!(storage.get("api_cache_broken").expect("Reads should succeed."), None);

		cache.clear().expect("Clear should succeed.");

		assert_eq!(cache.get::<u32>("a"), None);
		assert_eq!(storage.get("theme").expect("Reads should succeed."), Some("dark".into()));
	}
}
