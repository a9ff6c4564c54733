//! Key/value storage contracts and built-in backends for session and persistent client state.
//!
//! [`MemoryStore`] plays the role of session-scoped storage (dropped with the process) while
//! [`FileStore`] keeps values across restarts. Values are opaque strings; callers serialize
//! their own payloads (JSON throughout this crate).

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::_prelude::*;

/// Storage backend contract implemented by client-state stores.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	/// Returns the value stored under `key`, if present.
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

	/// Stores or replaces the value under `key`.
	fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

	/// Removes `key`; removing a missing key is not an error.
	fn remove(&self, key: &str) -> Result<(), StoreError>;

	/// Lists every key currently stored.
	fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Error type produced by [`KeyValueStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend or its callers.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Reads `key` and decodes it as JSON.
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError>
where
	T: DeserializeOwned,
{
	let Some(raw) = store.get(key)? else {
		return Ok(None);
	};

	serde_json::from_str(&raw).map(Some).map_err(|e| StoreError::Serialization {
		message: format!("Failed to parse `{key}`: {e}"),
	})
}

/// Encodes `value` as JSON and writes it under `key`.
pub fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError>
where
	T: ?Sized + Serialize,
{
	let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialization {
		message: format!("Failed to serialize `{key}`: {e}"),
	})?;

	store.set(key, raw)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn json_helpers_round_trip_and_report_corruption() {
		let store = MemoryStore::default();

		save_json(&store, "numbers", &vec![1, 2, 3]).expect("Saving JSON should succeed.");

		let loaded: Option<Vec<u8>> =
			load_json(&store, "numbers").expect("Loading JSON should succeed.");

		assert_eq!(loaded, Some(vec![1, 2, 3]));

		store.set("broken", "{not json".into()).expect("Raw writes should succeed.");

		let err = load_json::<Vec<u8>>(&store, "broken")
			.expect_err("Corrupt payloads should surface a serialization error.");

		assert!(matches!(err, StoreError::Serialization { .. }));
		assert_eq!(load_json::<Vec<u8>>(&store, "missing").expect("Missing keys are fine."), None);
	}
}
