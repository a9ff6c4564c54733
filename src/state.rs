//! Client state persisted through a [`KeyValueStore`]: cart, favorites, comparison list,
//! and display preferences.

pub mod preferences;
pub mod shop;

pub use preferences::*;
pub use shop::*;

// self
use crate::{
	_prelude::*,
	obs,
	store::{self, KeyValueStore, StoreError},
};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// JSON value mirrored to one storage key.
///
/// Every [`update`](Self::update) writes the new value through and then notifies subscribers
/// with the updated snapshot.
pub struct PersistentState<T> {
	storage: Arc<dyn KeyValueStore>,
	key: String,
	value: RwLock<T>,
	listeners: RwLock<Vec<Listener<T>>>,
}
impl<T> PersistentState<T>
where
	T: Clone + Default + Serialize + DeserializeOwned,
{
	/// Reads `key`, falling back to the default when it is missing or unreadable.
	pub fn load(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
		let key = key.into();
		let value = match store::load_json(storage.as_ref(), &key) {
			Ok(value) => value.unwrap_or_default(),
			Err(e) => {
				obs::log_storage_issue("state.load", &e);

				T::default()
			},
		};

		Self { storage, key, value: RwLock::new(value), listeners: Default::default() }
	}

	/// Storage key backing this value.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Writes the current value to storage.
	pub fn save(&self) -> Result<(), StoreError> {
		store::save_json(self.storage.as_ref(), &self.key, &*self.value.read())
	}

	/// Returns a copy of the current value.
	pub fn snapshot(&self) -> T {
		self.value.read().clone()
	}

	/// Mutates the value, persists it, then notifies subscribers.
	///
	/// The in-memory value keeps the change even when persisting fails.
	pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, StoreError> {
		let (output, snapshot) = {
			let mut value = self.value.write();
			let output = f(&mut value);

			(output, value.clone())
		};
		let saved = store::save_json(self.storage.as_ref(), &self.key, &snapshot);
		let listeners = self.listeners.read().clone();

		for listener in listeners {
			listener(&snapshot);
		}

		saved.map(|_| output)
	}

	/// Registers a callback invoked after every update.
	pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) {
		self.listeners.write().push(Arc::new(listener));
	}
}
impl<T> Debug for PersistentState<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PersistentState")
			.field("key", &self.key)
			.field("value", &*self.value.read())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::MemoryStore;

	#[test]
	fn updates_are_written_through_and_announced() {
		let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
		let state = PersistentState::<Vec<u32>>::load(storage.clone(), "numbers");
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();

		state.subscribe(move |value: &Vec<u32>| sink.lock().push(value.len()));
		state.update(|numbers| numbers.push(7)).expect("Update should persist.");
		state.update(|numbers| numbers.push(8)).expect("Update should persist.");

		let reloaded = PersistentState::<Vec<u32>>::load(storage, "numbers");

		assert_eq!(reloaded.snapshot(), vec![7, 8]);
		assert_eq!(seen.lock().as_slice(), [1, 2]);
	}

	#[test]
	fn corrupt_values_fall_back_to_default() {
		let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());

		storage.set("numbers", "[1, oops".into()).expect("Raw writes should succeed.");

		let state = PersistentState::<Vec<u32>>::load(storage, "numbers");

		assert!(state.snapshot().is_empty());
	}
}
