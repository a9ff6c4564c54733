//! Cart, favorites, and comparison list.

// self
use crate::{
	_prelude::*,
	model::{CartItem, Product},
	state::PersistentState,
	store::{KeyValueStore, StoreError},
};

/// Storage key of the cart.
pub const CART_KEY: &str = "cart_items";
/// Storage key of the favorites list.
pub const FAVORITES_KEY: &str = "favorites";
/// Storage key of the comparison list.
pub const COMPARE_KEY: &str = "compare";

/// Shopping cart; one line per product.
#[derive(Debug)]
pub struct Cart(PersistentState<Vec<CartItem>>);
impl Cart {
	/// Loads the cart from `storage`.
	pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
		Self(PersistentState::load(storage, CART_KEY))
	}

	/// Underlying persisted value, for subscriptions.
	pub fn state(&self) -> &PersistentState<Vec<CartItem>> {
		&self.0
	}

	/// Current lines.
	pub fn items(&self) -> Vec<CartItem> {
		self.0.snapshot()
	}

	/// Adds `quantity` of `product`, merging with an existing line for the same product.
	///
	/// Options only apply to new lines.
	pub fn add(
		&self,
		product: Product,
		quantity: u32,
		selected_options: BTreeMap<String, serde_json::Value>,
	) -> Result<(), StoreError> {
		self.0.update(|items| {
			match items.iter().position(|item| item.product.id == product.id) {
				Some(index) => {
					let line = &mut items[index];

					line.quantity = line.quantity.saturating_add(quantity);
				},
				None => items.push(CartItem { product, quantity, selected_options }),
			}
		})
	}

	/// Drops the line for `product_id`.
	pub fn remove(&self, product_id: i64) -> Result<(), StoreError> {
		self.0.update(|items| items.retain(|item| item.product.id != product_id))
	}

	/// Sets the quantity of an existing line; values below 1 are raised to 1.
	pub fn set_quantity(&self, product_id: i64, quantity: u32) -> Result<(), StoreError> {
		self.0.update(|items| {
			if let Some(item) = items.iter_mut().find(|item| item.product.id == product_id) {
				item.quantity = quantity.max(1);
			}
		})
	}

	/// Empties the cart.
	pub fn clear(&self) -> Result<(), StoreError> {
		self.0.update(Vec::clear)
	}

	/// Sum of all line quantities.
	pub fn total_quantity(&self) -> u32 {
		self.0.snapshot().iter().map(|item| item.quantity).fold(0, u32::saturating_add)
	}

	/// Sum of all line totals.
	pub fn subtotal(&self) -> f64 {
		self.0.snapshot().iter().map(CartItem::line_total).sum()
	}
}

/// Products marked as favorites.
#[derive(Debug)]
pub struct Favorites(PersistentState<Vec<Product>>);
impl Favorites {
	/// Loads the list from `storage`.
	pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
		Self(PersistentState::load(storage, FAVORITES_KEY))
	}

	/// Current products.
	pub fn items(&self) -> Vec<Product> {
		self.0.snapshot()
	}

	/// Adds `product` if absent, removes it otherwise; returns whether it is now a favorite.
	pub fn toggle(&self, product: Product) -> Result<bool, StoreError> {
		self.0.update(|items| match items.iter().position(|item| item.id == product.id) {
			Some(index) => {
				items.remove(index);

				false
			},
			None => {
				items.push(product);

				true
			},
		})
	}

	/// Returns `true` if `product_id` is a favorite.
	pub fn is_favorite(&self, product_id: i64) -> bool {
		self.0.snapshot().iter().any(|item| item.id == product_id)
	}
}

/// Products queued for side-by-side comparison.
#[derive(Debug)]
pub struct Compare(PersistentState<Vec<Product>>);
impl Compare {
	/// Loads the list from `storage`.
	pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
		Self(PersistentState::load(storage, COMPARE_KEY))
	}

	/// Current products.
	pub fn items(&self) -> Vec<Product> {
		self.0.snapshot()
	}

	/// Adds `product` unless it is already listed.
	pub fn add(&self, product: Product) -> Result<(), StoreError> {
		self.0.update(|items| {
			if !items.iter().any(|item| item.id == product.id) {
				items.push(product);
			}
		})
	}

	/// Drops `product_id` from the list.
	pub fn remove(&self, product_id: i64) -> Result<(), StoreError> {
		self.0.update(|items| items.retain(|item| item.id != product_id))
	}

	/// Empties the list.
	pub fn clear(&self) -> Result<(), StoreError> {
		self.0.update(Vec::clear)
	}
}
