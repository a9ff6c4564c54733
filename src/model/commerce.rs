//! Orders, reviews and cart lines.

// self
use crate::{
	_prelude::*,
	model::{Product, Related, User},
};

/// Line of an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
	/// Product id.
	pub product: i64,
	/// Ordered quantity.
	pub quantity: u32,
	/// Unit price at order time.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub price: Option<f64>,
}

/// Customer order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Primary key; absent before creation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<i64>,
	/// Order lines.
	pub items: Vec<OrderItem>,
	/// Order total.
	pub total: f64,
	/// Free-form shipping address document.
	#[serde(default)]
	pub shipping_address: serde_json::Value,
	/// Server-side status.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	/// Creation timestamp as sent by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<String>,
}

/// Product review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
	/// Primary key; absent before creation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<i64>,
	/// Author.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user: Option<Related<User>>,
	/// Reviewed product id.
	pub product: i64,
	/// Rating from 1 to 5.
	pub rating: u8,
	/// Headline.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	/// Body.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub body: Option<String>,
	/// Creation timestamp as sent by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<String>,
}

/// Cart line kept in persistent client storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
	/// Product snapshot taken when the line was added.
	pub product: Product,
	/// Quantity, at least 1.
	pub quantity: u32,
	/// Options chosen for the line.
	#[serde(rename = "selectedOptions", default, skip_serializing_if = "BTreeMap::is_empty")]
	pub selected_options: BTreeMap<String, serde_json::Value>,
}
impl CartItem {
	/// Line total; products without a price count as zero.
	pub fn line_total(&self) -> f64 {
		self.product.price.unwrap_or(0.) * f64::from(self.quantity)
	}
}
