//! Order and review endpoints.

// self
use crate::{
	_prelude::*,
	api,
	client::{ApiClient, ApiRequest},
	error::ValidationError,
	model::{Order, PageQuery, Paginated, Review},
};

/// `/orders/` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Orders<'a> {
	pub(crate) client: &'a ApiClient,
}
impl Orders<'_> {
	/// Places an order; at least one line is required.
	pub async fn create(&self, order: &Order) -> Result<Order> {
		if order.items.is_empty() {
			return Err(ValidationError::EmptyField { field: "items" }.into());
		}

		for item in &order.items {
			api::ensure_id("product", item.product)?;
		}

		self.client.fetch(ApiRequest::post("/orders/").json(order)?).await
	}

	/// Fetches one order.
	pub async fn by_id(&self, id: i64) -> Result<Order> {
		self.client.get_json(&format!("/orders/{}/", api::ensure_id("order", id)?)).await
	}

	/// Lists orders.
	pub async fn list(&self, page: PageQuery) -> Result<Paginated<Order>> {
		self.client.fetch(ApiRequest::get("/orders/").query_from(&page)?).await
	}
}

/// Review endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Reviews<'a> {
	pub(crate) client: &'a ApiClient,
}
impl Reviews<'_> {
	/// Lists a product's reviews.
	pub async fn list_by_product(
		&self,
		product_id: i64,
		page: PageQuery,
	) -> Result<Paginated<Review>> {
		let path = format!("/products/{}/reviews/", api::ensure_id("product", product_id)?);

		self.client.fetch(ApiRequest::get(path).query_from(&page)?).await
	}

	/// Posts a review for `review.product`; the rating must be between 1 and 5.
	pub async fn create(&self, review: &Review) -> Result<Review> {
		let product = api::ensure_id("product", review.product)?;

		if !(1..=5).contains(&review.rating) {
			return Err(ValidationError::OutOfRange {
				field: "rating",
				value: i64::from(review.rating),
				min: 1,
				max: 5,
			}
			.into());
		}

		let path = format!("/products/{product}/reviews/");

		self.client.fetch(ApiRequest::post(path).json(review)?).await
	}

	/// Fetches one review.
	pub async fn get(&self, id: i64) -> Result<Review> {
		self.client.get_json(&format!("/reviews/{}/", api::ensure_id("review", id)?)).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, http::Method, model::OrderItem};

	fn review(rating: u8) -> Review {
		Review {
			id: None,
			user: None,
			product: 12,
			rating,
			title: None,
			body: Some("Bright and quiet.".into()),
			created_at: None,
		}
	}

	#[tokio::test]
	async fn review_ratings_are_bounded() {
		let transport = StubTransport::default();
		let (client, _) = stub_client(transport.clone());

		for rating in [0, 6] {
			let err = client.reviews().create(&review(rating)).await.expect_err("Out of range.");

			assert!(matches!(
				err,
				Error::Validation(ValidationError::OutOfRange { field: "rating", .. })
			));
		}

		assert!(transport.requests().is_empty());

		transport.reply(
			Method::Post,
			"/api/products/12/reviews/",
			StubReply::json(201, serde_json::json!({ "id": 5, "product": 12, "rating": 4 })),
		);

		let created = client.reviews().create(&review(4)).await.expect("Review should be posted.");

		assert_eq!(created.id, Some(5));
	}

	#[tokio::test]
	async fn empty_orders_are_rejected() {
		let transport = StubTransport::default();
		let (client, _) = stub_client(transport.clone());
		let mut order = Order {
			id: None,
			items: Vec::new(),
			total: 0.,
			shipping_address: serde_json::json!({ "city": "Tashkent" }),
			status: None,
			created_at: None,
		};

		assert!(client.orders().create(&order).await.is_err());

		order.items.push(OrderItem { product: 3, quantity: 2, price: Some(9.5) });
		order.total = 19.;
		transport.reply(
			Method::Post,
			"/api/orders/",
			StubReply::json(
				201,
				serde_json::json!({
					"id": 41,
					"items": [{ "product": 3, "quantity": 2, "price": 9.5 }],
					"total": 19.0,
					"status": "new"
				}),
			),
		);

		let placed = client.orders().create(&order).await.expect("Order should be placed.");

		assert_eq!(placed.id, Some(41));
		assert_eq!(transport.requests().len(), 1);
	}
}
