//! Walks through a storefront session against a mock API: browse the catalog through the
//! response cache, sign in as an admin, survive an expired access token, and fill a cart.

// std
use std::{collections::BTreeMap, sync::Arc, time::Duration};
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use storefront_client::{
	auth::AuthState,
	cache::ResponseCache,
	client::ApiClient,
	config::ClientConfig,
	model::{Paginated, Product, ProductFilters},
	router::{Navigation, Router},
	session::SessionEvent,
	state::Cart,
	store::{KeyValueStore, MemoryStore},
	url::Url,
};

fn demo_jwt(offset_secs: i64) -> String {
	let exp = time::OffsetDateTime::now_utc().unix_timestamp() + offset_secs;
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"));

	format!("{header}.{payload}.demo")
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let stale = demo_jwt(-60);
	let fresh = demo_jwt(3_600);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/products/");
			then.status(200).json_body(json!({
				"count": 1,
				"results": [{
					"id": 1,
					"name": "Pendant lamp",
					"slug": "pendant-lamp",
					"price": "129.00",
					"category": 4
				}]
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/admin/auth/me/");
			then.status(401).json_body(json!({ "detail": "Not authenticated." }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/admin/auth/login/");
			then.status(200).json_body(json!({
				"user": { "id": 1, "username": "admin", "first_name": "Demo", "is_staff": true },
				"access": stale,
				"refresh": "demo-refresh"
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/admin/auth/refresh/");
			then.status(200).json_body(json!({ "access": fresh }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/admin/stats/");
			then.status(200).json_body(json!({ "products": 1, "messages": 0 }));
		})
		.await;

	let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
	let config = ClientConfig::builder()
		.base_url(Url::parse(&server.url("/api/"))?)
		.min_request_interval(Duration::from_millis(20))
		.build();
	let client = ApiClient::new(config, storage.clone())?;

	client.session().subscribe(|event: &SessionEvent| println!("Session event: {event:?}."));

	let cache = ResponseCache::new(storage.clone());
	let filters = &ProductFilters::default();
	let products = client.products();

	for round in 1..=2 {
		let page: Paginated<Product> = cache
			.cached_fetch_default("products:all", move || async move {
				products.list(filters).await
			})
			.await?;

		println!("Round {round}: {} product(s), first is {}.", page.count, page.results[0].name);
	}

	let auth = AuthState::new(client.clone());
	let router = Router::default();

	if let Navigation::Redirect(to) = router.guard("/admin/products", &auth).await {
		println!("Anonymous visit redirected to {to}.");
	}

	auth.login("admin", "demo-password").await?;

	let stats = client.admin().stats().await?;

	println!("Signed in as {}; dashboard says {stats}.", auth.full_name());
	println!("Refresh counters: {:?}.", client.refresh_metrics.snapshot());

	let cart = Cart::load(storage);
	let lamp = products.list(filters).await?.results.remove(0);

	cart.add(lamp.clone(), 2, BTreeMap::new())?;
	cart.add(lamp, 1, BTreeMap::new())?;

	println!("Cart holds {} item(s) worth {:.2}.", cart.total_quantity(), cart.subtotal());

	auth.logout().await;

	Ok(())
}
