//! Typed storefront and admin API client: resource wrappers over a REST catalog backend, a
//! session-aware request pipeline (CSRF, bearer tokens, refresh-on-expiry, retry-on-401,
//! 429 backoff, request pacing), a TTL response cache, and persisted client state.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod obs;
pub mod rate_limit;
pub mod router;
pub mod session;
pub mod state;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	use crate::{
		client::ApiClient,
		config::ClientConfig,
		http::{ApiResponse, HttpTransport, Method, PreparedRequest, TransportFuture},
		session::Session,
		store::{KeyValueStore, MemoryStore},
	};

	/// Builds an unsigned JWT-shaped token whose payload carries the provided `exp` claim.
	pub fn unsigned_jwt(exp: i64) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"));

		format!("{header}.{payload}.signature")
	}

	/// Returns an unsigned token that expires one hour from now.
	pub fn fresh_jwt() -> String {
		unsigned_jwt(OffsetDateTime::now_utc().unix_timestamp() + 3_600)
	}

	/// Returns an unsigned token that expired one hour ago.
	pub fn stale_jwt() -> String {
		unsigned_jwt(OffsetDateTime::now_utc().unix_timestamp() - 3_600)
	}

	/// Canned response produced by [`StubTransport`].
	#[derive(Clone, Debug)]
	pub struct StubReply {
		/// HTTP status code.
		pub status: u16,
		/// Raw body bytes.
		pub body: Vec<u8>,
	}
	impl StubReply {
		/// Builds a JSON reply.
		pub fn json(status: u16, body: serde_json::Value) -> Self {
			Self { status, body: body.to_string().into_bytes() }
		}

		/// Builds a reply without a body.
		pub fn empty(status: u16) -> Self {
			Self { status, body: Vec::new() }
		}
	}

	/// Scripted in-process transport keyed by `METHOD path`.
	///
	/// Replies are consumed front to back; the last reply for a route repeats forever.
	#[derive(Clone, Default)]
	pub struct StubTransport {
		routes: Arc<Mutex<HashMap<String, Vec<StubReply>>>>,
		log: Arc<Mutex<Vec<PreparedRequest>>>,
	}
	impl StubTransport {
		/// Queues a reply for the provided method + path.
		pub fn reply(&self, method: Method, path: &str, reply: StubReply) -> &Self {
			self.routes.lock().entry(format!("{method} {path}")).or_default().push(reply);

			self
		}

		/// Returns every request dispatched so far.
		pub fn requests(&self) -> Vec<PreparedRequest> {
			self.log.lock().clone()
		}

		/// Returns the dispatched requests whose URL path equals `path`.
		pub fn requests_to(&self, path: &str) -> Vec<PreparedRequest> {
			self.log.lock().iter().filter(|req| req.url.path() == path).cloned().collect()
		}
	}
	impl HttpTransport for StubTransport {
		fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
			Box::pin(async move {
				let key = format!("{} {}", request.method, request.url.path());
				let reply = {
					let mut routes = self.routes.lock();

					match routes.get_mut(&key) {
						Some(queue) if queue.len() > 1 => queue.remove(0),
						Some(queue) if !queue.is_empty() => queue[0].clone(),
						_ => StubReply::json(404, serde_json::json!({ "detail": "Not found." })),
					}
				};
				let url = request.url.clone();

				self.log.lock().push(request);

				Ok(ApiResponse::new(reply.status, url).with_body(reply.body))
			})
		}
	}

	/// Builds a client over `transport` with an in-memory session and zero pacing delay.
	pub fn stub_client(transport: StubTransport) -> (ApiClient, Arc<Session>) {
		let config = ClientConfig::builder()
			.base_url(Url::parse("http://storefront.test/api/").expect("Stub base URL is valid."))
			.min_request_interval(Duration::ZERO)
			.retry_base_delay(Duration::from_millis(1))
			.build();
		let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
		let session = Arc::new(Session::new(storage, &config));
		let client = ApiClient::with_transport(config, session.clone(), Arc::new(transport));

		(client, session)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
