//! Request dispatcher for the storefront API.
//!
//! [`ApiClient`] turns an [`ApiRequest`] into a [`PreparedRequest`], runs it through the
//! ordered request stages (pacing, CSRF, bearer), hands it to the transport under the
//! configured timeout, runs the response stages (cookies, payload check), and classifies the
//! status:
//!
//! - `401` on a request that carried a bearer token triggers one refresh and one replay; a
//!   second `401` or a failed refresh ends the session. Requests built with
//!   [`ApiRequest::no_refresh`] surface the `401` as is.
//! - `429` is replayed up to [`RetryPolicy::max_retries`](crate::config::RetryPolicy) times
//!   with a linear backoff before surfacing [`Error::RateLimited`].
//! - Every other non-success status becomes [`Error::Http`].
//!
//! Replays re-enter the full stage chain, so every dispatch waits for its pacing slot.

pub mod stage;

mod refresh;

pub use refresh::*;
pub use stage::*;

// crates.io
use serde::ser::Error as _;
use tokio::time;
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::ConfigError,
	http::{ApiResponse, FilePart, HttpTransport, Method, PreparedRequest, RequestBody},
	obs::{self, CallKind, CallOutcome, CallSpan},
	session::{LogoutReason, Session},
};
#[cfg(feature = "reqwest")]
use crate::{
	http::ReqwestTransport,
	store::{KeyValueStore, MemoryStore},
};

/// Logical API call, resolved against the base URL at dispatch time.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Path below the API root, e.g. `/products/`.
	pub path: String,
	/// Query parameters in insertion order.
	pub query: Vec<(String, String)>,
	/// Request payload.
	pub body: RequestBody,
	/// Skips bearer handling (login, refresh).
	pub anonymous: bool,
	/// Waits for a pacing slot before dispatch.
	pub paced: bool,
	/// Renews an expired or rejected access token before giving up.
	pub refresh: bool,
}
impl ApiRequest {
	/// Creates a paced, authenticated request without query or body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: RequestBody::Empty,
			anonymous: false,
			paced: true,
			refresh: true,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Appends one query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Appends every field of `params` as query parameters.
	///
	/// `params` must serialize to a JSON object; `null` fields are skipped and arrays repeat
	/// the key once per element.
	pub fn query_from<T>(mut self, params: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let map = match serde_json::to_value(params).map_err(ConfigError::from)? {
			serde_json::Value::Object(map) => map,
			serde_json::Value::Null => return Ok(self),
			_ => {
				let e = serde_json::Error::custom("query parameters must serialize to an object");

				return Err(ConfigError::from(e).into());
			},
		};

		for (key, value) in map {
			match value {
				serde_json::Value::Array(items) => {
					for item in items.iter().filter_map(query_value) {
						self.query.push((key.clone(), item));
					}
				},
				value => {
					if let Some(value) = query_value(&value) {
						self.query.push((key, value));
					}
				},
			}
		}

		Ok(self)
	}

	/// Sets a JSON body.
	pub fn json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		self.body = RequestBody::Json(serde_json::to_value(body).map_err(ConfigError::from)?);

		Ok(self)
	}

	/// Sets a multipart body.
	pub fn multipart(mut self, fields: Vec<(String, String)>, files: Vec<FilePart>) -> Self {
		self.body = RequestBody::Multipart { fields, files };

		self
	}

	/// Marks the request as credential-free.
	pub fn anonymous(mut self) -> Self {
		self.anonymous = true;

		self
	}

	/// Sends the stored access token only while it is unexpired and never refreshes it.
	pub fn no_refresh(mut self) -> Self {
		self.refresh = false;

		self
	}

	/// Exempts the request from request pacing.
	pub fn unpaced(mut self) -> Self {
		self.paced = false;

		self
	}
}

/// Session-aware API client; cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
	config: Arc<ClientConfig>,
	session: Arc<Session>,
	transport: Arc<dyn HttpTransport>,
	request_stages: Arc<Vec<Arc<dyn RequestStage>>>,
	response_stages: Arc<Vec<Arc<dyn ResponseStage>>>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
}
impl ApiClient {
	/// Creates a client over a caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		session: Arc<Session>,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		Self {
			config: Arc::new(config),
			session,
			transport,
			request_stages: Arc::new(stage::default_request_stages()),
			response_stages: Arc::new(stage::default_response_stages()),
			refresh_metrics: Default::default(),
		}
	}

	/// Appends a request stage after the built-in ones.
	pub fn with_request_stage(mut self, stage: impl RequestStage + 'static) -> Self {
		Arc::make_mut(&mut self.request_stages).push(Arc::new(stage));

		self
	}

	/// Appends a response stage after the built-in ones.
	pub fn with_response_stage(mut self, stage: impl ResponseStage + 'static) -> Self {
		Arc::make_mut(&mut self.response_stages).push(Arc::new(stage));

		self
	}

	/// Active configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Session shared by every request of this client.
	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	/// Resolves a media path returned by the API into an absolute URL.
	pub fn image_url(&self, path: Option<&str>) -> String {
		self.config.image_url(path)
	}

	/// Dispatches `request` through the full pipeline and returns the raw response.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		let kind = CallKind::of_path(&request.path);
		let span = CallSpan::new(kind, "send");

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result = span.instrument(self.execute(&request, kind)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
			Err(e) => {
				obs::record_call_outcome(kind, CallOutcome::Failure);
				obs::log_call_failure(
					e.status(),
					&e.to_string(),
					&self.config.endpoint(&request.path),
				);
			},
		}

		result
	}

	/// Dispatches `request` and decodes the JSON body.
	pub async fn fetch<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.send(request).await?.json()
	}

	/// Dispatches `request` and discards the body.
	pub async fn perform(&self, request: ApiRequest) -> Result<()> {
		self.send(request).await.map(|_| ())
	}

	/// `GET`s `path` and decodes the JSON body.
	pub async fn get_json<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.fetch(ApiRequest::get(path)).await
	}

	/// Sends `body` as JSON with `method` and decodes the JSON response.
	pub async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.fetch(ApiRequest::new(method, path).json(body)?).await
	}

	async fn execute(&self, request: &ApiRequest, kind: CallKind) -> Result<ApiResponse> {
		let cx = CallContext { client: self, request, kind };
		let retry = self.config.retry;
		let mut replayed_after_refresh = false;
		let mut rate_limit_retries = 0;

		loop {
			let prepared = self.run_request_stages(self.prepare(request), &cx).await?;
			let bearer = prepared.bearer().map(str::to_owned);
			let response = self.transmit(prepared).await?;

			self.run_response_stages(&response, &cx)?;

			if response.is_success() {
				return Ok(response);
			}

			match response.status {
				401 if request.refresh && !request.anonymous && bearer.is_some() => {
					if replayed_after_refresh {
						self.session.expire(LogoutReason::Unauthorized);

						return Err(Error::SessionExpired);
					}

					self.refresh_access_token(bearer.as_deref()).await?;

					replayed_after_refresh = true;
				},
				429 if rate_limit_retries < retry.max_retries => {
					rate_limit_retries += 1;

					let delay = retry.delay_for(rate_limit_retries);

					obs::log_rate_limited(
						&response.url,
						rate_limit_retries,
						retry.max_retries,
						delay,
					);
					time::sleep(delay).await;
				},
				429 => {
					let retry_after = response.retry_after();

					return Err(Error::RateLimited {
						url: response.url,
						attempts: rate_limit_retries,
						retry_after,
					});
				},
				status => {
					let message = response.error_message();

					return Err(Error::Http { status, message, url: response.url });
				},
			}

			obs::record_call_outcome(kind, CallOutcome::Retry);
		}
	}

	fn prepare(&self, request: &ApiRequest) -> PreparedRequest {
		let mut url = self.config.endpoint(&request.path);

		if !request.query.is_empty() {
			url.query_pairs_mut().extend_pairs(request.query.iter());
		}

		let mut prepared = PreparedRequest::new(request.method, url);

		prepared.set_header("Accept", "application/json");
		prepared.set_header("Cache-Control", "no-cache");
		prepared.set_header("Pragma", "no-cache");
		prepared.body = request.body.clone();

		prepared
	}

	async fn run_request_stages(
		&self,
		mut prepared: PreparedRequest,
		cx: &CallContext<'_>,
	) -> Result<PreparedRequest> {
		for stage in self.request_stages.iter() {
			prepared = stage.apply(prepared, cx).await?;
		}

		Ok(prepared)
	}

	fn run_response_stages(&self, response: &ApiResponse, cx: &CallContext<'_>) -> Result<()> {
		self.response_stages.iter().try_for_each(|stage| stage.inspect(response, cx))
	}

	async fn transmit(&self, request: PreparedRequest) -> Result<ApiResponse> {
		let url = request.url.clone();
		let timeout = self.config.timeout;

		match time::timeout(timeout, self.transport.execute(request)).await {
			Ok(result) => Ok(result?),
			Err(_) => Err(Error::Timeout { url, timeout }),
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient {
	/// Creates a reqwest-backed client whose tokens live in `storage`.
	pub fn new(config: ClientConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
		let session = Arc::new(Session::new(storage, &config));
		let transport = Arc::new(ReqwestTransport::new()?);

		Ok(Self::with_transport(config, session, transport))
	}

	/// Creates a reqwest-backed client from the environment with in-memory token storage.
	pub fn from_env() -> Result<Self> {
		Self::new(ClientConfig::from_env()?, Arc::new(MemoryStore::default()))
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("request_stages", &self.request_stages.len())
			.field("response_stages", &self.response_stages.len())
			.finish_non_exhaustive()
	}
}

fn query_value(value: &serde_json::Value) -> Option<String> {
	match value {
		serde_json::Value::Null => None,
		serde_json::Value::String(text) => Some(text.clone()),
		other => Some(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		_preludet::*,
		error::TransportError,
		http::TransportFuture,
		store::{KeyValueStore, MemoryStore},
	};

	struct SilentTransport(Arc<AtomicUsize>);
	impl HttpTransport for SilentTransport {
		fn execute(&self, _: PreparedRequest) -> TransportFuture<'_> {
			self.0.fetch_add(1, Ordering::SeqCst);

			Box::pin(std::future::pending::<Result<ApiResponse, TransportError>>())
		}
	}

	fn paused_client(transport: Arc<dyn HttpTransport>) -> ApiClient {
		let config = ClientConfig::builder()
			.base_url(Url::parse("http://storefront.test/api/").expect("Base URL should parse."))
			.min_request_interval(Duration::ZERO)
			.max_retries(3)
			.retry_base_delay(Duration::from_secs(1))
			.timeout(Duration::from_secs(30))
			.build();
		let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
		let session = Arc::new(Session::new(storage, &config));

		ApiClient::with_transport(config, session, transport)
	}

	#[derive(Serialize)]
	struct Filters {
		category: Option<&'static str>,
		price_min: Option<u32>,
		is_available: bool,
		ids: Vec<u8>,
	}

	#[test]
	fn query_from_flattens_scalar_fields() {
		let request = ApiRequest::get("/products/")
			.query_from(&Filters {
				category: None,
				price_min: Some(100),
				is_available: true,
				ids: vec![1, 2],
			})
			.expect("Filters should serialize into query parameters.");
		let mut pairs: Vec<(&str, &str)> =
			request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

		pairs.sort();

		assert_eq!(
			pairs,
			vec![("ids", "1"), ("ids", "2"), ("is_available", "true"), ("price_min", "100")]
		);
		assert!(ApiRequest::get("/").query_from(&42).is_err());
	}

	#[tokio::test]
	async fn requests_carry_cache_suppression_and_query() {
		let transport = StubTransport::default();

		transport.reply(
			Method::Get,
			"/api/products/",
			StubReply::json(200, serde_json::json!({ "count": 0, "results": [] })),
		);

		let (client, _) = stub_client(transport.clone());
		let _: serde_json::Value = client
			.fetch(ApiRequest::get("/products/").query("search", "lamp"))
			.await
			.expect("Listing should succeed.");
		let sent = transport.requests();

		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].url.query(), Some("search=lamp"));
		assert_eq!(sent[0].header("cache-control"), Some("no-cache"));
		assert_eq!(sent[0].header("pragma"), Some("no-cache"));
		assert_eq!(sent[0].header("accept"), Some("application/json"));
		assert_eq!(sent[0].bearer(), None);
	}

	#[tokio::test]
	async fn other_failures_pass_through_with_server_message() {
		let transport = StubTransport::default();

		transport.reply(
			Method::Get,
			"/api/news/missing/",
			StubReply::json(404, serde_json::json!({ "detail": "Not found." })),
		);

		let (client, _) = stub_client(transport);
		let err = client
			.get_json::<serde_json::Value>("/news/missing/")
			.await
			.expect_err("A 404 should surface as an error.");

		match err {
			Error::Http { status, message, url } => {
				assert_eq!(status, 404);
				assert_eq!(message, "Not found.");
				assert_eq!(url.path(), "/api/news/missing/");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[tokio::test]
	async fn anonymous_unauthorized_is_not_a_session_event() {
		let transport = StubTransport::default();

		transport.reply(
			Method::Get,
			"/api/admin/auth/me/",
			StubReply::json(401, serde_json::json!({ "detail": "Not authenticated." })),
		);

		let (client, session) = stub_client(transport.clone());
		let events = Arc::new(Mutex::new(Vec::new()));
		let sink = events.clone();

		session.subscribe(move |event: &crate::session::SessionEvent| sink.lock().push(*event));

		let err = client
			.get_json::<serde_json::Value>("/admin/auth/me/")
			.await
			.expect_err("An unauthenticated probe should fail.");

		assert_eq!(err.status(), Some(401));
		assert!(events.lock().is_empty());
		assert!(transport.requests_to("/api/admin/auth/refresh/").is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn rate_limited_calls_back_off_linearly_then_recover() {
		let transport = StubTransport::default();
		let limited = StubReply::json(429, serde_json::json!({ "detail": "Slow down." }));

		transport
			.reply(Method::Get, "/api/about/", limited.clone())
			.reply(Method::Get, "/api/about/", limited.clone())
			.reply(Method::Get, "/api/about/", limited)
			.reply(
				Method::Get,
				"/api/about/",
				StubReply::json(200, serde_json::json!({ "title": "About" })),
			);

		let client = paused_client(Arc::new(transport.clone()));
		let started = time::Instant::now();
		let about: serde_json::Value =
			client.get_json("/about/").await.expect("The fourth attempt should succeed.");
		let elapsed = started.elapsed();

		assert_eq!(about["title"], "About");
		assert_eq!(transport.requests_to("/api/about/").len(), 4);
		// 1s + 2s + 3s of backoff.
		assert!(elapsed >= Duration::from_secs(6), "Backoff was too short: {elapsed:?}.");
		assert!(elapsed < Duration::from_secs(7), "Backoff was too long: {elapsed:?}.");
	}

	#[tokio::test(start_paused = true)]
	async fn slow_transports_time_out_without_retrying() {
		let dispatched = Arc::new(AtomicUsize::new(0));
		let client = paused_client(Arc::new(SilentTransport(dispatched.clone())));
		let started = time::Instant::now();
		let err = client
			.get_json::<serde_json::Value>("/about/")
			.await
			.expect_err("A silent server should time out.");

		match err {
			Error::Timeout { url, timeout } => {
				assert_eq!(url.path(), "/api/about/");
				assert_eq!(timeout, Duration::from_secs(30));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert_eq!(dispatched.load(Ordering::SeqCst), 1);
		assert!(started.elapsed() >= Duration::from_secs(30));
	}
}
