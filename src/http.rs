//! Transport primitives for API calls.
//!
//! The module exposes [`HttpTransport`] alongside the wire-level [`PreparedRequest`] and
//! [`ApiResponse`] so the dispatcher stays independent of the HTTP stack. The crate ships a
//! reqwest-backed [`ReqwestTransport`]; tests and embedders can provide their own
//! implementation as long as it reports every response (successful or not) as an
//! [`ApiResponse`] and reserves [`TransportError`] for failures that produced no response.

// crates.io
#[cfg(feature = "reqwest")] use reqwest::{
	header::{HeaderName, HeaderValue, RETRY_AFTER, SET_COOKIE},
	multipart::{Form, Part},
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing prepared API requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by
/// every resource wrapper behind an `Arc`, and the returned futures must be `Send` so the
/// dispatcher can hop executors.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Dispatches `request` and resolves with the raw response.
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_>;
}

/// HTTP verbs used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical verb string.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One file in a multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct FilePart {
	/// Form field name.
	pub field: String,
	/// File name reported to the server.
	pub file_name: String,
	/// MIME type, e.g. `image/png`.
	pub content_type: String,
	/// File contents.
	pub bytes: Vec<u8>,
}
impl FilePart {
	/// Creates a part for `field` carrying `bytes`.
	pub fn new(
		field: impl Into<String>,
		file_name: impl Into<String>,
		content_type: impl Into<String>,
		bytes: Vec<u8>,
	) -> Self {
		Self {
			field: field.into(),
			file_name: file_name.into(),
			content_type: content_type.into(),
			bytes,
		}
	}

	/// Size of the payload in bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Returns `true` if the payload is empty.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}
impl Debug for FilePart {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FilePart")
			.field("field", &self.field)
			.field("file_name", &self.file_name)
			.field("content_type", &self.content_type)
			.field("len", &self.bytes.len())
			.finish()
	}
}

/// Request payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
	/// No body.
	#[default]
	Empty,
	/// JSON document.
	Json(serde_json::Value),
	/// Multipart form: text fields followed by files.
	Multipart {
		/// Plain form fields.
		fields: Vec<(String, String)>,
		/// Attached files.
		files: Vec<FilePart>,
	},
}

/// Fully resolved request handed to a transport.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including the query string.
	pub url: Url,
	/// Header map; names are stored as given.
	pub headers: BTreeMap<String, String>,
	/// Request payload.
	pub body: RequestBody,
}
impl PreparedRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: BTreeMap::new(), body: RequestBody::Empty }
	}

	/// Sets (or replaces) a header.
	pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.headers.insert(name.into(), value.into());
	}

	/// Looks a header up case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Returns the bearer credential attached to the request, if any.
	pub fn bearer(&self) -> Option<&str> {
		self.header("Authorization").and_then(|value| value.strip_prefix("Bearer "))
	}
}

/// Raw API response captured by a transport.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Final request URL.
	pub url: Url,
	/// Response headers with lowercased names; repeated headers keep the last value.
	pub headers: BTreeMap<String, String>,
	/// Every `Set-Cookie` header value in arrival order.
	pub set_cookies: Vec<String>,
	/// Body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates an empty response with the provided status.
	pub fn new(status: u16, url: Url) -> Self {
		Self { status, url, headers: BTreeMap::new(), set_cookies: Vec::new(), body: Vec::new() }
	}

	/// Replaces the body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Adds a header (name is lowercased).
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name.to_ascii_lowercase(), value.into());

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` when the body carries no meaningful payload.
	pub fn is_empty(&self) -> bool {
		self.body.iter().all(u8::is_ascii_whitespace)
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let body: &[u8] = if self.is_empty() { b"null" } else { &self.body };
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::Decode { url: self.url.clone(), source })
	}

	/// Extracts a human-readable failure message from the body.
	///
	/// Prefers `error`, then `detail`, then `message` fields of a JSON object, then the first
	/// field-level validation message, falling back to a truncated body preview.
	pub fn error_message(&self) -> String {
		const PREVIEW: usize = 200;

		if let Ok(serde_json::Value::Object(map)) = serde_json::from_slice(&self.body) {
			for key in ["error", "detail", "message"] {
				if let Some(serde_json::Value::String(message)) = map.get(key) {
					return message.clone();
				}
			}

			let field_error = map.iter().find_map(|(field, value)| {
				value.as_array()?.first()?.as_str().map(|message| format!("{field}: {message}"))
			});

			if let Some(message) = field_error {
				return message;
			}
		}

		let text = String::from_utf8_lossy(&self.body);
		let text = text.trim();

		if text.is_empty() {
			return format!("HTTP {}", self.status);
		}

		text.chars().take(PREVIEW).collect()
	}

	/// Parses the `Retry-After` header as seconds or an RFC 2822 date.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(self.headers.get("retry-after")?)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirects are not followed: the API answers directly and a redirect would drop the
/// bearer credential on cross-origin hops.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with the crate's default reqwest settings.
	pub fn new() -> Result<Self> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn build(&self, request: PreparedRequest) -> Result<reqwest::Request, TransportError> {
		let method = match request.method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = self.0.request(method, request.url);

		for (name, value) in &request.headers {
			let name = HeaderName::from_bytes(name.as_bytes())
				.map_err(TransportError::invalid_request)?;
			let value = HeaderValue::from_str(value).map_err(TransportError::invalid_request)?;

			builder = builder.header(name, value);
		}

		builder = match request.body {
			RequestBody::Empty => builder,
			RequestBody::Json(value) => builder
				.header(reqwest::header::CONTENT_TYPE, "application/json")
				.body(value.to_string()),
			RequestBody::Multipart { fields, files } => {
				let mut form = Form::new();

				for (name, value) in fields {
					form = form.text(name, value);
				}
				for file in files {
					let part = Part::bytes(file.bytes)
						.file_name(file.file_name)
						.mime_str(&file.content_type)
						.map_err(TransportError::invalid_request)?;

					form = form.part(file.field, part);
				}

				builder.multipart(form)
			},
		};

		builder.build().map_err(TransportError::from)
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let request = self.build(request)?;
			let response = self.0.execute(request).await?;
			let status = response.status().as_u16();
			let url = response.url().clone();
			let mut headers = BTreeMap::new();
			let mut set_cookies = Vec::new();

			for (name, value) in response.headers() {
				let Ok(value) = value.to_str() else { continue };

				if *name == SET_COOKIE {
					set_cookies.push(value.to_owned());
				} else if *name == RETRY_AFTER || !headers.contains_key(name.as_str()) {
					headers.insert(name.as_str().to_owned(), value.to_owned());
				}
			}

			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, url, headers, set_cookies, body })
		})
	}
}

fn parse_retry_after(raw: &str) -> Option<Duration> {
	let raw = raw.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::from_secs(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Duration::try_from(delta).ok();
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url() -> Url {
		Url::parse("http://storefront.test/api/products/")
			.expect("Fixture URL should parse successfully.")
	}

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		assert_eq!(parse_retry_after("7"), Some(Duration::from_secs(7)));
		assert_eq!(parse_retry_after("Mon, 01 Jan 2001 00:00:00 +0000"), None);
		assert_eq!(parse_retry_after("soon"), None);

		let response = ApiResponse::new(429, url()).with_header("Retry-After", "2");

		assert_eq!(response.retry_after(), Some(Duration::from_secs(2)));
	}

	#[test]
	fn error_message_prefers_structured_fields() {
		let structured = ApiResponse::new(400, url()).with_body(r#"{"error":"Bad credentials"}"#);
		let detail = ApiResponse::new(404, url()).with_body(r#"{"detail":"Not found."}"#);
		let plain = ApiResponse::new(502, url()).with_body("upstream exploded");
		let field = ApiResponse::new(400, url())
			.with_body(r#"{"new_password":["This password is too short."]}"#);
		let empty = ApiResponse::new(500, url());

		assert_eq!(structured.error_message(), "Bad credentials");
		assert_eq!(field.error_message(), "new_password: This password is too short.");
		assert_eq!(detail.error_message(), "Not found.");
		assert_eq!(plain.error_message(), "upstream exploded");
		assert_eq!(empty.error_message(), "HTTP 500");
	}

	#[test]
	fn json_reports_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Page {
			#[allow(dead_code)]
			count: u32,
		}

		let response = ApiResponse::new(200, url()).with_body(r#"{"count":"many"}"#);
		let err = response.json::<Page>().expect_err("Mismatched payloads should fail to decode.");

		match err {
			Error::Decode { source, .. } => assert_eq!(source.path().to_string(), "count"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn bearer_is_read_case_insensitively() {
		let mut request = PreparedRequest::new(Method::Get, url());

		request.set_header("authorization", "Bearer abc");

		assert_eq!(request.bearer(), Some("abc"));
		assert_eq!(Method::Patch.to_string(), "PATCH");
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn malformed_headers_are_request_errors() {
		let transport = ReqwestTransport::new().expect("Reqwest client should build.");
		let mut request = PreparedRequest::new(Method::Get, url());

		request.set_header("X-CSRFToken", "line\nbreak");

		let err = transport.build(request).expect_err("Control characters should be rejected.");

		assert!(matches!(err, TransportError::InvalidRequest { .. }));
	}
}
