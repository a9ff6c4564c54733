//! Client configuration: base URL, timeouts, pacing, retry budget, and CSRF naming.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable that overrides the API base URL.
pub const BASE_URL_ENV: &str = "STOREFRONT_API_URL";
/// Base URL used when [`BASE_URL_ENV`] is unset.
pub const DEFAULT_BASE_URL: &str = "https://ncb-1.onrender.com/api";

/// Bounded retry policy for HTTP 429 responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Retries allowed after the first attempt.
	pub max_retries: u32,
	/// Delay unit; attempt `n` waits `n * base_delay`.
	pub base_delay: Duration,
}
impl RetryPolicy {
	/// Backoff before retry number `attempt` (1-based).
	pub fn delay_for(&self, attempt: u32) -> Duration {
		self.base_delay.saturating_mul(attempt)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_retries: 3, base_delay: Duration::from_secs(1) }
	}
}

/// Immutable client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// API root every resource path is appended to.
	pub base_url: Url,
	/// Ceiling on a single dispatch; exceeding it yields [`Error::Timeout`].
	pub timeout: Duration,
	/// Minimum spacing between two dispatched requests.
	pub min_request_interval: Duration,
	/// 429 retry budget.
	pub retry: RetryPolicy,
	/// Cookie whose value is mirrored into the anti-forgery header.
	pub csrf_cookie: String,
	/// Anti-forgery header name.
	pub csrf_header: String,
}
impl ClientConfig {
	/// Returns a builder seeded with defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Builds a configuration from the process environment, falling back to defaults.
	pub fn from_env() -> Result<Self> {
		let raw = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());

		Ok(Self::builder().base_url(parse_base_url(&raw)?).build())
	}

	/// Resolves an API path (e.g. `/products/`) against the base URL.
	pub fn endpoint(&self, path: &str) -> Url {
		let mut url = self.base_url.clone();
		let joined = format!(
			"{}/{}",
			self.base_url.path().trim_end_matches('/'),
			path.trim_start_matches('/')
		);

		url.set_path(&joined);
		url.set_query(None);

		url
	}

	/// Builds an absolute URL for a media path returned by the API.
	///
	/// Absolute URLs pass through, empty paths stay empty, and a trailing `/api` segment is
	/// stripped from the base so media resolve against the host root.
	pub fn image_url(&self, path: Option<&str>) -> String {
		let Some(path) = path.filter(|p| !p.is_empty()) else {
			return String::new();
		};

		if path.starts_with("http://") || path.starts_with("https://") {
			return path.to_owned();
		}

		let base = self.base_url.as_str().trim_end_matches('/');
		let base = base.strip_suffix("/api").unwrap_or(base);

		format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self::builder().build()
	}
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	base_url: Option<Url>,
	timeout: Duration,
	min_request_interval: Duration,
	retry: RetryPolicy,
	csrf_cookie: String,
	csrf_header: String,
}
impl ClientConfigBuilder {
	/// Sets the API base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Sets the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Sets the minimum spacing between dispatched requests.
	pub fn min_request_interval(mut self, interval: Duration) -> Self {
		self.min_request_interval = interval;

		self
	}

	/// Sets the number of 429 retries.
	pub fn max_retries(mut self, retries: u32) -> Self {
		self.retry.max_retries = retries;

		self
	}

	/// Sets the 429 backoff unit.
	pub fn retry_base_delay(mut self, delay: Duration) -> Self {
		self.retry.base_delay = delay;

		self
	}

	/// Overrides the CSRF cookie and header names.
	pub fn csrf_names(mut self, cookie: impl Into<String>, header: impl Into<String>) -> Self {
		self.csrf_cookie = cookie.into();
		self.csrf_header = header.into();

		self
	}

	/// Consumes the builder.
	pub fn build(self) -> ClientConfig {
		let base_url = self.base_url.unwrap_or_else(default_base_url);

		ClientConfig {
			base_url,
			timeout: self.timeout,
			min_request_interval: self.min_request_interval,
			retry: self.retry,
			csrf_cookie: self.csrf_cookie,
			csrf_header: self.csrf_header,
		}
	}
}
impl Default for ClientConfigBuilder {
	fn default() -> Self {
		Self {
			base_url: None,
			timeout: Duration::from_secs(30),
			min_request_interval: Duration::from_millis(100),
			retry: RetryPolicy::default(),
			csrf_cookie: "csrftoken".into(),
			csrf_header: "X-CSRFToken".into(),
		}
	}
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw.trim())
		.map_err(|source| ConfigError::InvalidBaseUrl { value: raw.to_owned(), source })
}

fn default_base_url() -> Url {
	Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL must be an absolute URL.")
}
