//! Client-level error types shared across the pipeline, resource wrappers, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Input rejected before any network call.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The session could not be renewed; local credentials were cleared.
	#[error("Session expired; sign in again.")]
	SessionExpired,
	/// The request exceeded the configured duration ceiling.
	#[error("Request to {url} timed out after {timeout:?}.")]
	Timeout {
		/// Target URL.
		url: Url,
		/// Ceiling that was exceeded.
		timeout: Duration,
	},
	/// The server kept answering 429 after the retry budget was spent.
	#[error("Request to {url} is still rate limited after {attempts} retries.")]
	RateLimited {
		/// Target URL.
		url: Url,
		/// Number of retries performed.
		attempts: u32,
		/// Retry-After hint from the last response, if supplied.
		retry_after: Option<Duration>,
	},
	/// A success status arrived without a payload.
	#[error("Request to {url} returned {status} without a payload.")]
	EmptyPayload {
		/// HTTP status code.
		status: u16,
		/// Target URL.
		url: Url,
	},
	/// Any other non-success status.
	#[error("Request to {url} failed with {status}: {message}.")]
	Http {
		/// HTTP status code.
		status: u16,
		/// Server-supplied message or a body preview.
		message: String,
		/// Target URL.
		url: Url,
	},
	/// The response body did not match the expected shape.
	#[error("Response from {url} could not be decoded.")]
	Decode {
		/// Target URL.
		url: Url,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the HTTP status attached to the error, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::RateLimited { .. } => Some(429),
			Self::EmptyPayload { status, .. } | Self::Http { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` if the caller must authenticate again.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired)
	}
}

/// Configuration failures raised while building the client or its requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Serialize(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Input validation failures; none of these reach the network.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Resource identifiers must be positive integers.
	#[error("Identifier {id} for {resource} must be a positive integer.")]
	InvalidId {
		/// Resource label.
		resource: &'static str,
		/// Rejected identifier.
		id: i64,
	},
	/// Upload exceeds the resource's size ceiling.
	#[error("Upload `{file_name}` for {resource} is {size} bytes; the limit is {limit} bytes.")]
	UploadTooLarge {
		/// Resource label.
		resource: &'static str,
		/// Offending file name.
		file_name: String,
		/// Actual size in bytes.
		size: usize,
		/// Ceiling in bytes.
		limit: usize,
	},
	/// Email address is malformed.
	#[error("Email address `{value}` is malformed.")]
	InvalidEmail {
		/// Rejected value.
		value: String,
	},
	/// A required field is blank.
	#[error("Field `{field}` must not be empty.")]
	EmptyField {
		/// Field name.
		field: &'static str,
	},
	/// Path slugs must be non-empty and free of path or query delimiters.
	#[error("Slug `{value}` is not a valid path segment.")]
	InvalidSlug {
		/// Rejected value.
		value: String,
	},
	/// A numeric field falls outside its accepted range.
	#[error("Field `{field}` must be between {min} and {max}; got {value}.")]
	OutOfRange {
		/// Field name.
		field: &'static str,
		/// Rejected value.
		value: i64,
		/// Inclusive lower bound.
		min: i64,
		/// Inclusive upper bound.
		max: i64,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
	/// The request could not be encoded for the HTTP stack; nothing was sent.
	#[error("Request could not be encoded for the HTTP stack.")]
	InvalidRequest {
		/// Rejected header name/value or multipart metadata.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a request-construction failure inside [`TransportError`].
	pub fn invalid_request(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::InvalidRequest { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
