//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `storefront_client.call` with the `kind`
//!   and `stage` fields, plus warn/error events for retries and failures.
//! - Enable `metrics` to increment the `storefront_client_call_total` counter for every
//!   attempt/retry/success/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Call families observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Anonymous storefront endpoints.
	Public,
	/// Authenticated admin endpoints.
	Admin,
	/// Login/logout/profile endpoints.
	Auth,
	/// Access-token refresh sub-calls.
	Refresh,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Public => "public",
			CallKind::Admin => "admin",
			CallKind::Auth => "auth",
			CallKind::Refresh => "refresh",
		}
	}

	/// Classifies an API path.
	pub fn of_path(path: &str) -> Self {
		if path.starts_with("/admin/auth/refresh") {
			CallKind::Refresh
		} else if path.starts_with("/admin/auth/") {
			CallKind::Auth
		} else if path.starts_with("/admin/") {
			CallKind::Admin
		} else {
			CallKind::Public
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to the dispatcher.
	Attempt,
	/// Re-dispatch after a 401 refresh or a 429 backoff.
	Retry,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Retry => "retry",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
