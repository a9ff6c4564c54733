// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by the dispatcher.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("storefront_client.call", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a failed call with status, message, and URL.
pub fn log_call_failure(status: Option<u16>, message: &str, url: &Url) {
	#[cfg(feature = "tracing")]
	tracing::error!(status, message, url = url.as_str(), "API call failed");
	#[cfg(not(feature = "tracing"))]
	let _ = (status, message, url);
}

/// Logs a 429 backoff before the next attempt.
pub fn log_rate_limited(url: &Url, attempt: u32, max_retries: u32, delay: Duration) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		url = url.as_str(),
		attempt,
		max_retries,
		delay_ms = delay.as_millis() as u64,
		"rate limited; backing off"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (url, attempt, max_retries, delay);
}

/// Logs the outcome of an access-token refresh.
pub fn log_refresh(succeeded: bool, reason: &str) {
	#[cfg(feature = "tracing")]
	{
		if succeeded {
			tracing::debug!(reason, "access token refreshed");
		} else {
			tracing::warn!(reason, "access token refresh failed");
		}
	}
	#[cfg(not(feature = "tracing"))]
	let _ = (succeeded, reason);
}

/// Logs a local persistence problem that the caller chose not to surface.
pub fn log_storage_issue(context: &'static str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(context, error = %error, "storage operation failed");
	#[cfg(not(feature = "tracing"))]
	let _ = (context, error);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn log_helpers_accept_all_inputs() {
		let url = Url::parse("http://storefront.test/api/products/")
			.expect("Fixture URL should parse successfully.");

		log_call_failure(Some(500), "boom", &url);
		log_rate_limited(&url, 1, 3, Duration::from_millis(10));
		log_refresh(false, "missing refresh token");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
