//! Access-token refresh guarded by a per-session single-flight lock.
//!
//! The first caller to observe an expired or rejected token takes the session's refresh
//! guard and performs `POST /admin/auth/refresh/`. Callers queued behind it re-read the
//! store once they acquire the guard; if a different, unexpired token has been installed in
//! the meantime they reuse it without another network call. Any refresh failure ends the
//! session.

mod metrics;

pub use metrics::*;

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret, is_token_expired},
	client::{ApiClient, ApiRequest},
	obs::{self, CallKind, CallOutcome, CallSpan},
	session::{LogoutReason, SessionEvent},
};

/// Endpoint exchanging a refresh token for a new access token.
pub const REFRESH_PATH: &str = "/admin/auth/refresh/";

impl ApiClient {
	/// Returns a usable access token, refreshing the stored one when needed.
	///
	/// `observed` is the token the caller found expired or had rejected by the server. On
	/// failure the session has been expired and [`Error::SessionExpired`] is returned.
	pub async fn refresh_access_token(&self, observed: Option<&str>) -> Result<TokenSecret> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh_access_token");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let _singleflight = self.session().refresh_guard().lock().await;

				self.refresh_metrics.record_attempt();

				let tokens = self.session().tokens();
				let current = tokens.access_token().inspect_err(|_| {
					self.refresh_metrics.record_failure();
				})?;

				match current {
					Some(current)
						if Some(current.expose()) != observed
							&& !is_token_expired(current.expose()) =>
					{
						self.refresh_metrics.record_reuse();

						return Ok(current);
					},
					// A concurrent caller already ended the session.
					None if observed.is_some() => {
						self.refresh_metrics.record_failure();

						return Err(Error::SessionExpired);
					},
					_ => {},
				}

				let refresh = tokens.refresh_token().inspect_err(|_| {
					self.refresh_metrics.record_failure();
				})?;
				let Some(refresh) = refresh else {
					self.refresh_metrics.record_failure();
					obs::log_refresh(false, LogoutReason::MissingRefreshToken.as_str());
					self.session().expire(LogoutReason::MissingRefreshToken);

					return Err(Error::SessionExpired);
				};
				let issued = match self.exchange_refresh_token(&refresh).await {
					Ok(pair) => tokens
						.set_tokens(
							pair.access.expose(),
							pair.refresh.as_ref().map(TokenSecret::expose),
						)
						.map(|_| pair.access)
						.map_err(Error::from),
					Err(e) => Err(e),
				};

				match issued {
					Ok(access) => {
						self.refresh_metrics.record_success();
						obs::log_refresh(true, "access token rotated");
						self.session().notify(SessionEvent::TokensRefreshed);

						Ok(access)
					},
					Err(e) => {
						self.refresh_metrics.record_failure();
						obs::log_refresh(false, &e.to_string());
						self.session().expire(LogoutReason::RefreshFailed);

						Err(Error::SessionExpired)
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	// Boxed to break the dispatcher -> refresh -> dispatcher future cycle.
	fn exchange_refresh_token<'a>(
		&'a self,
		refresh: &'a TokenSecret,
	) -> Pin<Box<dyn Future<Output = Result<TokenPair>> + 'a + Send>> {
		Box::pin(async move {
			let request = ApiRequest::post(REFRESH_PATH)
				.json(&serde_json::json!({ "refresh": refresh.expose() }))?
				.anonymous()
				.unpaced();

			self.fetch(request).await
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, http::Method};

	#[tokio::test]
	async fn concurrent_callers_share_one_refresh() {
		let transport = StubTransport::default();
		let fresh = fresh_jwt();
		let stale = stale_jwt();

		transport.reply(
			Method::Post,
			"/api/admin/auth/refresh/",
			StubReply::json(200, serde_json::json!({ "access": fresh })),
		);

		let (client, session) = stub_client(transport.clone());

		session.tokens().set_tokens(&stale, Some("refresh-1")).expect("Seeding should succeed.");

		let (a, b, c) = tokio::join!(
			client.refresh_access_token(Some(&stale)),
			client.refresh_access_token(Some(&stale)),
			client.refresh_access_token(Some(&stale)),
		);

		for token in [a, b, c] {
			assert_eq!(token.expect("Every caller should get a token.").expose(), fresh);
		}

		assert_eq!(transport.requests_to("/api/admin/auth/refresh/").len(), 1);

		let counts = client.refresh_metrics.snapshot();

		assert_eq!(counts.attempts, 3);
		assert_eq!(counts.successes, 1);
		assert_eq!(counts.reuses, 2);
		assert_eq!(counts.failures, 0);
		assert_eq!(
			session
				.tokens()
				.refresh_token()
				.expect("Reading should succeed.")
				.map(|t| t.expose().to_owned()),
			Some("refresh-1".into())
		);
	}

	#[tokio::test]
	async fn rejected_refresh_ends_the_session() {
		let transport = StubTransport::default();
		let stale = stale_jwt();

		transport.reply(
			Method::Post,
			"/api/admin/auth/refresh/",
			StubReply::json(401, serde_json::json!({ "detail": "Token is blacklisted" })),
		);

		let (client, session) = stub_client(transport.clone());
		let events = Arc::new(Mutex::new(Vec::new()));
		let sink = events.clone();

		session.subscribe(move |event: &SessionEvent| sink.lock().push(*event));
		session.tokens().set_tokens(&stale, Some("refresh-1")).expect("Seeding should succeed.");

		let err = client
			.refresh_access_token(Some(&stale))
			.await
			.expect_err("A rejected refresh should fail.");

		assert!(err.is_session_expired());
		assert!(session.tokens().refresh_token().expect("Reading should succeed.").is_none());
		assert_eq!(
			events.lock().last(),
			Some(&SessionEvent::LoginRequired { reason: LogoutReason::RefreshFailed })
		);

		let sent = transport.requests_to("/api/admin/auth/refresh/");

		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].bearer(), None);
		assert_eq!(
			sent[0].body,
			crate::http::RequestBody::Json(serde_json::json!({ "refresh": "refresh-1" }))
		);
	}
}
