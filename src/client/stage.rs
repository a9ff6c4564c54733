//! Ordered middleware stages run around every dispatch.
//!
//! Request stages transform a [`PreparedRequest`] (or short-circuit with an error); response
//! stages inspect the raw [`ApiResponse`] before status classification. The built-in chains
//! are `[PaceStage, CsrfStage, BearerStage]` and `[CookieStage, PayloadStage]`.

// self
use crate::{
	_prelude::*,
	auth::is_token_expired,
	client::{ApiClient, ApiRequest},
	http::{ApiResponse, PreparedRequest},
	obs::CallKind,
};

/// Boxed future returned by [`RequestStage::apply`].
pub type StageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Per-call state visible to every stage.
#[derive(Clone, Copy, Debug)]
pub struct CallContext<'a> {
	/// Client running the call.
	pub client: &'a ApiClient,
	/// Logical request being dispatched.
	pub request: &'a ApiRequest,
	/// Call family used for spans and metrics.
	pub kind: CallKind,
}

/// Pre-dispatch stage.
pub trait RequestStage
where
	Self: Send + Sync,
{
	/// Returns the request to hand to the next stage, or an error that aborts the call.
	fn apply<'a>(
		&'a self,
		request: PreparedRequest,
		cx: &'a CallContext<'a>,
	) -> StageFuture<'a, PreparedRequest>;
}

/// Post-dispatch stage.
pub trait ResponseStage
where
	Self: Send + Sync,
{
	/// Inspects `response`; an error replaces the response as the call's outcome.
	fn inspect(&self, response: &ApiResponse, cx: &CallContext<'_>) -> Result<()>;
}

/// Waits for the session's pacing slot.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaceStage;
impl RequestStage for PaceStage {
	fn apply<'a>(
		&'a self,
		request: PreparedRequest,
		cx: &'a CallContext<'a>,
	) -> StageFuture<'a, PreparedRequest> {
		Box::pin(async move {
			if cx.request.paced {
				cx.client.session().limiter().wait().await;
			}

			Ok(request)
		})
	}
}

/// Mirrors the anti-forgery cookie into its header.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsrfStage;
impl RequestStage for CsrfStage {
	fn apply<'a>(
		&'a self,
		mut request: PreparedRequest,
		cx: &'a CallContext<'a>,
	) -> StageFuture<'a, PreparedRequest> {
		Box::pin(async move {
			let config = cx.client.config();

			if let Some(token) = cx.client.session().cookies().get(&config.csrf_cookie) {
				request.set_header(config.csrf_header.clone(), token);
			}

			Ok(request)
		})
	}
}

/// Attaches the access token, refreshing it first when it has expired.
///
/// A failed pre-flight refresh has already ended the session and aborts the call with
/// [`Error::SessionExpired`]. Requests that opt out of refreshing go out without a bearer
/// once the token has expired.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerStage;
impl RequestStage for BearerStage {
	fn apply<'a>(
		&'a self,
		mut request: PreparedRequest,
		cx: &'a CallContext<'a>,
	) -> StageFuture<'a, PreparedRequest> {
		Box::pin(async move {
			if cx.request.anonymous {
				return Ok(request);
			}

			let Some(token) = cx.client.session().tokens().access_token()? else {
				return Ok(request);
			};
			let token = match is_token_expired(token.expose()) {
				false => token,
				true if cx.request.refresh => {
					cx.client.refresh_access_token(Some(token.expose())).await?
				},
				true => return Ok(request),
			};

			request.set_header("Authorization", format!("Bearer {}", token.expose()));

			Ok(request)
		})
	}
}

/// Captures `Set-Cookie` headers into the session's jar.
#[derive(Clone, Copy, Debug, Default)]
pub struct CookieStage;
impl ResponseStage for CookieStage {
	fn inspect(&self, response: &ApiResponse, cx: &CallContext<'_>) -> Result<()> {
		let jar = cx.client.session().cookies();

		for header in &response.set_cookies {
			jar.absorb_set_cookie(header);
		}

		Ok(())
	}
}

/// Rejects success responses without a body; `204 No Content` is exempt.
#[derive(Clone, Copy, Debug, Default)]
pub struct PayloadStage;
impl ResponseStage for PayloadStage {
	fn inspect(&self, response: &ApiResponse, _: &CallContext<'_>) -> Result<()> {
		if response.is_success() && response.status != 204 && response.is_empty() {
			return Err(Error::EmptyPayload { status: response.status, url: response.url.clone() });
		}

		Ok(())
	}
}

pub(crate) fn default_request_stages() -> Vec<Arc<dyn RequestStage>> {
	vec![Arc::new(PaceStage), Arc::new(CsrfStage), Arc::new(BearerStage)]
}

pub(crate) fn default_response_stages() -> Vec<Arc<dyn ResponseStage>> {
	vec![Arc::new(CookieStage), Arc::new(PayloadStage)]
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, http::Method};

	#[tokio::test]
	async fn csrf_cookie_is_mirrored_into_the_header() {
		let (client, session) = stub_client(StubTransport::default());
		let request = ApiRequest::post("/admin/products/");
		let cx = CallContext { client: &client, request: &request, kind: CallKind::Admin };
		let url = client.config().endpoint("/admin/products/");
		let bare = CsrfStage
			.apply(PreparedRequest::new(Method::Post, url.clone()), &cx)
			.await
			.expect("The CSRF stage should never fail.");

		assert_eq!(bare.header("X-CSRFToken"), None);

		session.cookies().set("csrftoken", "tok-1");

		let stamped = CsrfStage
			.apply(PreparedRequest::new(Method::Post, url), &cx)
			.await
			.expect("The CSRF stage should never fail.");

		assert_eq!(stamped.header("x-csrftoken"), Some("tok-1"));
	}

	#[tokio::test]
	async fn bearer_is_attached_only_to_authenticated_calls() {
		let (client, session) = stub_client(StubTransport::default());
		let token = fresh_jwt();

		session.tokens().set_tokens(&token, Some("r")).expect("Storing tokens should succeed.");

		let url = client.config().endpoint("/admin/stats/");
		let authed = ApiRequest::get("/admin/stats/");
		let anonymous = ApiRequest::post("/admin/auth/login/").anonymous();
		let cx = CallContext { client: &client, request: &authed, kind: CallKind::Admin };
		let attached = BearerStage
			.apply(PreparedRequest::new(Method::Get, url.clone()), &cx)
			.await
			.expect("A fresh token should be attached.");

		assert_eq!(attached.bearer(), Some(token.as_str()));

		let cx = CallContext { client: &client, request: &anonymous, kind: CallKind::Auth };
		let skipped = BearerStage
			.apply(PreparedRequest::new(Method::Post, url), &cx)
			.await
			.expect("Anonymous calls should pass through.");

		assert_eq!(skipped.bearer(), None);
	}

	#[tokio::test]
	async fn empty_success_payloads_are_rejected_except_no_content() {
		let (client, _) = stub_client(StubTransport::default());
		let request = ApiRequest::get("/about/");
		let cx = CallContext { client: &client, request: &request, kind: CallKind::Public };
		let url = client.config().endpoint("/about/");

		assert!(matches!(
			PayloadStage.inspect(&ApiResponse::new(200, url.clone()).with_body("  "), &cx),
			Err(Error::EmptyPayload { status: 200, .. })
		));
		assert!(PayloadStage.inspect(&ApiResponse::new(204, url.clone()), &cx).is_ok());
		assert!(PayloadStage.inspect(&ApiResponse::new(500, url.clone()), &cx).is_ok());
		assert!(PayloadStage.inspect(&ApiResponse::new(200, url).with_body("{}"), &cx).is_ok());
	}
}
