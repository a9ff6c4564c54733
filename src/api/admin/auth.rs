//! Admin authentication endpoints.

// self
use crate::{
	_prelude::*,
	api,
	client::{ApiClient, ApiRequest},
	model::{Credentials, LoginResponse, PasswordChange, ProfileUpdate, User},
};

/// Path of the login endpoint.
pub const LOGIN_PATH: &str = "/admin/auth/login/";
/// Path of the logout endpoint.
pub const LOGOUT_PATH: &str = "/admin/auth/logout/";
/// Path of the current-user endpoint.
pub const ME_PATH: &str = "/admin/auth/me/";

/// `/admin/auth/` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct AdminAuth<'a> {
	pub(crate) client: &'a ApiClient,
}
impl AdminAuth<'_> {
	/// Signs in and stores any issued token pair in the session.
	///
	/// Deployments that rely on session cookies alone return no tokens; the cookies are
	/// absorbed by the pipeline either way.
	pub async fn login(&self, credentials: &Credentials) -> Result<User> {
		api::ensure_filled("username", &credentials.username)?;
		api::ensure_filled("password", &credentials.password)?;

		let request = ApiRequest::post(LOGIN_PATH).json(credentials)?.anonymous();
		let response = self.client.fetch::<LoginResponse>(request).await?;

		if let Some(pair) = response.token_pair() {
			self.client.session().install_tokens(&pair)?;
		}

		Ok(response.user)
	}

	/// Signs out. The server call is best-effort; local credentials are always cleared.
	///
	/// The call never refreshes an expired token, so signing out cannot end the session
	/// through [`Session::expire`](crate::session::Session::expire) first.
	pub async fn logout(&self) {
		// Failures are already logged by the dispatcher.
		let _ = self.client.perform(ApiRequest::post(LOGOUT_PATH).no_refresh()).await;

		self.client.session().clear();
	}

	/// Fetches the signed-in user.
	pub async fn me(&self) -> Result<User> {
		self.client.get_json(ME_PATH).await
	}

	/// Changes the password of the signed-in user.
	pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
		api::ensure_filled("old_password", &change.old_password)?;
		api::ensure_filled("new_password", &change.new_password)?;

		self.client.perform(ApiRequest::post("/admin/auth/change-password/").json(change)?).await
	}

	/// Updates the signed-in user's profile and returns the stored record.
	pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
		if let Some(email) = &update.email {
			api::ensure_email(email)?;
		}

		self.client.fetch(ApiRequest::patch("/admin/auth/profile/").json(update)?).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, auth::TokenSecret, http::Method, session::SessionEvent};

	#[tokio::test]
	async fn login_installs_tokens_and_skips_the_bearer() {
		let transport = StubTransport::default();
		let access = fresh_jwt();

		transport.reply(
			Method::Post,
			"/api/admin/auth/login/",
			StubReply::json(
				200,
				serde_json::json!({
					"user": { "id": 1, "username": "admin", "is_staff": true },
					"access": access,
					"refresh": "refresh-1"
				}),
			),
		);

		let (client, session) = stub_client(transport.clone());
		let events = Arc::new(Mutex::new(Vec::new()));
		let sink = events.clone();

		session.subscribe(move |event: &SessionEvent| sink.lock().push(*event));
		session.tokens().set_tokens(&stale_jwt(), None).expect("Seeding tokens should succeed.");

		let user = client
			.admin()
			.auth()
			.login(&Credentials { username: "admin".into(), password: "secret".into() })
			.await
			.expect("Login should succeed.");

		let stored = session.tokens().access_token().expect("Token read should succeed.");

		assert_eq!(user.username, "admin");
		assert!(transport.requests()[0].bearer().is_none());
		assert_eq!(stored.as_ref().map(TokenSecret::expose), Some(access.as_str()));
		assert_eq!(events.lock().as_slice(), [SessionEvent::TokensIssued]);
	}

	#[tokio::test]
	async fn logout_clears_local_state_even_when_the_server_fails() {
		let transport = StubTransport::default();

		transport.reply(Method::Post, "/api/admin/auth/logout/", StubReply::empty(500));

		let (client, session) = stub_client(transport.clone());

		session.tokens().set_tokens(&fresh_jwt(), Some("refresh-1")).expect("Seeding should work.");
		client.admin().auth().logout().await;

		assert!(session.tokens().access_token().expect("Token read should succeed.").is_none());
		assert!(session.tokens().refresh_token().expect("Token read should succeed.").is_none());
		assert_eq!(transport.requests_to("/api/admin/auth/logout/").len(), 1);
	}

	#[tokio::test]
	async fn logout_with_an_expired_token_skips_the_refresh() {
		let transport = StubTransport::default();

		transport.reply(Method::Post, "/api/admin/auth/logout/", StubReply::empty(204));

		let (client, session) = stub_client(transport.clone());
		let events = Arc::new(Mutex::new(Vec::new()));
		let sink = events.clone();

		session.subscribe(move |event: &SessionEvent| sink.lock().push(*event));
		session.tokens().set_tokens(&stale_jwt(), None).expect("Seeding should work.");
		client.admin().auth().logout().await;

		let sent = transport.requests_to("/api/admin/auth/logout/");

		assert_eq!(sent.len(), 1);
		assert!(sent[0].bearer().is_none());
		assert!(transport.requests_to("/api/admin/auth/refresh/").is_empty());
		assert_eq!(events.lock().as_slice(), [SessionEvent::TokensCleared]);
		assert!(session.tokens().access_token().expect("Token read should succeed.").is_none());
	}

	#[tokio::test]
	async fn logout_with_a_refresh_token_does_not_renew_it() {
		let transport = StubTransport::default();

		transport.reply(
			Method::Post,
			"/api/admin/auth/logout/",
			StubReply::json(401, serde_json::json!({ "detail": "Token is invalid." })),
		);

		let (client, session) = stub_client(transport.clone());

		session.tokens().set_tokens(&fresh_jwt(), Some("refresh-1")).expect("Seeding should work.");
		client.admin().auth().logout().await;

		assert_eq!(transport.requests_to("/api/admin/auth/logout/").len(), 1);
		assert!(transport.requests_to("/api/admin/auth/refresh/").is_empty());
		assert_eq!(client.refresh_metrics.snapshot().attempts, 0);
		assert!(session.tokens().refresh_token().expect("Token read should succeed.").is_none());
	}

	#[tokio::test]
	async fn blank_credentials_are_rejected_locally() {
		let transport = StubTransport::default();
		let (client, _) = stub_client(transport.clone());
		let result = client
			.admin()
			.auth()
			.login(&Credentials { username: "admin".into(), password: String::new() })
			.await;

		assert!(matches!(result, Err(Error::Validation(_))));
		assert!(transport.requests().is_empty());
	}
}
