//! Signed-in admin state shared by views and route guards.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	model::{Credentials, PasswordChange, ProfileUpdate, User},
	session::SessionEvent,
};

/// Point-in-time copy of [`AuthState`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
	/// Signed-in user, if known.
	pub user: Option<User>,
	/// `true` while an auth call is in flight.
	pub loading: bool,
	/// Message of the last failed login, password change, or profile update.
	pub error: Option<String>,
	/// `true` once [`AuthState::init`] has completed.
	pub initialized: bool,
}

/// Signed-in admin state.
///
/// The user record is dropped whenever the session clears its credentials, so an expired
/// session can never leave a stale user behind.
#[derive(Clone)]
pub struct AuthState {
	client: ApiClient,
	inner: Arc<RwLock<AuthSnapshot>>,
	init_guard: Arc<AsyncMutex<()>>,
}
impl AuthState {
	/// Creates the state and links it to the client's session.
	pub fn new(client: ApiClient) -> Self {
		let inner = Arc::new(RwLock::new(AuthSnapshot::default()));
		let observed = inner.clone();

		client.session().subscribe(move |event: &SessionEvent| {
			if matches!(event, SessionEvent::TokensCleared) {
				observed.write().user = None;
			}
		});

		Self { client, inner, init_guard: Default::default() }
	}

	/// Returns a copy of the current state.
	pub fn snapshot(&self) -> AuthSnapshot {
		self.inner.read().clone()
	}

	/// Returns the signed-in user, if known.
	pub fn user(&self) -> Option<User> {
		self.inner.read().user.clone()
	}

	/// Returns `true` once [`init`](Self::init) has completed.
	pub fn is_initialized(&self) -> bool {
		self.inner.read().initialized
	}

	/// Loads the current user once; later calls return immediately.
	///
	/// A failed lookup leaves the state anonymous rather than surfacing an error.
	pub async fn init(&self) {
		let _guard = self.init_guard.lock().await;

		if self.is_initialized() {
			return;
		}

		self.inner.write().loading = true;

		let user = self.client.admin().auth().me().await.ok();
		let mut state = self.inner.write();

		state.user = user;
		state.loading = false;
		state.initialized = true;
	}

	/// Signs in and records the user.
	pub async fn login(&self, username: &str, password: &str) -> Result<User> {
		let credentials =
			Credentials { username: username.to_owned(), password: password.to_owned() };
		let user = self.track(self.client.admin().auth().login(&credentials)).await?;

		self.inner.write().user = Some(user.clone());

		Ok(user)
	}

	/// Signs out; local state is cleared even if the server call fails.
	pub async fn logout(&self) {
		self.client.admin().auth().logout().await;
		self.inner.write().user = None;
	}

	/// Changes the signed-in user's password.
	pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
		let change = PasswordChange {
			old_password: old_password.to_owned(),
			new_password: new_password.to_owned(),
		};

		self.track(self.client.admin().auth().change_password(&change)).await
	}

	/// Updates the signed-in user's profile and records the stored result.
	pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
		let user = self.track(self.client.admin().auth().update_profile(update)).await?;

		self.inner.write().user = Some(user.clone());

		Ok(user)
	}

	/// Reloads the user; any failure leaves the state anonymous.
	pub async fn refresh_user(&self) -> Option<User> {
		let user = self.client.admin().auth().me().await.ok();

		self.inner.write().user = user.clone();

		user
	}

	/// Returns `true` if an unexpired access token is stored and the user is known.
	pub fn is_authenticated(&self) -> bool {
		let token_valid = match self.client.session().tokens().has_valid_access_token() {
			Ok(valid) => valid,
			Err(e) => {
				crate::obs::log_storage_issue("auth.is_authenticated", &e);

				false
			},
		};

		token_valid && self.inner.read().user.is_some()
	}

	/// Returns `true` if the user is staff or a superuser.
	pub fn is_admin(&self) -> bool {
		self.inner.read().user.as_ref().is_some_and(User::is_admin)
	}

	/// Display name of the user; empty when signed out.
	pub fn full_name(&self) -> String {
		self.inner.read().user.as_ref().map(User::full_name).unwrap_or_default()
	}

	// Runs `call` with the loading flag raised and records its error message.
	async fn track<T, F>(&self, call: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		{
			let mut state = self.inner.write();

			state.loading = true;
			state.error = None;
		}

		let result = call.await;
		let mut state = self.inner.write();

		state.loading = false;

		if let Err(e) = &result {
			state.error = Some(match e {
				Error::Http { message, .. } => message.clone(),
				e => e.to_string(),
			});
		}

		result
	}
}
impl Debug for AuthState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthState").field("state", &*self.inner.read()).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, http::Method};

	fn user_json() -> serde_json::Value {
		serde_json::json!({
			"id": 1,
			"username": "admin",
			"first_name": "Dilnoza",
			"last_name": "R.",
			"is_superuser": true
		})
	}

	#[tokio::test]
	async fn init_runs_once_and_tolerates_anonymous_sessions() {
		let transport = StubTransport::default();

		transport.reply(
			Method::Get,
			"/api/admin/auth/me/",
			StubReply::json(401, serde_json::json!({ "detail": "Not authenticated." })),
		);

		let (client, _) = stub_client(transport.clone());
		let auth = AuthState::new(client);

		auth.init().await;
		auth.init().await;

		let state = auth.snapshot();

		assert!(state.initialized);
		assert!(!state.loading);
		assert!(state.user.is_none());
		assert!(!auth.is_authenticated());
		assert_eq!(transport.requests_to("/api/admin/auth/me/").len(), 1);
	}

	#[tokio::test]
	async fn login_then_session_clear_drops_the_user() {
		let transport = StubTransport::default();

		transport.reply(
			Method::Post,
			"/api/admin/auth/login/",
			StubReply::json(
				200,
				serde_json::json!({ "user": user_json(), "access": fresh_jwt(), "refresh": "r" }),
			),
		);

		let (client, session) = stub_client(transport);
		let auth = AuthState::new(client);

		auth.login("admin", "secret").await.expect("Login should succeed.");

		assert!(auth.is_authenticated());
		assert!(auth.is_admin());
		assert_eq!(auth.full_name(), "Dilnoza R.");

		session.clear();

		assert!(auth.user().is_none());
		assert!(!auth.is_authenticated());
		assert_eq!(auth.full_name(), "");
	}

	#[tokio::test]
	async fn failed_password_change_records_the_server_message() {
		let transport = StubTransport::default();

		transport.reply(
			Method::Post,
			"/api/admin/auth/change-password/",
			StubReply::json(400, serde_json::json!({ "new_password": ["Too short."] })),
		);

		let (client, _) = stub_client(transport);
		let auth = AuthState::new(client);

		auth.change_password("old", "new").await.expect_err("Change should be rejected.");

		let state = auth.snapshot();

		assert_eq!(state.error.as_deref(), Some("new_password: Too short."));
		assert!(!state.loading);
	}
}
