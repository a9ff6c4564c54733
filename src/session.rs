//! Explicit session context shared by every request issued through a client.
//!
//! A [`Session`] owns the credential pair, the cookie jar, the global request pacer and the
//! single-flight guard used by access-token refreshes. It is created once, wrapped in an
//! [`Arc`], and injected into [`ApiClient`](crate::client::ApiClient) so tests can inspect and
//! drive it directly.

pub mod cookie;
pub mod event;

pub use cookie::CookieJar;
pub use event::{LogoutReason, SessionEvent, SessionObserver};

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenStore},
	config::ClientConfig,
	obs,
	rate_limit::RateLimiter,
	store::KeyValueStore,
};

/// Mutable per-user state consulted by the request pipeline.
pub struct Session {
	tokens: TokenStore,
	cookies: CookieJar,
	limiter: RateLimiter,
	refresh_guard: AsyncMutex<()>,
	observers: RwLock<Vec<Arc<dyn SessionObserver>>>,
}
impl Session {
	/// Creates a session whose tokens live in `storage` and whose pacing follows `config`.
	pub fn new(storage: Arc<dyn KeyValueStore>, config: &ClientConfig) -> Self {
		let cookies = CookieJar::default();

		Self {
			tokens: TokenStore::new(storage, cookies.clone()),
			cookies,
			limiter: RateLimiter::new(config.min_request_interval),
			refresh_guard: AsyncMutex::new(()),
			observers: RwLock::new(Vec::new()),
		}
	}

	/// Token persistence for this session.
	pub fn tokens(&self) -> &TokenStore {
		&self.tokens
	}

	/// Cookies received from the API.
	pub fn cookies(&self) -> &CookieJar {
		&self.cookies
	}

	/// Global request pacer.
	pub fn limiter(&self) -> &RateLimiter {
		&self.limiter
	}

	pub(crate) fn refresh_guard(&self) -> &AsyncMutex<()> {
		&self.refresh_guard
	}

	/// Registers an observer; observers are notified in registration order.
	pub fn subscribe(&self, observer: impl SessionObserver + 'static) {
		self.observers.write().push(Arc::new(observer));
	}

	/// Delivers `event` to every observer.
	pub fn notify(&self, event: SessionEvent) {
		let observers = self.observers.read().clone();

		for observer in observers {
			observer.notify(&event);
		}
	}

	/// Stores a freshly issued pair and announces it.
	pub fn install_tokens(&self, pair: &TokenPair) -> Result<()> {
		self.tokens.set_pair(pair)?;
		self.notify(SessionEvent::TokensIssued);

		Ok(())
	}

	/// Drops every credential without asking for a new login.
	pub fn clear(&self) {
		if let Err(e) = self.tokens.clear_tokens() {
			obs::log_storage_issue("session.clear", &e);
		}

		self.notify(SessionEvent::TokensCleared);
	}

	/// Ends the session: clears credentials, then requests navigation to the login view.
	pub fn expire(&self, reason: LogoutReason) {
		self.clear();
		self.notify(SessionEvent::LoginRequired { reason });
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("limiter", &self.limiter)
			.field("observers", &self.observers.read().len())
			.finish_non_exhaustive()
	}
}
