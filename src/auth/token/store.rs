//! Session-scoped persistence for the access/refresh token pair.

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret, is_token_expired},
	session::CookieJar,
	store::{KeyValueStore, StoreError},
};

const ACCESS_KEY: &str = "access_token";
const REFRESH_KEY: &str = "refresh_token";

/// Stores the token pair in session storage; clearing also expires the page's cookies.
#[derive(Clone)]
pub struct TokenStore {
	storage: Arc<dyn KeyValueStore>,
	cookies: CookieJar,
}
impl TokenStore {
	/// Creates a store over `storage` that expires `cookies` on clear.
	pub fn new(storage: Arc<dyn KeyValueStore>, cookies: CookieJar) -> Self {
		Self { storage, cookies }
	}

	/// Persists the access token and, when provided, the refresh token.
	///
	/// Omitting `refresh` keeps the previously stored refresh token.
	pub fn set_tokens(&self, access: &str, refresh: Option<&str>) -> Result<(), StoreError> {
		self.storage.set(ACCESS_KEY, access.to_owned())?;

		if let Some(refresh) = refresh {
			self.storage.set(REFRESH_KEY, refresh.to_owned())?;
		}

		Ok(())
	}

	/// Persists an issued [`TokenPair`].
	pub fn set_pair(&self, pair: &TokenPair) -> Result<(), StoreError> {
		self.set_tokens(pair.access.expose(), pair.refresh.as_ref().map(TokenSecret::expose))
	}

	/// Returns the stored access token.
	pub fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.storage.get(ACCESS_KEY)?.filter(|t| !t.is_empty()).map(TokenSecret::new))
	}

	/// Returns the stored refresh token.
	pub fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.storage.get(REFRESH_KEY)?.filter(|t| !t.is_empty()).map(TokenSecret::new))
	}

	/// Returns `true` if an access token is stored and not expired.
	pub fn has_valid_access_token(&self) -> Result<bool, StoreError> {
		Ok(self.access_token()?.is_some_and(|token| !is_token_expired(token.expose())))
	}

	/// Removes both tokens and expires every cookie.
	pub fn clear_tokens(&self) -> Result<(), StoreError> {
		self.cookies.expire_all();
		self.storage.remove(ACCESS_KEY)?;
		self.storage.remove(REFRESH_KEY)
	}
}
impl Debug for TokenStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenStore").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{fresh_jwt, stale_jwt},
		store::MemoryStore,
	};

	fn store() -> (TokenStore, CookieJar) {
		let cookies = CookieJar::default();
		let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());

		(TokenStore::new(storage, cookies.clone()), cookies)
	}

	#[test]
	fn clear_removes_both_tokens_and_cookies() {
		let (tokens, cookies) = store();

		cookies.set("csrftoken", "abc");
		tokens.set_tokens("access", Some("refresh")).expect("Storing tokens should succeed.");
		tokens.clear_tokens().expect("Clearing tokens should succeed.");

		assert!(tokens.access_token().expect("Reading access should succeed.").is_none());
		assert!(tokens.refresh_token().expect("Reading refresh should succeed.").is_none());
		assert!(cookies.is_empty());
	}

	#[test]
	fn omitted_refresh_keeps_the_previous_one() {
		let (tokens, _) = store();

		tokens.set_tokens("a-1", Some("r-1")).expect("Storing tokens should succeed.");
		tokens.set_tokens("a-2", None).expect("Rotating access should succeed.");

		let access = tokens.access_token().expect("Reading access should succeed.");
		let refresh = tokens.refresh_token().expect("Reading refresh should succeed.");

		assert_eq!(access.as_ref().map(|t| t.expose()), Some("a-2"));
		assert_eq!(refresh.as_ref().map(|t| t.expose()), Some("r-1"));
	}

	#[test]
	fn validity_tracks_expiry() {
		let (tokens, _) = store();

		assert!(!tokens.has_valid_access_token().expect("Empty store should be readable."));

		tokens.set_tokens(&stale_jwt(), None).expect("Storing tokens should succeed.");

		assert!(!tokens.has_valid_access_token().expect("Stale token should be readable."));

		tokens.set_tokens(&fresh_jwt(), None).expect("Storing tokens should succeed.");

		assert!(tokens.has_valid_access_token().expect("Fresh token should be readable."));
	}
}
