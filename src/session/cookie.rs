//! Minimal cookie jar mirroring the cookies visible to the page.

// self
use crate::_prelude::*;

/// Shared name/value cookie jar; cloning shares the same cookies.
#[derive(Clone, Debug, Default)]
pub struct CookieJar(Arc<RwLock<BTreeMap<String, String>>>);
impl CookieJar {
	/// Returns the value of cookie `name`.
	pub fn get(&self, name: &str) -> Option<String> {
		self.0.read().get(name).cloned()
	}

	/// Sets cookie `name` to `value`.
	pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
		self.0.write().insert(name.into(), value.into());
	}

	/// Applies a `Set-Cookie` header value.
	///
	/// Attributes other than `Max-Age` are ignored; `Max-Age` of zero or less deletes the
	/// cookie.
	pub fn absorb_set_cookie(&self, header: &str) {
		let mut parts = header.split(';');
		let Some((name, value)) = parts.next().and_then(|pair| pair.split_once('=')) else {
			return;
		};
		let name = name.trim();

		if name.is_empty() {
			return;
		}

		let expired = parts.filter_map(|attr| attr.split_once('=')).any(|(key, value)| {
			key.trim().eq_ignore_ascii_case("max-age")
				&& value.trim().parse::<i64>().is_ok_and(|secs| secs <= 0)
		});

		if expired {
			self.0.write().remove(name);
		} else {
			self.set(name, value.trim().trim_matches('"'));
		}
	}

	/// Expires every cookie in the jar.
	pub fn expire_all(&self) {
		self.0.write().clear();
	}

	/// Returns `true` if the jar holds no cookies.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
