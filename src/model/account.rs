//! Admin account records and auth payloads.

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
};

/// Signed-in admin user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Primary key.
	pub id: i64,
	/// Login name.
	#[serde(default)]
	pub username: String,
	/// Email address.
	#[serde(default)]
	pub email: String,
	/// Given name.
	#[serde(default)]
	pub first_name: String,
	/// Family name.
	#[serde(default)]
	pub last_name: String,
	/// Staff flag.
	#[serde(default)]
	pub is_staff: bool,
	/// Superuser flag.
	#[serde(default)]
	pub is_superuser: bool,
	/// Registration timestamp as sent by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub date_joined: Option<String>,
	/// Last login timestamp as sent by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_login: Option<String>,
}
impl User {
	/// Returns `true` for staff or superusers.
	pub fn is_admin(&self) -> bool {
		self.is_staff || self.is_superuser
	}

	/// Given and family name joined by a space, or the username when both are blank.
	pub fn full_name(&self) -> String {
		let parts = [self.first_name.trim(), self.last_name.trim()]
			.into_iter()
			.filter(|part| !part.is_empty())
			.collect::<Vec<_>>();

		if parts.is_empty() { self.username.clone() } else { parts.join(" ") }
	}
}

/// Body of a successful login.
///
/// Tokens arrive either at the top level or nested under `tokens`; cookie-only deployments
/// send none.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
	/// Signed-in user.
	pub user: User,
	/// Top-level access token.
	#[serde(default)]
	pub access: Option<TokenSecret>,
	/// Top-level refresh token.
	#[serde(default)]
	pub refresh: Option<TokenSecret>,
	/// Nested token pair.
	#[serde(default)]
	pub tokens: Option<TokenPair>,
}
impl LoginResponse {
	/// Returns the issued token pair, whichever shape it arrived in.
	pub fn token_pair(&self) -> Option<TokenPair> {
		if let Some(pair) = &self.tokens {
			return Some(pair.clone());
		}

		self.access.clone().map(|access| TokenPair { access, refresh: self.refresh.clone() })
	}
}

/// Credentials for the login endpoint.
#[derive(Clone, Serialize)]
pub struct Credentials {
	/// Login name.
	pub username: String,
	/// Password.
	pub password: String,
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("username", &self.username)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Password change request.
#[derive(Clone, Serialize)]
pub struct PasswordChange {
	/// Current password.
	pub old_password: String,
	/// Replacement password.
	pub new_password: String,
}
impl Debug for PasswordChange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PasswordChange").finish_non_exhaustive()
	}
}

/// Partial profile update; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
	/// New email address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// New given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// New family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
}

/// Filters accepted by the admin listings; each endpoint honors its own subset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AdminQuery {
	/// Full-text search.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
	/// Category id.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<i64>,
	/// Brand id.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub brand: Option<i64>,
	/// Parent category id.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub parent: Option<i64>,
	/// Product id.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub product: Option<i64>,
	/// Availability filter.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_available: Option<bool>,
	/// Publication filter.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_published: Option<bool>,
	/// Processing filter for contact messages.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_processed: Option<bool>,
	/// Ordering expression.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ordering: Option<String>,
	/// 1-based page number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Records per page.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_size: Option<u32>,
}
