//! Expiry inspection for JWT-shaped access tokens.
//!
//! Only the `exp` claim of the payload segment is read; signatures are never verified.
//! Anything that cannot be decoded counts as expired.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Extracts the `exp` claim (seconds since the Unix epoch) from a compact JWT.
pub fn token_expiry(token: &str) -> Option<OffsetDateTime> {
	let mut segments = token.trim().split('.');
	let (Some(_header), Some(payload), Some(_signature), None) =
		(segments.next(), segments.next(), segments.next(), segments.next())
	else {
		return None;
	};
	let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
	let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
	let exp = claims.get("exp")?.as_f64().filter(|exp| exp.is_finite())?;

	OffsetDateTime::from_unix_timestamp(exp.floor() as i64).ok()
}

/// Returns `true` when `token` is expired at `now` or cannot be parsed.
pub fn is_token_expired_at(token: &str, now: OffsetDateTime) -> bool {
	match token_expiry(token) {
		Some(expires_at) => now >= expires_at,
		None => true,
	}
}

/// Returns `true` when `token` is expired relative to the current clock or cannot be parsed.
pub fn is_token_expired(token: &str) -> bool {
	is_token_expired_at(token, OffsetDateTime::now_utc())
}
