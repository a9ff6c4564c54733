//! Typed wrappers for every storefront and admin resource.
//!
//! Each wrapper borrows an [`ApiClient`] and maps one method to one verb + path. Inputs are
//! validated before anything is dispatched: identifiers must be positive, slugs must be a
//! single path segment, uploads must fit the resource's size ceiling, and email addresses
//! must be well-formed.

pub mod admin;
pub mod catalog;
pub mod commerce;
pub mod content;

pub use admin::*;
pub use catalog::*;
pub use commerce::*;
pub use content::*;

// self
use crate::{
	_prelude::*,
	client::{ApiClient, ApiRequest},
	error::ValidationError,
	http::FilePart,
};

const MIB: usize = 1024 * 1024;

/// Size ceiling for category images.
pub const CATEGORY_IMAGE_LIMIT: usize = 5 * MIB;
/// Size ceiling for brand logos.
pub const BRAND_LOGO_LIMIT: usize = 2 * MIB;
/// Size ceiling for product images.
pub const PRODUCT_IMAGE_LIMIT: usize = 10 * MIB;

impl ApiClient {
	/// Public category endpoints.
	pub fn categories(&self) -> Categories<'_> {
		Categories { client: self }
	}

	/// Public product endpoints.
	pub fn products(&self) -> Products<'_> {
		Products { client: self }
	}

	/// Public brand endpoints.
	pub fn brands(&self) -> Brands<'_> {
		Brands { client: self }
	}

	/// Public tag endpoints.
	pub fn tags(&self) -> Tags<'_> {
		Tags { client: self }
	}

	/// News endpoints.
	pub fn news(&self) -> News<'_> {
		News { client: self }
	}

	/// About page endpoint.
	pub fn about(&self) -> About<'_> {
		About { client: self }
	}

	/// Contact endpoints.
	pub fn contact(&self) -> Contact<'_> {
		Contact { client: self }
	}

	/// Order endpoints.
	pub fn orders(&self) -> Orders<'_> {
		Orders { client: self }
	}

	/// Review endpoints.
	pub fn reviews(&self) -> Reviews<'_> {
		Reviews { client: self }
	}

	/// Admin endpoints.
	pub fn admin(&self) -> Admin<'_> {
		Admin { client: self }
	}
}

/// Rejects identifiers that are not positive.
pub fn ensure_id(resource: &'static str, id: i64) -> Result<i64, ValidationError> {
	if id > 0 { Ok(id) } else { Err(ValidationError::InvalidId { resource, id }) }
}

/// Rejects slugs that are empty or would escape their path segment.
pub fn ensure_slug(value: &str) -> Result<&str, ValidationError> {
	let invalid = value.is_empty()
		|| value == "."
		|| value == ".."
		|| value.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '?' | '#'));

	if invalid { Err(ValidationError::InvalidSlug { value: value.to_owned() }) } else { Ok(value) }
}

/// Rejects blank required fields.
pub fn ensure_filled(field: &'static str, value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() { Err(ValidationError::EmptyField { field }) } else { Ok(()) }
}

/// Rejects malformed email addresses.
///
/// Requires exactly one `@`, a non-empty local part, and a dotted domain without leading,
/// trailing or doubled dots.
pub fn ensure_email(value: &str) -> Result<(), ValidationError> {
	let malformed = || ValidationError::InvalidEmail { value: value.to_owned() };
	let trimmed = value.trim();

	if trimmed.chars().any(char::is_whitespace) {
		return Err(malformed());
	}

	let (local, domain) = trimmed.split_once('@').ok_or_else(malformed)?;
	let labels_ok = domain.split('.').count() >= 2 && domain.split('.').all(|l| !l.is_empty());

	if local.is_empty() || domain.contains('@') || !labels_ok {
		return Err(malformed());
	}

	Ok(())
}

/// Rejects uploads larger than `limit` bytes.
pub fn ensure_upload(
	resource: &'static str,
	file: &FilePart,
	limit: usize,
) -> Result<(), ValidationError> {
	if file.len() > limit {
		return Err(ValidationError::UploadTooLarge {
			resource,
			file_name: file.file_name.clone(),
			size: file.len(),
			limit,
		});
	}

	Ok(())
}

fn upload_request(
	path: String,
	resource: &'static str,
	files: Vec<FilePart>,
	limit: usize,
) -> Result<ApiRequest> {
	if files.is_empty() {
		return Err(ValidationError::EmptyField { field: "files" }.into());
	}

	for file in &files {
		ensure_upload(resource, file, limit)?;
	}

	Ok(ApiRequest::post(path).multipart(Vec::new(), files))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_must_be_positive() {
		assert_eq!(ensure_id("product", 3), Ok(3));
		assert_eq!(
			ensure_id("product", 0),
			Err(ValidationError::InvalidId { resource: "product", id: 0 })
		);
		assert!(ensure_id("product", -4).is_err());
	}

	#[test]
	fn slugs_stay_inside_one_segment() {
		assert_eq!(ensure_slug("desk-lamp"), Ok("desk-lamp"));

		for bad in ["", ".", "..", "a/b", "a b", "a?x=1", "a#top", "a\\b"] {
			assert!(ensure_slug(bad).is_err(), "Slug {bad:?} should be rejected.");
		}
	}

	#[test]
	fn email_shape_is_checked() {
		for good in ["user@example.com", " a.b+c@mail.example.uz "] {
			assert!(ensure_email(good).is_ok(), "Email {good:?} should be accepted.");
		}

		let malformed = [
			"",
			"plain",
			"@example.com",
			"user@",
			"user@localhost",
			"a@b@c.com",
			"u@.com",
			"u@x..com",
			"a b@c.com",
		];

		for bad in malformed {
			assert!(ensure_email(bad).is_err(), "Email {bad:?} should be rejected.");
		}
	}

	#[test]
	fn uploads_are_size_checked() {
		let small = FilePart::new("image", "a.png", "image/png", vec![0; 16]);
		let big = FilePart::new("logo", "b.png", "image/png", vec![0; BRAND_LOGO_LIMIT + 1]);

		assert!(ensure_upload("brand logo", &small, BRAND_LOGO_LIMIT).is_ok());
		assert!(matches!(
			ensure_upload("brand logo", &big, BRAND_LOGO_LIMIT),
			Err(ValidationError::UploadTooLarge { size, limit: BRAND_LOGO_LIMIT, .. })
				if size == BRAND_LOGO_LIMIT + 1
		));
		assert!(upload_request("/x/".into(), "brand logo", Vec::new(), BRAND_LOGO_LIMIT).is_err());
	}
}
