//! Wire types exchanged with the storefront API.

pub mod account;
pub mod catalog;
pub mod commerce;
pub mod content;

pub use account::*;
pub use catalog::*;
pub use commerce::*;
pub use content::*;

// self
use crate::_prelude::*;

/// One page of a paginated listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
	/// Total number of matching records.
	#[serde(default)]
	pub count: u64,
	/// URL of the next page.
	#[serde(default)]
	pub next: Option<String>,
	/// URL of the previous page.
	#[serde(default)]
	pub previous: Option<String>,
	/// Records on this page.
	pub results: Vec<T>,
	/// Current page number, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Total number of pages, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_pages: Option<u32>,
	/// Lowest price across the full result set, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_price: Option<f64>,
	/// Highest price across the full result set, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_price: Option<f64>,
}
impl<T> Paginated<T> {
	/// Returns `true` if another page follows.
	pub fn has_next(&self) -> bool {
		self.next.is_some()
	}
}

/// Page selector accepted by paginated endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageQuery {
	/// 1-based page number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Records per page.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_size: Option<u32>,
}
impl PageQuery {
	/// Selects `page` with `page_size` records.
	pub fn new(page: u32, page_size: u32) -> Self {
		Self { page: Some(page), page_size: Some(page_size) }
	}
}

/// Reference to another record: its id, its slug, or the embedded record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<T> {
	/// Numeric primary key.
	Id(i64),
	/// Slug or display name.
	Slug(String),
	/// Embedded record.
	Object(Box<T>),
}
impl<T> Related<T> {
	/// Returns the embedded record, if any.
	pub fn object(&self) -> Option<&T> {
		match self {
			Self::Object(record) => Some(record),
			_ => None,
		}
	}
}

/// Accepts prices sent either as JSON numbers or as decimal strings.
pub(crate) fn de_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(f64),
		Text(String),
	}

	match Option::<Raw>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Raw::Number(value)) => Ok(Some(value)),
		Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
		Some(Raw::Text(text)) => text.trim().parse().map(Some).map_err(serde::de::Error::custom),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn paginated_pages_decode_with_optional_extras() {
		let page: Paginated<Tag> = serde_json::from_value(serde_json::json!({
			"count": 1,
			"next": null,
			"previous": null,
			"results": [{ "id": 3, "name": "LED", "slug": "led" }],
			"min_price": 10.5
		}))
		.expect("Paginated payloads should decode.");

		assert_eq!(page.results[0].slug, "led");
		assert_eq!(page.min_price, Some(10.5));
		assert!(!page.has_next());
	}

	#[test]
	fn related_accepts_ids_slugs_and_objects() {
		let refs: Vec<Related<Brand>> = serde_json::from_value(serde_json::json!([
			7,
			"philips",
			{ "id": 1, "name": "Philips", "slug": "philips", "image": null, "description": null }
		]))
		.expect("Related references should decode.");

		assert_eq!(refs[0], Related::Id(7));
		assert_eq!(refs[1], Related::Slug("philips".into()));
		assert_eq!(refs[2].object().map(|b| b.name.as_str()), Some("Philips"));
	}
}
