//! Catalog records: categories, brands, products, tags.

// self
use crate::{
	_prelude::*,
	model::{Related, de_price},
};

/// Product category; categories nest through `parent`/`children`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
	/// Primary key.
	pub id: i64,
	/// Display name.
	pub name: String,
	/// URL slug.
	pub slug: String,
	/// Media path of the category image.
	#[serde(default)]
	pub image: Option<String>,
	/// Parent category id.
	#[serde(default)]
	pub parent: Option<i64>,
	/// Direct subcategories.
	#[serde(default)]
	pub children: Vec<Category>,
	/// Number of products in the category.
	#[serde(default)]
	pub products_count: u64,
}

/// Manufacturer brand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Brand {
	/// Primary key.
	pub id: i64,
	/// Display name.
	pub name: String,
	/// URL slug.
	pub slug: String,
	/// Media path of the logo.
	#[serde(default)]
	pub image: Option<String>,
	/// Free-form description.
	#[serde(default)]
	pub description: Option<String>,
	/// Number of products, when reported.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub products_count: Option<u64>,
}

/// Filters for the public brand listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BrandFilters {
	/// Full-text search.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
	/// Category slug.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	/// Only brands with at least one product.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub has_products: Option<bool>,
	/// Only brands with at least one available product.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub has_available: Option<bool>,
	/// Lower price bound.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price_min: Option<f64>,
	/// Upper price bound.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price_max: Option<f64>,
	/// Ordering expression, e.g. `-name`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ordering: Option<String>,
	/// 1-based page number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Records per page.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_size: Option<u32>,
}

/// Stock-keeping unit sent either as a number or as text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sku {
	/// Numeric SKU.
	Number(i64),
	/// Textual SKU.
	Text(String),
}
impl Default for Sku {
	fn default() -> Self {
		Self::Text(String::new())
	}
}
impl Display for Sku {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Number(n) => write!(f, "{n}"),
			Self::Text(text) => f.write_str(text),
		}
	}
}

/// Product image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
	/// Primary key.
	pub id: i64,
	/// Media path.
	pub image: String,
	/// Whether this is the product's main image.
	#[serde(default)]
	pub is_main: bool,
	/// Display order.
	#[serde(default)]
	pub order: i32,
}

/// Feature/value pair attached to a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFeature {
	/// Primary key.
	pub id: i64,
	/// Feature label, e.g. `Power`.
	pub feature_name: String,
	/// Feature id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub feature_id: Option<i64>,
	/// Value id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value_id: Option<i64>,
	/// Value label, e.g. `40W`.
	#[serde(default)]
	pub value_name: Option<String>,
}

/// Catalog product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
	/// Primary key.
	pub id: i64,
	/// Display name.
	pub name: String,
	/// URL slug.
	pub slug: String,
	/// Long description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Unit price; absent for price-on-request products.
	#[serde(default, deserialize_with = "de_price")]
	pub price: Option<f64>,
	/// Whether the product can be ordered.
	#[serde(default)]
	pub is_available: bool,
	/// Owning category.
	pub category: Related<Category>,
	/// Category label, when flattened by the server.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category_name: Option<String>,
	/// Main image.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub main_image: Option<Image>,
	/// Every image.
	#[serde(default)]
	pub images: Vec<Image>,
	/// Feature/value pairs.
	#[serde(default)]
	pub features: Vec<ProductFeature>,
	/// Manufacturer SKU.
	#[serde(default)]
	pub manufacturer_sku: Sku,
	/// Internal SKU.
	#[serde(default)]
	pub internal_sku: Sku,
	/// Brand reference.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub brand: Option<Related<Brand>>,
	/// Flat tags.
	#[serde(default)]
	pub tags: Vec<Tag>,
	/// Grouped tags.
	#[serde(default)]
	pub tag_groups: Vec<ProductTagGroup>,
}

/// Filters for the public product listing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProductFilters {
	/// Category slug.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	/// Lower price bound.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price_min: Option<f64>,
	/// Upper price bound.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price_max: Option<f64>,
	/// Brand slug.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub brand: Option<String>,
	/// Quick filter expression.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quick: Option<String>,
	/// Only available products.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_available: Option<bool>,
	/// Ordering expression, e.g. `price`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ordering: Option<String>,
	/// 1-based page number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Records per page.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_size: Option<u32>,
}

/// Price bounds of a product set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
	/// Lowest price.
	#[serde(default, deserialize_with = "de_price")]
	pub min_price: Option<f64>,
	/// Highest price.
	#[serde(default, deserialize_with = "de_price")]
	pub max_price: Option<f64>,
}

/// Product tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
	/// Primary key.
	pub id: i64,
	/// Display name.
	pub name: String,
	/// URL slug.
	pub slug: String,
	/// Category the tag belongs to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<i64>,
}

/// Named group of tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTagGroup {
	/// Primary key.
	pub id: i64,
	/// Group label.
	pub group_name: String,
	/// Tags in the group.
	#[serde(default)]
	pub tags: Vec<Tag>,
}

/// Category tag listing; the server answers either flat or grouped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagListing {
	/// Tags grouped by tag name.
	Grouped(Vec<ProductTagGroup>),
	/// Plain tag list.
	Flat(Vec<Tag>),
}
impl TagListing {
	/// Flattens the listing into individual tags.
	pub fn into_tags(self) -> Vec<Tag> {
		match self {
			Self::Grouped(groups) => groups.into_iter().flat_map(|group| group.tags).collect(),
			Self::Flat(tags) => tags,
		}
	}
}
