//! Public catalog endpoints: categories, products, brands, tags.

// self
use crate::{
	_prelude::*,
	api::{self, PRODUCT_IMAGE_LIMIT},
	client::{ApiClient, ApiRequest},
	http::FilePart,
	model::{
		Brand, BrandFilters, Category, PageQuery, Paginated, PriceRange, Product, ProductFilters,
		Tag, TagListing,
	},
};

/// `/categories/` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Categories<'a> {
	pub(crate) client: &'a ApiClient,
}
impl Categories<'_> {
	/// Lists categories; a `limit` of zero or `None` applies the server default.
	pub async fn list(&self, limit: Option<u32>) -> Result<Paginated<Category>> {
		let mut request = ApiRequest::get("/categories/");

		if let Some(limit) = limit.filter(|limit| *limit > 0) {
			request = request.query("limit", limit);
		}

		self.client.fetch(request).await
	}

	/// Fetches one category.
	pub async fn by_slug(&self, slug: &str) -> Result<Category> {
		self.client.get_json(&format!("/categories/{}/", api::ensure_slug(slug)?)).await
	}

	/// Lists the products of a category; `params` is any serializable filter object.
	pub async fn products<P>(&self, slug: &str, params: &P) -> Result<Paginated<Product>>
	where
		P: ?Sized + Serialize,
	{
		let path = format!("/categories/{}/products/", api::ensure_slug(slug)?);

		self.client.fetch(ApiRequest::get(path).query_from(params)?).await
	}

	/// Price bounds of a category's products.
	pub async fn price_range(&self, slug: &str) -> Result<PriceRange> {
		self.client.get_json(&format!("/categories/{}/price-range/", api::ensure_slug(slug)?)).await
	}

	/// Brands present in a category.
	pub async fn brands(&self, slug: &str) -> Result<Vec<Brand>> {
		self.client.get_json(&format!("/categories/{}/brands/", api::ensure_slug(slug)?)).await
	}

	/// Tags used in a category, flat or grouped.
	pub async fn tags(&self, slug: &str) -> Result<TagListing> {
		self.client.get_json(&format!("/categories/{}/tags/", api::ensure_slug(slug)?)).await
	}

	/// First three categories, used for the home page.
	pub async fn featured(&self) -> Result<Paginated<Category>> {
		self.client.fetch(ApiRequest::get("/categories/").query_from(&PageQuery::new(1, 3))?).await
	}
}

/// `/products/` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Products<'a> {
	pub(crate) client: &'a ApiClient,
}
impl Products<'_> {
	/// Lists products.
	pub async fn list(&self, filters: &ProductFilters) -> Result<Paginated<Product>> {
		self.client.fetch(ApiRequest::get("/products/").query_from(filters)?).await
	}

	/// Full-text product search combined with `filters`.
	pub async fn search(
		&self,
		query: &str,
		filters: &ProductFilters,
	) -> Result<Paginated<Product>> {
		let request = ApiRequest::get("/products/").query("search", query).query_from(filters)?;

		self.client.fetch(request).await
	}

	/// Products carrying a feature value.
	pub async fn by_feature_value(&self, value: &str) -> Result<Vec<Product>> {
		api::ensure_filled("value", value)?;

		self.client.fetch(ApiRequest::get("/products/by-feature/").query("value", value)).await
	}

	/// Fetches one product.
	pub async fn by_slug(&self, slug: &str) -> Result<Product> {
		self.client.get_json(&format!("/products/{}/", api::ensure_slug(slug)?)).await
	}

	/// Lists the products of a brand.
	pub async fn by_brand(&self, brand_slug: &str, page: PageQuery) -> Result<Paginated<Product>> {
		let path = format!("/brands/{}/products/", api::ensure_slug(brand_slug)?);

		self.client.fetch(ApiRequest::get(path).query_from(&page)?).await
	}

	/// Price bounds of a category's products.
	pub async fn price_range(&self, category_slug: &str) -> Result<PriceRange> {
		let request = ApiRequest::get("/products/price-range/")
			.query("category", api::ensure_slug(category_slug)?);

		self.client.fetch(request).await
	}

	/// Creates a product from any serializable payload.
	pub async fn create<B>(&self, data: &B) -> Result<Product>
	where
		B: ?Sized + Serialize,
	{
		self.client.fetch(ApiRequest::post("/products/").json(data)?).await
	}

	/// Partially updates a product.
	pub async fn update<B>(&self, slug: &str, data: &B) -> Result<Product>
	where
		B: ?Sized + Serialize,
	{
		let path = format!("/products/{}/", api::ensure_slug(slug)?);

		self.client.fetch(ApiRequest::patch(path).json(data)?).await
	}

	/// Deletes a product.
	pub async fn delete(&self, slug: &str) -> Result<()> {
		let path = format!("/products/{}/", api::ensure_slug(slug)?);

		self.client.perform(ApiRequest::delete(path)).await
	}

	/// Uploads product images; every file must fit [`PRODUCT_IMAGE_LIMIT`].
	pub async fn upload_images(
		&self,
		slug: &str,
		files: Vec<FilePart>,
	) -> Result<serde_json::Value> {
		let path = format!("/products/{}/upload-image/", api::ensure_slug(slug)?);
		let request = api::upload_request(path, "product image", files, PRODUCT_IMAGE_LIMIT)?;

		self.client.fetch(request).await
	}
}

/// `/brands/` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Brands<'a> {
	pub(crate) client: &'a ApiClient,
}
impl Brands<'_> {
	/// Lists brands.
	pub async fn list(&self, filters: &BrandFilters) -> Result<Paginated<Brand>> {
		self.client.fetch(ApiRequest::get("/brands/").query_from(filters)?).await
	}

	/// Fetches one brand by id.
	pub async fn by_id(&self, id: i64) -> Result<Brand> {
		self.client.get_json(&format!("/brands/{}/", api::ensure_id("brand", id)?)).await
	}

	/// Fetches one brand by slug.
	pub async fn by_slug(&self, slug: &str) -> Result<Brand> {
		self.client.get_json(&format!("/brands/{}/", api::ensure_slug(slug)?)).await
	}

	/// Categories a brand has products in.
	pub async fn categories(&self, slug: &str) -> Result<Vec<Category>> {
		self.client.get_json(&format!("/brands/{}/categories/", api::ensure_slug(slug)?)).await
	}

	/// Tags used by a brand's products.
	pub async fn tags(&self, slug: &str) -> Result<Vec<Tag>> {
		self.client.get_json(&format!("/brands/{}/tags/", api::ensure_slug(slug)?)).await
	}

	/// Lists a brand's products; `params` is any serializable filter object.
	pub async fn products<P>(&self, slug: &str, params: &P) -> Result<Paginated<Product>>
	where
		P: ?Sized + Serialize,
	{
		let path = format!("/brands/{}/products/", api::ensure_slug(slug)?);

		self.client.fetch(ApiRequest::get(path).query_from(params)?).await
	}
}

/// `/tags/` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Tags<'a> {
	pub(crate) client: &'a ApiClient,
}
impl Tags<'_> {
	/// Lists tags; `params` is any serializable filter object.
	pub async fn list<P>(&self, params: &P) -> Result<Paginated<Tag>>
	where
		P: ?Sized + Serialize,
	{
		self.client.fetch(ApiRequest::get("/tags/").query_from(params)?).await
	}
}
