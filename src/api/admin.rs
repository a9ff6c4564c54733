//! Admin endpoints: dashboard, CRUD trees, uploads, settings.

pub mod auth;

pub use auth::*;

// self
use crate::{
	_prelude::*,
	api::{self, BRAND_LOGO_LIMIT, CATEGORY_IMAGE_LIMIT, PRODUCT_IMAGE_LIMIT},
	client::{ApiClient, ApiRequest},
	http::FilePart,
	model::{AboutContent, AdminQuery, ContactInfo, Paginated},
};

/// Entry point for every `/admin/` endpoint.
#[derive(Clone, Copy, Debug)]
pub struct Admin<'a> {
	pub(crate) client: &'a ApiClient,
}
impl<'a> Admin<'a> {
	/// Login, logout and profile endpoints.
	pub fn auth(&self) -> AdminAuth<'a> {
		AdminAuth { client: self.client }
	}

	/// About page and contact details editors.
	pub fn settings(&self) -> AdminSettings<'a> {
		AdminSettings { client: self.client }
	}

	/// Dashboard counters; the shape is server-defined.
	pub async fn stats(&self) -> Result<serde_json::Value> {
		self.client.get_json("/admin/stats/").await
	}

	/// Features, tags, tag names and feature values available in a category.
	pub async fn category_data(&self, category_id: i64) -> Result<serde_json::Value> {
		let request = ApiRequest::get("/features-tags-by-category/")
			.query("category", api::ensure_id("category", category_id)?);

		self.client.fetch(request).await
	}

	/// `/admin/categories/`.
	pub fn categories(&self) -> AdminResource<'a> {
		self.resource("/admin/categories/", "category")
	}

	/// `/admin/brands/`.
	pub fn brands(&self) -> AdminResource<'a> {
		self.resource("/admin/brands/", "brand")
	}

	/// `/admin/tags/`.
	pub fn tags(&self) -> AdminResource<'a> {
		self.resource("/admin/tags/", "tag")
	}

	/// `/admin/tag-names/`.
	pub fn tag_names(&self) -> AdminResource<'a> {
		self.resource("/admin/tag-names/", "tag name")
	}

	/// `/admin/features/`.
	pub fn features(&self) -> AdminResource<'a> {
		self.resource("/admin/features/", "feature")
	}

	/// `/admin/feature-values/`.
	pub fn feature_values(&self) -> AdminResource<'a> {
		self.resource("/admin/feature-values/", "feature value")
	}

	/// `/admin/news/`.
	pub fn news(&self) -> AdminResource<'a> {
		self.resource("/admin/news/", "news item")
	}

	/// `/admin/images/`.
	pub fn images(&self) -> AdminResource<'a> {
		self.resource("/admin/images/", "image")
	}

	/// `/admin/products/`.
	pub fn products(&self) -> AdminResource<'a> {
		self.resource("/admin/products/", "product")
	}

	/// `/admin/messages/`.
	pub fn messages(&self) -> AdminResource<'a> {
		self.resource("/admin/messages/", "message")
	}

	/// Replaces a category image; limited to [`CATEGORY_IMAGE_LIMIT`].
	pub async fn upload_category_image<T>(&self, id: i64, image: FilePart) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let path = format!("/admin/categories/{}/upload-image/", api::ensure_id("category", id)?);
		let request = api::upload_request(
			path,
			"category image",
			vec![renamed(image, "image")],
			CATEGORY_IMAGE_LIMIT,
		)?;

		self.client.fetch(request).await
	}

	/// Replaces a brand logo; limited to [`BRAND_LOGO_LIMIT`].
	pub async fn upload_brand_logo<T>(&self, id: i64, logo: FilePart) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let path = format!("/admin/brands/{}/upload-logo/", api::ensure_id("brand", id)?);
		let request =
			api::upload_request(path, "brand logo", vec![renamed(logo, "logo")], BRAND_LOGO_LIMIT)?;

		self.client.fetch(request).await
	}

	/// Attaches images to a product; each is limited to [`PRODUCT_IMAGE_LIMIT`].
	pub async fn upload_product_images<T>(&self, id: i64, images: Vec<FilePart>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let path = format!("/admin/products/{}/upload-image/", api::ensure_id("product", id)?);
		let request = api::upload_request(path, "product image", images, PRODUCT_IMAGE_LIMIT)?;

		self.client.fetch(request).await
	}

	/// Detaches one image from a product.
	pub async fn delete_product_image(&self, product_id: i64, image_id: i64) -> Result<()> {
		let path = format!(
			"/admin/products/{}/delete-image/{}/",
			api::ensure_id("product", product_id)?,
			api::ensure_id("image", image_id)?
		);

		self.client.perform(ApiRequest::delete(path)).await
	}

	/// Flags a contact message as handled or not.
	pub async fn set_message_processed(&self, id: i64, processed: bool) -> Result<()> {
		let action = if processed { "mark-processed" } else { "mark-unprocessed" };
		let path = format!("/admin/messages/{}/{action}/", api::ensure_id("message", id)?);

		self.client.perform(ApiRequest::post(path)).await
	}

	fn resource(&self, path: &'static str, label: &'static str) -> AdminResource<'a> {
		AdminResource { client: self.client, path, label }
	}
}

/// Generic CRUD collection under `/admin/`.
///
/// Record shapes vary per collection, so every method is generic over the payload and
/// response types; `serde_json::Value` works everywhere.
#[derive(Clone, Copy, Debug)]
pub struct AdminResource<'a> {
	client: &'a ApiClient,
	path: &'static str,
	label: &'static str,
}
impl AdminResource<'_> {
	/// Collection path, e.g. `/admin/brands/`.
	pub fn path(&self) -> &'static str {
		self.path
	}

	/// Lists records matching `query`.
	pub async fn list<T>(&self, query: &AdminQuery) -> Result<Paginated<T>>
	where
		T: DeserializeOwned,
	{
		self.client.fetch(ApiRequest::get(self.path).query_from(query)?).await
	}

	/// Fetches one record.
	pub async fn get<T>(&self, id: i64) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.client.get_json(&self.record_path(id)?).await
	}

	/// Creates a record.
	pub async fn create<T, B>(&self, data: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.client.fetch(ApiRequest::post(self.path).json(data)?).await
	}

	/// Partially updates a record.
	pub async fn update<T, B>(&self, id: i64, data: &B) -> Result<T>
	where
		T: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		self.client.fetch(ApiRequest::patch(self.record_path(id)?).json(data)?).await
	}

	/// Deletes a record.
	pub async fn delete(&self, id: i64) -> Result<()> {
		self.client.perform(ApiRequest::delete(self.record_path(id)?)).await
	}

	fn record_path(&self, id: i64) -> Result<String> {
		Ok(format!("{}{}/", self.path, api::ensure_id(self.label, id)?))
	}
}

/// `/admin/about/` and `/admin/contact/` editors.
#[derive(Clone, Copy, Debug)]
pub struct AdminSettings<'a> {
	client: &'a ApiClient,
}
impl AdminSettings<'_> {
	/// Fetches the editable about page.
	pub async fn about(&self) -> Result<AboutContent> {
		self.client.get_json("/admin/about/").await
	}

	/// Replaces the about page.
	pub async fn update_about(&self, content: &AboutContent) -> Result<AboutContent> {
		self.client.fetch(ApiRequest::put("/admin/about/").json(content)?).await
	}

	/// Fetches the editable contact details.
	pub async fn contact(&self) -> Result<ContactInfo> {
		self.client.get_json("/admin/contact/").await
	}

	/// Replaces the contact details; the email must be well-formed.
	pub async fn update_contact(&self, info: &ContactInfo) -> Result<ContactInfo> {
		api::ensure_email(&info.email)?;

		self.client.fetch(ApiRequest::put("/admin/contact/").json(info)?).await
	}
}

fn renamed(mut part: FilePart, field: &str) -> FilePart {
	field.clone_into(&mut part.field);

	part
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, error::ValidationError, http::Method};

	#[tokio::test]
	async fn resources_build_record_paths() {
		let transport = StubTransport::default();

		transport
			.reply(
				Method::Get,
				"/api/admin/brands/",
				StubReply::json(200, serde_json::json!({ "count": 1, "results": [{ "id": 2 }] })),
			)
			.reply(
				Method::Patch,
				"/api/admin/brands/2/",
				StubReply::json(200, serde_json::json!({ "id": 2, "name": "Osram" })),
			)
			.reply(Method::Delete, "/api/admin/brands/2/", StubReply::empty(204));

		let (client, _) = stub_client(transport.clone());
		let brands = client.admin().brands();
		let query = AdminQuery { search: Some("os".into()), ..Default::default() };
		let page = brands.list::<serde_json::Value>(&query).await.expect("Listing should load.");

		assert_eq!(page.count, 1);

		let updated: serde_json::Value = brands
			.update(2, &serde_json::json!({ "name": "Osram" }))
			.await
			.expect("Update should succeed.");

		assert_eq!(updated["name"], "Osram");

		brands.delete(2).await.expect("Delete should succeed.");

		assert!(matches!(
			brands.get::<serde_json::Value>(-1).await,
			Err(Error::Validation(ValidationError::InvalidId { resource: "brand", id: -1 }))
		));
		assert_eq!(transport.requests()[0].url.query(), Some("search=os"));
		assert_eq!(transport.requests().len(), 3);
	}

	#[tokio::test]
	async fn uploads_use_resource_field_names_and_limits() {
		let transport = StubTransport::default();

		transport.reply(
			Method::Post,
			"/api/admin/brands/4/upload-logo/",
			StubReply::json(200, serde_json::json!({ "logo": "/media/brands/4.png" })),
		);

		let (client, _) = stub_client(transport.clone());
		let logo = FilePart::new("file", "logo.png", "image/png", vec![1; 64]);
		let big = FilePart::new("file", "cat.jpg", "image/jpeg", vec![1; CATEGORY_IMAGE_LIMIT + 1]);

		client
			.admin()
			.upload_brand_logo::<serde_json::Value>(4, logo)
			.await
			.expect("Small logos should upload.");

		let oversized = client.admin().upload_category_image::<serde_json::Value>(4, big).await;

		assert!(matches!(
			oversized,
			Err(Error::Validation(ValidationError::UploadTooLarge {
				limit: CATEGORY_IMAGE_LIMIT,
				..
			}))
		));

		let sent = transport.requests();

		assert_eq!(sent.len(), 1);

		let crate::http::RequestBody::Multipart { files, .. } = &sent[0].body else {
			panic!("Upload should be sent as multipart.");
		};

		assert_eq!(files[0].field, "logo");
	}

	#[tokio::test]
	async fn message_flags_and_image_deletion_hit_action_paths() {
		let transport = StubTransport::default();

		transport
			.reply(Method::Post, "/api/admin/messages/9/mark-unprocessed/", StubReply::empty(204))
			.reply(Method::Delete, "/api/admin/products/3/delete-image/8/", StubReply::empty(204));

		let (client, _) = stub_client(transport.clone());

		client.admin().set_message_processed(9, false).await.expect("Flag should be cleared.");
		client.admin().delete_product_image(3, 8).await.expect("Image should be detached.");

		assert_eq!(transport.requests().len(), 2);
	}
}
