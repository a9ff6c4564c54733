//! News, about page and contact endpoints.

// self
use crate::{
	_prelude::*,
	api,
	client::{ApiClient, ApiRequest},
	model::{AboutContent, ContactInfo, ContactMessage, NewsItem, Paginated},
};

/// `/news/` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct News<'a> {
	pub(crate) client: &'a ApiClient,
}
impl News<'_> {
	/// Lists news; a `limit` of zero or `None` applies the server default.
	pub async fn list(&self, limit: Option<u32>) -> Result<Paginated<NewsItem>> {
		let mut request = ApiRequest::get("/news/");

		if let Some(limit) = limit.filter(|limit| *limit > 0) {
			request = request.query("limit", limit);
		}

		self.client.fetch(request).await
	}

	/// Fetches one article with its full body.
	pub async fn by_slug(&self, slug: &str) -> Result<NewsItem> {
		self.client.get_json(&format!("/news/{}/", api::ensure_slug(slug)?)).await
	}
}

/// `/about/` endpoint.
#[derive(Clone, Copy, Debug)]
pub struct About<'a> {
	pub(crate) client: &'a ApiClient,
}
impl About<'_> {
	/// Fetches the about page.
	pub async fn get(&self) -> Result<AboutContent> {
		self.client.get_json("/about/").await
	}
}

/// `/contact/` endpoints.
#[derive(Clone, Copy, Debug)]
pub struct Contact<'a> {
	pub(crate) client: &'a ApiClient,
}
impl Contact<'_> {
	/// Fetches the store's contact details.
	pub async fn info(&self) -> Result<ContactInfo> {
		self.client.get_json("/contact/").await
	}

	/// Submits the contact form.
	///
	/// Name and message must be non-blank and the email well-formed; otherwise nothing is
	/// sent.
	pub async fn send_message(&self, message: &ContactMessage) -> Result<serde_json::Value> {
		api::ensure_filled("name", &message.name)?;
		api::ensure_email(&message.email)?;
		api::ensure_filled("message", &message.message)?;

		self.client.fetch(ApiRequest::post("/contact/message/").json(message)?).await
	}
}
