//! Editorial content: news, about page, contact details.

// self
use crate::_prelude::*;

/// News article.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
	/// Primary key.
	pub id: i64,
	/// Headline.
	pub title: String,
	/// URL slug.
	pub slug: String,
	/// Full body; omitted from listings.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	/// Short teaser.
	#[serde(default)]
	pub preview: String,
	/// Media path of the cover image.
	#[serde(default)]
	pub image: Option<String>,
	/// Publication date as sent by the server.
	#[serde(default)]
	pub pub_date: String,
}

/// About page content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutContent {
	/// Heading.
	pub title: String,
	/// Body.
	pub content: String,
	/// Media path of the illustration.
	#[serde(default)]
	pub image: Option<String>,
}

/// Store contact details.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
	/// Phone number.
	pub phone: String,
	/// Email address.
	pub email: String,
	/// Postal address.
	pub address: String,
	/// Embedded map URL.
	#[serde(default)]
	pub map_url: Option<String>,
}

/// Message submitted through the contact form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
	/// Sender name.
	pub name: String,
	/// Sender email.
	pub email: String,
	/// Message body.
	pub message: String,
}
