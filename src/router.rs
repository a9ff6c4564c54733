//! Navigation table and the admin route guard.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::AuthState};

/// Path of the admin login view.
pub const LOGIN_ROUTE: &str = "/admin/login";
/// Landing path after signing in.
pub const ADMIN_HOME: &str = "/admin";

/// Who may open a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
	/// Everyone.
	Public,
	/// Only visitors who are not signed in.
	GuestOnly,
	/// Only signed-in users.
	AuthOnly,
}

/// One entry of the route table.
///
/// Patterns are `/`-separated; `:name` captures one segment and a trailing `*` matches
/// whatever remains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
	/// Stable route name.
	pub name: &'static str,
	/// Path pattern.
	pub pattern: &'static str,
	/// Access rule.
	pub access: Access,
}

/// Storefront and admin routes, matched first to last.
pub const ROUTES: &[Route] = &[
	Route { name: "Home", pattern: "/", access: Access::Public },
	Route { name: "Brand", pattern: "/brands/:slug", access: Access::Public },
	Route { name: "AllBrands", pattern: "/brands", access: Access::Public },
	Route { name: "Catalog", pattern: "/catalog", access: Access::Public },
	Route { name: "CategoryProducts", pattern: "/catalog/:categorySlug", access: Access::Public },
	Route { name: "ProductDetail", pattern: "/product/:slug", access: Access::Public },
	Route { name: "News", pattern: "/news", access: Access::Public },
	Route { name: "NewsDetail", pattern: "/news/:slug", access: Access::Public },
	Route { name: "About", pattern: "/about", access: Access::Public },
	Route { name: "Contact", pattern: "/contact", access: Access::Public },
	Route { name: "AdminLogin", pattern: LOGIN_ROUTE, access: Access::GuestOnly },
	Route { name: "AdminDashboard", pattern: ADMIN_HOME, access: Access::AuthOnly },
	Route { name: "ProductsManagement", pattern: "/admin/products", access: Access::AuthOnly },
	Route { name: "CategoriesManagement", pattern: "/admin/categories", access: Access::AuthOnly },
	Route { name: "BrandsManagement", pattern: "/admin/brands", access: Access::AuthOnly },
	Route { name: "TagsManagement", pattern: "/admin/tags", access: Access::AuthOnly },
	Route { name: "FeaturesManagement", pattern: "/admin/features", access: Access::AuthOnly },
	Route { name: "NewsManagement", pattern: "/admin/news", access: Access::AuthOnly },
	Route { name: "BannersManagement", pattern: "/admin/banners", access: Access::AuthOnly },
	Route { name: "MessagesManagement", pattern: "/admin/messages", access: Access::AuthOnly },
	Route { name: "AdminSettings", pattern: "/admin/settings", access: Access::AuthOnly },
	Route { name: "AdminProfile", pattern: "/admin/profile", access: Access::AuthOnly },
	Route { name: "AdminNotFound", pattern: "/admin/*", access: Access::AuthOnly },
	Route { name: "NotFound", pattern: "/*", access: Access::Public },
];

/// A resolved route with its captured parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
	/// Matched table entry.
	pub route: Route,
	/// Captured `:name` segments.
	pub params: BTreeMap<&'static str, String>,
}

/// Outcome of [`Router::guard`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
	/// Open the requested route.
	Proceed(RouteMatch),
	/// Navigate to this path instead.
	Redirect(String),
}

/// Route table plus the guard applied before every navigation.
#[derive(Clone, Copy, Debug)]
pub struct Router {
	routes: &'static [Route],
}
impl Router {
	/// Creates a router over a custom table; the last entry should be a catch-all.
	pub fn new(routes: &'static [Route]) -> Self {
		Self { routes }
	}

	/// Matches `target` (query string ignored) against the table.
	pub fn resolve(&self, target: &str) -> RouteMatch {
		let (path, _) = split_target(target);

		self.routes
			.iter()
			.find_map(|route| {
				let params = match_pattern(route.pattern, path)?;

				Some(RouteMatch { route: *route, params })
			})
			.unwrap_or_else(|| RouteMatch {
				route: Route { name: "NotFound", pattern: "/*", access: Access::Public },
				params: BTreeMap::new(),
			})
	}

	/// Decides whether navigation to `target` may proceed.
	///
	/// Loads the auth state on first use. Signed-in users are sent away from the login view
	/// to its `redirect` query (when it names a local path) or the dashboard; anonymous
	/// visitors of protected routes are sent to the login view.
	pub async fn guard(&self, target: &str, auth: &AuthState) -> Navigation {
		if !auth.is_initialized() {
			auth.init().await;
		}

		let matched = self.resolve(target);

		match matched.route.access {
			Access::GuestOnly if auth.is_authenticated() => {
				let (_, query) = split_target(target);
				let destination = query
					.and_then(|query| query_value(query, "redirect"))
					.filter(|path| is_local_path(path))
					.unwrap_or_else(|| ADMIN_HOME.to_owned());

				Navigation::Redirect(destination)
			},
			Access::AuthOnly if !auth.is_authenticated() => {
				Navigation::Redirect(login_redirect(target))
			},
			_ => Navigation::Proceed(matched),
		}
	}
}
impl Default for Router {
	fn default() -> Self {
		Self::new(ROUTES)
	}
}

/// Login view path that returns to `return_to` after signing in.
pub fn login_redirect(return_to: &str) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("redirect", return_to)
		.finish();

	format!("{LOGIN_ROUTE}?{query}")
}

fn split_target(target: &str) -> (&str, Option<&str>) {
	let target = target.split_once('#').map_or(target, |(before, _)| before);

	match target.split_once('?') {
		Some((path, query)) => (path, Some(query)),
		None => (target, None),
	}
}

fn query_value(query: &str, key: &str) -> Option<String> {
	form_urlencoded::parse(query.as_bytes())
		.find(|(name, _)| name == key)
		.map(|(_, value)| value.into_owned())
		.filter(|value| !value.is_empty())
}

fn is_local_path(path: &str) -> bool {
	path.starts_with('/') && !path.starts_with("//")
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<BTreeMap<&'static str, String>> {
	let mut params = BTreeMap::new();
	let mut segments = path.split('/').filter(|segment| !segment.is_empty());

	for expected in pattern.split('/').filter(|segment| !segment.is_empty()) {
		if expected == "*" {
			return Some(params);
		}

		let actual = segments.next()?;

		match expected.strip_prefix(':') {
			Some(name) => {
				params.insert(name, actual.to_owned());
			},
			None if expected == actual => {},
			None => return None,
		}
	}

	segments.next().is_none().then_some(params)
}
