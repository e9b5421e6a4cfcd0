//! API descriptor: base URL, well-known endpoints, and the login entry point.
//!
//! The descriptor is the gateway's whole configuration surface. Endpoint paths default to the
//! helpdesk backend contract and are joined onto the base URL at build time so the gateway never
//! re-parses them per request.

mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Default relative path of the token obtain endpoint.
pub const DEFAULT_OBTAIN_PATH: &str = "token/";
/// Default relative path of the token refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "token/refresh/";
/// Default relative path of the public signup endpoint.
pub const DEFAULT_SIGNUP_PATH: &str = "signup/";
/// Default relative path of the organization registration endpoint.
pub const DEFAULT_REGISTER_PATH: &str = "register/";
/// Default relative path of the current-user endpoint.
pub const DEFAULT_ME_PATH: &str = "me/";
/// Default UI route users land on after a sign-out.
pub const DEFAULT_LOGIN_ENTRY: &str = "/login";

/// Resolved endpoint set used by the gateway and the session helpers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoints {
	/// `POST` username/password to obtain a credential pair.
	pub obtain: Url,
	/// `POST {refresh}` to obtain a new access token.
	pub refresh: Url,
	/// Public agent signup.
	pub signup: Url,
	/// Organization create/join registration.
	pub register: Url,
	/// Signed-in user profile.
	pub me: Url,
}

/// Immutable API descriptor consumed by the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescriptor {
	/// Base URL every relative request path is joined onto; always ends with `/`.
	pub base_url: Url,
	/// Well-known endpoints.
	pub endpoints: ApiEndpoints,
	/// UI route the sign-out event points at.
	pub login_entry: String,
	/// Whether plain-HTTP base URLs were explicitly allowed.
	pub allow_insecure: bool,
}
impl ApiDescriptor {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ApiDescriptorBuilder {
		ApiDescriptorBuilder::new(base_url)
	}

	/// Resolves a request path against the base URL.
	///
	/// Absolute `http(s)://` URLs pass through unchanged; a leading `/` on relative paths is
	/// ignored so `/tickets/` and `tickets/` both land under the API prefix.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		let map_err =
			|source| ConfigError::InvalidRequestPath { path: path.to_owned(), source };

		if path.starts_with("http://") || path.starts_with("https://") {
			return Url::parse(path).map_err(map_err);
		}

		self.base_url.join(path.trim_start_matches('/')).map_err(map_err)
	}

	/// `true` when `url` shares scheme, host, and port with the base URL.
	///
	/// Bearer credentials are only attached to requests for the API origin.
	pub fn is_api_origin(&self, url: &Url) -> bool {
		url.origin() == self.base_url.origin()
	}
}
