// self
use crate::{
	_prelude::*,
	descriptor::{
		ApiDescriptor, ApiEndpoints, DEFAULT_LOGIN_ENTRY, DEFAULT_ME_PATH, DEFAULT_OBTAIN_PATH,
		DEFAULT_REFRESH_PATH, DEFAULT_REGISTER_PATH, DEFAULT_SIGNUP_PATH,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DescriptorError {
	/// Base URL must use HTTPS unless insecure transport was allowed.
	#[error("The API base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry query strings or fragments.
	#[error("The API base URL must not carry a query or fragment: {url}.")]
	BaseUrlNotBare {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot be joined onto (e.g. `mailto:`).
	#[error("The API base URL cannot serve as a base: {url}.")]
	CannotBeABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// Endpoint path could not be joined onto the base URL.
	#[error("The {endpoint} endpoint path `{path}` is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Login entry must be an absolute UI route.
	#[error("The login entry `{entry}` must start with `/`.")]
	InvalidLoginEntry {
		/// Offending route.
		entry: String,
	},
}

/// Builder for [`ApiDescriptor`] values.
#[derive(Debug)]
pub struct ApiDescriptorBuilder {
	/// Base URL of the API (for example `https://desk.example.com/api/`).
	pub base_url: Url,
	/// Token obtain endpoint path.
	pub obtain_path: String,
	/// Token refresh endpoint path.
	pub refresh_path: String,
	/// Public signup endpoint path.
	pub signup_path: String,
	/// Organization registration endpoint path.
	pub register_path: String,
	/// Current-user endpoint path.
	pub me_path: String,
	/// UI route used by sign-out events.
	pub login_entry: String,
	/// Allows plain-HTTP base URLs (local development, mock servers).
	pub allow_insecure: bool,
}
impl ApiDescriptorBuilder {
	/// Creates a new builder seeded with the backend's default endpoint layout.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			obtain_path: DEFAULT_OBTAIN_PATH.into(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			signup_path: DEFAULT_SIGNUP_PATH.into(),
			register_path: DEFAULT_REGISTER_PATH.into(),
			me_path: DEFAULT_ME_PATH.into(),
			login_entry: DEFAULT_LOGIN_ENTRY.into(),
			allow_insecure: false,
		}
	}

	/// Overrides the token obtain endpoint path.
	pub fn obtain_path(mut self, path: impl Into<String>) -> Self {
		self.obtain_path = path.into();

		self
	}

	/// Overrides the token refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the public signup endpoint path.
	pub fn signup_path(mut self, path: impl Into<String>) -> Self {
		self.signup_path = path.into();

		self
	}

	/// Overrides the registration endpoint path.
	pub fn register_path(mut self, path: impl Into<String>) -> Self {
		self.register_path = path.into();

		self
	}

	/// Overrides the current-user endpoint path.
	pub fn me_path(mut self, path: impl Into<String>) -> Self {
		self.me_path = path.into();

		self
	}

	/// Overrides the UI route carried by sign-out events.
	pub fn login_entry(mut self, entry: impl Into<String>) -> Self {
		self.login_entry = entry.into();

		self
	}

	/// Allows or rejects plain-HTTP base URLs.
	pub fn allow_insecure(mut self, allow: bool) -> Self {
		self.allow_insecure = allow;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ApiDescriptor, DescriptorError> {
		let base_url = normalize_base(self.base_url, self.allow_insecure)?;

		if !self.login_entry.starts_with('/') {
			return Err(DescriptorError::InvalidLoginEntry { entry: self.login_entry });
		}

		let endpoints = ApiEndpoints {
			obtain: join_endpoint(&base_url, "obtain", &self.obtain_path)?,
			refresh: join_endpoint(&base_url, "refresh", &self.refresh_path)?,
			signup: join_endpoint(&base_url, "signup", &self.signup_path)?,
			register: join_endpoint(&base_url, "register", &self.register_path)?,
			me: join_endpoint(&base_url, "me", &self.me_path)?,
		};

		Ok(ApiDescriptor {
			base_url,
			endpoints,
			login_entry: self.login_entry,
			allow_insecure: self.allow_insecure,
		})
	}
}

fn normalize_base(mut url: Url, allow_insecure: bool) -> Result<Url, DescriptorError> {
	match url.scheme() {
		"https" => {},
		"http" if allow_insecure => {},
		_ => return Err(DescriptorError::InsecureBaseUrl { url: url.to_string() }),
	}

	if url.cannot_be_a_base() {
		return Err(DescriptorError::CannotBeABase { url: url.to_string() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(DescriptorError::BaseUrlNotBare { url: url.to_string() });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	Ok(url)
}

fn join_endpoint(base: &Url, endpoint: &'static str, path: &str) -> Result<Url, DescriptorError> {
	base.join(path.trim_start_matches('/')).map_err(|source| DescriptorError::InvalidEndpoint {
		endpoint,
		path: path.to_owned(),
		source,
	})
}
