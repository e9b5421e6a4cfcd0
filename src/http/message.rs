//! Transport-agnostic request and response values.

// crates.io
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, DecodeError},
};

/// Header carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";
const RETRY_AFTER: &str = "retry-after";

/// HTTP methods used by the helpdesk API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound request descriptor.
///
/// The gateway never mutates a caller's request; bearer attachment produces a copy via
/// [`ApiRequest::with_bearer`].
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the API base URL, or an absolute URL.
	pub path: String,
	/// Header map keyed by lowercase header name.
	pub headers: BTreeMap<String, String>,
	/// Query string pairs, in insertion order.
	pub query: Vec<(String, String)>,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
}
impl ApiRequest {
	/// Creates a request without headers, query, or body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			headers: BTreeMap::new(),
			query: Vec::new(),
			body: None,
		}
	}

	/// `GET` request for `path`.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// `POST` request for `path`.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// `PUT` request for `path`.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// `PATCH` request for `path`.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// `DELETE` request for `path`.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Sets a header; names are stored lowercase.
	pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Sets a JSON body.
	pub fn json(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Serializes `body` and sets it as the JSON body.
	pub fn try_json<T>(self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		Ok(self.json(serde_json::to_value(body)?))
	}

	/// Returns the header value for `name`, case-insensitively.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns a copy carrying `token` as its bearer credential.
	pub fn with_bearer(&self, token: &TokenSecret) -> Self {
		self.clone().header(AUTHORIZATION, token.bearer())
	}
}

/// Response returned by an [`ApiTransport`](crate::http::ApiTransport), regardless of status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Header map keyed by lowercase header name.
	pub headers: BTreeMap<String, String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates a response without headers.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers: BTreeMap::new(), body: body.into() }
	}

	/// Adds a header; names are stored lowercase.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// `true` for HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Returns the header value for `name`, case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Decodes the body as JSON, reporting the failing field path on error.
	pub fn json<T>(&self) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError::Json { source, status: self.status })
	}

	/// Returns the body as UTF-8 text.
	pub fn text(&self) -> Result<String, DecodeError> {
		Ok(String::from_utf8(self.body.clone())?)
	}

	/// Parses the `Retry-After` header as delta-seconds or an RFC 2822 date.
	pub fn retry_after(&self) -> Option<Duration> {
		let raw = self.header(RETRY_AFTER)?.trim();

		if let Ok(secs) = raw.parse::<u32>() {
			return Some(Duration::seconds(i64::from(secs)));
		}
		if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
			let delta = moment - OffsetDateTime::now_utc();

			if delta.is_positive() {
				return Some(delta);
			}
		}

		None
	}
}
