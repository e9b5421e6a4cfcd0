//! Transport primitives for helpdesk API calls.
//!
//! [`ApiTransport`] is the gateway's only dependency on an HTTP stack. It receives a fully
//! resolved URL plus an [`ApiRequest`] and yields an [`ApiResponse`] for every status code the
//! server returns; only network-level failures surface as [`TransportError`]. Status
//! classification (401 handling, error propagation) stays with the gateway so custom
//! transports never need to know about tokens.

pub mod message;

pub use message::*;

// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP clients capable of dispatching helpdesk API requests.
///
/// Implementations must be `Send + Sync + 'static` so a single gateway can be shared across
/// tasks behind an `Arc`.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Dispatches `request` to `url` and returns the response whatever its status.
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_>;
}
impl<T> ApiTransport for Arc<T>
where
	T: ?Sized + ApiTransport,
{
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_> {
		(**self).execute(url, request)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// API calls should not follow redirects: a redirected request would drop the bearer
/// credential or leak it to another origin. [`ReqwestTransport::new`] disables redirects;
/// configure any custom client passed to [`ReqwestTransport::with_client`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with redirects disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	fn build(&self, url: Url, request: &ApiRequest) -> reqwest::RequestBuilder {
		let method = match request.method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = self.0.request(method, url);

		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if !request.query.is_empty() {
			builder = builder.query(&request.query);
		}
		if let Some(body) = request.body.as_ref() {
			builder = builder.json(body);
		}

		builder
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_> {
		let builder = self.build(url, &request);

		Box::pin(async move {
			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
