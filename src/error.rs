//! Gateway-level error types shared across the transport, store, and session layers.

// self
use crate::{_prelude::*, http::ApiResponse};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Descriptor validation failure.
	#[error(transparent)]
	Descriptor(#[from] crate::descriptor::DescriptorError),
	/// Transport failure (DNS, TCP, TLS); never retried by the gateway.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the requested shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Backend answered with a non-success status other than a recoverable 401.
	#[error("API request failed with HTTP {}.", .response.status)]
	Status {
		/// Response returned by the backend, untouched.
		response: ApiResponse,
	},
	/// Access token was rejected and the session could not be renewed.
	///
	/// Carries the original 401 response, not the refresh failure; the refresh failure is
	/// reported through the sign-out event instead.
	#[error("Access token expired and the session could not be renewed.")]
	AuthExpired {
		/// Original 401 response observed before the refresh attempt.
		response: ApiResponse,
	},
	/// Backend rejected the request again after its single retry.
	#[error("Request was rejected with HTTP 401 after retrying with a renewed token.")]
	AuthExpiredRetried {
		/// 401 response returned by the retried request.
		response: ApiResponse,
	},
}
impl Error {
	/// Returns the backend response attached to status-bearing variants.
	pub fn response(&self) -> Option<&ApiResponse> {
		match self {
			Self::Status { response }
			| Self::AuthExpired { response }
			| Self::AuthExpiredRetried { response } => Some(response),
			_ => None,
		}
	}

	/// Returns the HTTP status attached to status-bearing variants.
	pub fn status(&self) -> Option<u16> {
		self.response().map(|response| response.status)
	}
}

/// Configuration failures raised while wiring the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request path could not be resolved against the base URL.
	#[error("Request path `{path}` cannot be resolved against the API base URL.")]
	InvalidRequestPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Body(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Response decoding failures.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Body was not valid JSON for the requested type.
	#[error("Response body is not valid JSON for the expected shape.")]
	Json {
		/// Structured parsing failure including the failing field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the decoded response.
		status: u16,
	},
	/// Body was not valid UTF-8.
	#[error("Response body is not valid UTF-8.")]
	Utf8(#[from] std::string::FromUtf8Error),
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
