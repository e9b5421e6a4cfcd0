//! Immutable per-dispatch retry bookkeeping.

// self
use crate::{
	_prelude::*,
	http::{ApiRequest, ApiResponse},
};

/// A caller's request together with how many times it has been dispatched.
///
/// The retry fact lives here instead of on the request, so re-sending a request value never
/// inherits a previous call's retry state.
#[derive(Clone, Debug)]
pub struct RequestAttempt {
	request: ApiRequest,
	attempt: u8,
}
impl RequestAttempt {
	/// Retries permitted per request.
	pub const MAX_RETRIES: u8 = 1;

	/// Wraps a request for its first dispatch.
	pub fn first(request: ApiRequest) -> Self {
		Self { request, attempt: 0 }
	}

	/// Returns the record for the next dispatch of the same request.
	pub fn retried(self) -> Self {
		Self { request: self.request, attempt: self.attempt.saturating_add(1) }
	}

	/// Borrowed view of the original request.
	pub fn request(&self) -> &ApiRequest {
		&self.request
	}

	/// Zero for the first dispatch.
	pub fn attempt(&self) -> u8 {
		self.attempt
	}

	/// `true` once the request has used its retry.
	pub fn is_retry(&self) -> bool {
		self.attempt >= Self::MAX_RETRIES
	}

	/// Classifies a response received for this attempt.
	pub fn classify(&self, response: ApiResponse) -> Verdict {
		if response.is_success() {
			Verdict::Done(Ok(response))
		} else if !response.is_unauthorized() {
			Verdict::Done(Err(Error::Status { response }))
		} else if self.is_retry() {
			Verdict::Done(Err(Error::AuthExpiredRetried { response }))
		} else {
			Verdict::Renew(response)
		}
	}
}

/// What the gateway does with a classified response.
#[derive(Debug)]
pub enum Verdict {
	/// Hand the result to the caller.
	Done(Result<ApiResponse>),
	/// First 401: renew the access token and retry; carries the original response.
	Renew(ApiResponse),
}
