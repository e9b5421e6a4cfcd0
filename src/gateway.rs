//! Authenticated request gateway: bearer attachment, single-flight refresh, and retry.
//!
//! Every backend call made by the UI goes through [`Gateway::send`]. The gateway reads the
//! access token from the [`CredentialStore`], attaches it as a bearer credential, and on the
//! first 401 for a request renews the token through the refresh endpoint before re-issuing the
//! request once. Concurrent 401s share one refresh: the first caller leads it, the rest wait
//! for its outcome. When renewal fails the stored credentials are cleared, every participant
//! receives its original 401 as [`Error::AuthExpired`], and a [`SignOutEvent`] is broadcast.

mod attempt;
mod metrics;
mod refresh;
mod signout;

pub use attempt::*;
pub use metrics::GatewayMetrics;
pub use refresh::RefreshPhase;
pub use signout::*;

// crates.io
use tokio::sync::broadcast;
// self
use crate::{
	_prelude::*,
	auth::{
		TokenSecret,
		credential::{RefreshBody, RefreshedAccess},
	},
	descriptor::ApiDescriptor,
	gateway::refresh::{RefreshCoordinator, Ticket},
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan, trace_debug, trace_warn},
	store::{ACCESS_KEY, CredentialStore, CredentialStoreExt, REFRESH_KEY},
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestTransport};

const SIGN_OUT_CAPACITY: usize = 16;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Mediates every outbound authenticated API call.
///
/// Clones share the transport, the credential store, the refresh state, and the sign-out
/// channel, so one refresh is in flight per gateway family no matter how many clones exist.
pub struct Gateway<T>
where
	T: ?Sized + ApiTransport,
{
	transport: Arc<T>,
	store: Arc<dyn CredentialStore>,
	descriptor: ApiDescriptor,
	metrics: Arc<GatewayMetrics>,
	coordinator: Arc<RefreshCoordinator>,
	sign_out: broadcast::Sender<SignOutEvent>,
}
impl<T> Gateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn CredentialStore>,
		descriptor: ApiDescriptor,
		transport: impl Into<Arc<T>>,
	) -> Self {
		let (sign_out, _) = broadcast::channel(SIGN_OUT_CAPACITY);

		Self {
			transport: transport.into(),
			store,
			descriptor,
			metrics: Default::default(),
			coordinator: Default::default(),
			sign_out,
		}
	}

	/// Descriptor the gateway resolves paths against.
	pub fn descriptor(&self) -> &ApiDescriptor {
		&self.descriptor
	}

	/// Credential store backing the session.
	pub fn store(&self) -> &Arc<dyn CredentialStore> {
		&self.store
	}

	/// Shared counters.
	pub fn metrics(&self) -> &GatewayMetrics {
		&self.metrics
	}

	/// Current refresh phase.
	pub fn refresh_phase(&self) -> RefreshPhase {
		self.coordinator.phase()
	}

	/// `true` while a refresh call is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.refresh_phase() == RefreshPhase::Refreshing
	}

	/// Number of requests queued behind the in-flight refresh.
	pub fn pending_refresh_waiters(&self) -> usize {
		self.coordinator.waiting()
	}

	/// Subscribes to sign-out events.
	///
	/// Only events emitted after subscribing are delivered.
	pub fn subscribe_sign_out(&self) -> broadcast::Receiver<SignOutEvent> {
		self.sign_out.subscribe()
	}

	/// Sends `request` with the stored bearer credential, renewing it once on a 401.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Send;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.metrics.record_request();

		let result = span.instrument(self.dispatch(RequestAttempt::first(request))).await;

		span.record_status(match &result {
			Ok(response) => Some(response.status),
			Err(err) => err.status(),
		});
		obs::record_result(KIND, &result);

		result
	}

	/// Sends `request` and decodes a successful JSON body.
	pub async fn send_json<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: serde::de::DeserializeOwned,
	{
		Ok(self.send(request).await?.json()?)
	}

	async fn dispatch(&self, mut attempt: RequestAttempt) -> Result<ApiResponse> {
		let url = self.descriptor.resolve(&attempt.request().path)?;

		// Credentials never leave the API origin.
		if !self.descriptor.is_api_origin(&url) {
			let response = self.execute(&url, attempt.request(), None).await?;

			return match response.is_success() {
				true => Ok(response),
				false => Err(Error::Status { response }),
			};
		}

		let mut token = self.store.access_token().await?;

		loop {
			let response = self.execute(&url, attempt.request(), token.as_ref()).await?;

			match attempt.classify(response) {
				Verdict::Done(result) => return result,
				Verdict::Renew(original) => {
					trace_debug!(path = %attempt.request().path, "access token rejected");

					token = Some(self.renew_access(token.as_ref(), original).await?);
					attempt = attempt.retried();

					self.metrics.record_retry();
				},
			}
		}
	}

	async fn execute(
		&self,
		url: &Url,
		request: &ApiRequest,
		token: Option<&TokenSecret>,
	) -> Result<ApiResponse> {
		let outbound = match token {
			Some(token) => request.with_bearer(token),
			None => request.clone(),
		};

		Ok(self.transport.execute(url.clone(), outbound).await?)
	}

	/// Produces the access token for the retry, or the caller's final error.
	///
	/// The stored token is compared with the one the request carried only while holding the
	/// lease. A refresh that settled before `join` has already written the store, and its token
	/// is reused without another refresh call.
	async fn renew_access(
		&self,
		sent: Option<&TokenSecret>,
		original: ApiResponse,
	) -> Result<TokenSecret> {
		let lease = match self.coordinator.join() {
			Ticket::Leader(lease) => lease,
			Ticket::Waiter(waiter) =>
				return waiter.await.map_err(|_| Error::AuthExpired { response: original }),
		};
		let current = self.store.access_token().await?;

		if current.as_ref() != sent {
			return match current {
				// Another caller already renewed the token this request was sent with.
				Some(current) => {
					let _notified = lease.complete(&current);

					self.metrics.record_stale_reuse();

					trace_debug!(notified = _notified, "reusing access token renewed elsewhere");

					Ok(current)
				},
				// The session ended while this request was in flight.
				None => {
					let _abandoned = lease.abandon();

					trace_debug!(abandoned = _abandoned, "session already cleared");

					Err(Error::AuthExpired { response: original })
				},
			};
		}

		match self.refresh().await {
			Ok(token) => {
				let _notified = lease.complete(&token);

				trace_debug!(notified = _notified, "access token renewed");

				Ok(token)
			},
			Err(err) => {
				if let Err(_e) = self.store.clear_pair().await {
					trace_warn!(error = %_e, "failed to clear credentials after refresh failure");
				}

				let _abandoned = lease.abandon();

				trace_warn!(error = %err, abandoned = _abandoned, "session renewal failed");

				self.emit_sign_out(SignOutReason::RefreshFailed(Arc::new(err)));

				Err(Error::AuthExpired { response: original })
			},
		}
	}

	/// Exchanges the stored refresh token for a new access token and persists it.
	async fn refresh(&self) -> Result<TokenSecret, RefreshError> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.metrics.record_refresh_attempt();

		let result = span
			.instrument(async {
				let refresh =
					self.store.refresh_token().await?.ok_or(RefreshError::MissingRefreshToken)?;
				let request = ApiRequest::post(self.descriptor.endpoints.refresh.as_str())
					.try_json(&RefreshBody { refresh: refresh.expose() })?;
				let response = self
					.transport
					.execute(self.descriptor.endpoints.refresh.clone(), request)
					.await?;

				if !response.is_success() {
					return Err(RefreshError::Rejected { status: response.status });
				}

				let RefreshedAccess { access, refresh } = response.json()?;

				self.store.set(ACCESS_KEY, access.expose().to_owned()).await?;

				if let Some(refresh) = refresh {
					self.store.set(REFRESH_KEY, refresh.expose().to_owned()).await?;
				}

				Ok::<_, RefreshError>(access)
			})
			.await;

		match &result {
			Ok(_) => self.metrics.record_refresh_success(),
			Err(_) => self.metrics.record_refresh_failure(),
		}

		obs::record_result(KIND, &result);

		result
	}

	pub(crate) fn emit_sign_out(&self, reason: SignOutReason) {
		trace_debug!(reason = reason.as_str(), "signing out");

		self.metrics.record_sign_out();
		obs::record_sign_out(reason.as_str());

		// No subscribers is fine; the event is advisory.
		let _ = self.sign_out.send(SignOutEvent::new(reason, self.descriptor.login_entry.clone()));
	}

	pub(crate) fn transport(&self) -> &T {
		&self.transport
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestTransport> {
	/// Creates a gateway that provisions its own reqwest transport with redirects disabled.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		descriptor: ApiDescriptor,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_transport(store, descriptor, ReqwestTransport::new()?))
	}
}
impl<T> Clone for Gateway<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			metrics: self.metrics.clone(),
			coordinator: self.coordinator.clone(),
			sign_out: self.sign_out.clone(),
		}
	}
}
impl<T> Debug for Gateway<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("base_url", &self.descriptor.base_url.as_str())
			.field("refresh", &self.coordinator)
			.finish()
	}
}
