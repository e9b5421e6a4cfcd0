//! Session lifecycle calls layered on the gateway: login, signup, registration, logout, and
//! the signed-in identity.
//!
//! Credential-issuing calls go straight to the transport. They must not carry a stale bearer
//! credential, and a 401 from them means bad credentials rather than an expired session.

pub mod identity;

pub use identity::*;

// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	gateway::{Gateway, SignOutReason},
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
	session::identity::LoginBody,
	store::CredentialStoreExt,
};

impl<T> Gateway<T>
where
	T: ?Sized + ApiTransport,
{
	/// Exchanges username/password for a credential pair and stores it.
	pub async fn login(&self, username: &str, password: &str) -> Result<CredentialPair> {
		const KIND: CallKind = CallKind::Login;

		let span = CallSpan::new(KIND, "login");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let body = LoginBody { username, password };
				let pair: CredentialPair =
					self.issue(self.descriptor().endpoints.obtain.clone(), &body).await?.json()?;

				self.store().save_pair(pair.clone()).await?;

				Ok::<_, Error>(pair)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Creates an agent account; stores the returned tokens when both are present.
	///
	/// Returns the raw response payload (`user`, `access`, `refresh`).
	pub async fn signup(&self, request: &SignupRequest) -> Result<serde_json::Value> {
		const KIND: CallKind = CallKind::Signup;

		let span = CallSpan::new(KIND, "signup");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let payload: serde_json::Value =
					self.issue(self.descriptor().endpoints.signup.clone(), request).await?.json()?;

				if let Some(pair) = pair_from_payload(&payload) {
					self.store().save_pair(pair).await?;
				}

				Ok::<_, Error>(payload)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Creates or joins an organization and stores the returned tokens.
	///
	/// Returns the raw response payload (profile fields plus `access` and `refresh`).
	pub async fn register(&self, request: &RegistrationRequest) -> Result<serde_json::Value> {
		const KIND: CallKind = CallKind::Register;

		let span = CallSpan::new(KIND, "register");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async {
				let response =
					self.issue(self.descriptor().endpoints.register.clone(), request).await?;
				let payload: serde_json::Value = response.json()?;
				let pair: CredentialPair = response.json()?;

				self.store().save_pair(pair).await?;

				Ok::<_, Error>(payload)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Clears both tokens and broadcasts a logout sign-out event.
	pub async fn logout(&self) -> Result<()> {
		obs::record_call_outcome(CallKind::Logout, CallOutcome::Attempt);

		let result = self.store().clear_pair().await.map_err(Error::from);

		if result.is_ok() {
			self.emit_sign_out(SignOutReason::Logout);
		}

		obs::record_result(CallKind::Logout, &result);

		result
	}

	/// Returns `true` when an access token is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.store().access_token().await?.is_some())
	}

	/// Fetches the signed-in user (role + organization).
	pub async fn me(&self) -> Result<CurrentUser> {
		self.send_json(ApiRequest::get(self.descriptor().endpoints.me.as_str())).await
	}

	/// `GET path`, decoding the JSON body.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: serde::de::DeserializeOwned,
	{
		self.send_json(ApiRequest::get(path)).await
	}

	/// `POST path` with a JSON body, decoding the JSON response.
	pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: serde::de::DeserializeOwned,
	{
		self.send_json(ApiRequest::post(path).try_json(body)?).await
	}

	/// `PATCH path` with a JSON body, decoding the JSON response.
	pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: serde::de::DeserializeOwned,
	{
		self.send_json(ApiRequest::patch(path).try_json(body)?).await
	}

	/// `DELETE path`; the response body is ignored.
	pub async fn delete(&self, path: &str) -> Result<()> {
		self.send(ApiRequest::delete(path)).await.map(|_| ())
	}

	/// Posts `body` to a credential-issuing endpoint without bearer or refresh handling.
	async fn issue<B>(&self, url: Url, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		let request = ApiRequest::post(url.as_str()).try_json(body)?;
		let response = self.transport().execute(url, request).await?;

		if !response.is_success() {
			return Err(Error::Status { response });
		}

		Ok(response)
	}
}

fn pair_from_payload(payload: &serde_json::Value) -> Option<CredentialPair> {
	let access = payload.get("access")?.as_str()?;
	let refresh = payload.get("refresh")?.as_str()?;

	Some(CredentialPair::new(access, refresh))
}
