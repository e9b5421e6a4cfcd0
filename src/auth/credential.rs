//! Access/refresh credential pair issued by login, signup, and registration.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Credential pair persisted under the `access` and `refresh` store keys.
///
/// The serde shape matches the backend's token payload (`{"access": .., "refresh": ..}`), so
/// responses from the obtain, signup, and register endpoints decode straight into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived token attached to every API request.
	pub access: TokenSecret,
	/// Longer-lived token exchanged for new access tokens.
	pub refresh: TokenSecret,
}
impl CredentialPair {
	/// Creates a pair from raw token strings.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access: TokenSecret::new(access), refresh: TokenSecret::new(refresh) }
	}
}

/// Body of a successful `token/refresh/` exchange.
///
/// Backends that rotate refresh tokens also return a replacement `refresh`.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RefreshedAccess {
	pub(crate) access: TokenSecret,
	#[serde(default)]
	pub(crate) refresh: Option<TokenSecret>,
}

/// Body sent to the `token/refresh/` endpoint.
#[derive(Serialize)]
pub(crate) struct RefreshBody<'a> {
	pub(crate) refresh: &'a str,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn pair_decodes_backend_payload() {
		let pair: CredentialPair =
			serde_json::from_str("{\"access\":\"a-1\",\"refresh\":\"r-1\",\"user\":{\"id\":3}}")
				.expect("Token payload should decode into a credential pair.");

		assert_eq!(pair, CredentialPair::new("a-1", "r-1"));
	}

	#[test]
	fn refreshed_access_keeps_rotated_refresh_token() {
		let plain: RefreshedAccess = serde_json::from_str("{\"access\":\"a-2\"}")
			.expect("Refresh payload without rotation should decode.");
		let rotated: RefreshedAccess =
			serde_json::from_str("{\"access\":\"a-3\",\"refresh\":\"r-3\"}")
				.expect("Rotated refresh payload should decode.");

		assert!(plain.refresh.is_none());
		assert_eq!(rotated.access, TokenSecret::new("a-3"));
		assert_eq!(rotated.refresh, Some(TokenSecret::new("r-3")));
	}

	#[test]
	fn refresh_body_uses_backend_field_name() {
		let body = serde_json::to_string(&RefreshBody { refresh: "r-2" })
			.expect("Refresh body should serialize.");

		assert_eq!(body, "{\"refresh\":\"r-2\"}");
	}
}
