//! Session-termination notifications for the UI layer.

// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError, TransportError},
	store::StoreError,
};

/// Why a refresh exchange could not renew the session.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// No refresh token was stored when the access token was rejected.
	#[error("No refresh token is stored.")]
	MissingRefreshToken,
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the refresh token with HTTP {status}.")]
	Rejected {
		/// HTTP status returned by the refresh endpoint.
		status: u16,
	},
	/// Refresh call failed at the transport level.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Refresh response could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Reading the refresh token or persisting the new access token failed.
	#[error(transparent)]
	Storage(#[from] StoreError),
	/// Refresh request could not be built.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Reason attached to a [`SignOutEvent`].
#[derive(Clone, Debug)]
pub enum SignOutReason {
	/// The session could not be renewed; both tokens were cleared.
	RefreshFailed(Arc<RefreshError>),
	/// The user logged out explicitly.
	Logout,
}
impl SignOutReason {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(&self) -> &'static str {
		match self {
			SignOutReason::RefreshFailed(_) => "refresh_failed",
			SignOutReason::Logout => "logout",
		}
	}
}

/// Instruction for the UI layer to drop cached identity state and navigate to `redirect_to`.
#[derive(Clone, Debug)]
pub struct SignOutEvent {
	/// Why the session ended.
	pub reason: SignOutReason,
	/// Login entry route from the descriptor.
	pub redirect_to: String,
	/// When the session ended.
	pub occurred_at: OffsetDateTime,
}
impl SignOutEvent {
	/// Creates an event stamped with the current UTC instant.
	pub fn new(reason: SignOutReason, redirect_to: impl Into<String>) -> Self {
		Self { reason, redirect_to: redirect_to.into(), occurred_at: OffsetDateTime::now_utc() }
	}
}
