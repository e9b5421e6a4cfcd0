//! Credential store contract and built-in key/value backends.
//!
//! The gateway only ever touches two keys, [`ACCESS_KEY`] and [`REFRESH_KEY`]. UI code reads
//! derived authentication state through the same store, while every mutation goes through the
//! gateway or the session helpers.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
};

/// Store key holding the current access token.
pub const ACCESS_KEY: &str = "access";
/// Store key holding the current refresh token.
pub const REFRESH_KEY: &str = "refresh";

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persisted key/value storage backing the session credentials.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the value stored under `key`, if any.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()>;

	/// Removes `key`; removing an absent key is not an error.
	fn remove<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// Typed helpers layered over any [`CredentialStore`].
pub trait CredentialStoreExt: CredentialStore {
	/// Reads the stored access token.
	fn access_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.get(ACCESS_KEY).await?.map(TokenSecret::new)) })
	}

	/// Reads the stored refresh token.
	fn refresh_token(&self) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.get(REFRESH_KEY).await?.map(TokenSecret::new)) })
	}

	/// Reads both tokens; returns `None` unless both are present.
	fn load_pair(&self) -> StoreFuture<'_, Option<CredentialPair>> {
		Box::pin(async move {
			let access = self.get(ACCESS_KEY).await?;
			let refresh = self.get(REFRESH_KEY).await?;

			Ok(access.zip(refresh).map(|(access, refresh)| CredentialPair::new(access, refresh)))
		})
	}

	/// Persists both tokens of `pair`.
	fn save_pair(&self, pair: CredentialPair) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.set(ACCESS_KEY, pair.access.expose().to_owned()).await?;
			self.set(REFRESH_KEY, pair.refresh.expose().to_owned()).await
		})
	}

	/// Removes both tokens.
	fn clear_pair(&self) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.remove(ACCESS_KEY).await?;
			self.remove(REFRESH_KEY).await
		})
	}
}
impl<S> CredentialStoreExt for S where S: ?Sized + CredentialStore {}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
