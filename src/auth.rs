//! Credential models shared by the gateway, the store helpers, and the session calls.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
